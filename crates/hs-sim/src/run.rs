//! Single election: build one ring, elect, report.

use std::time::Instant;

use hs_protocol::{ElectionError, Priority, RingConfig, RingNetwork};

use crate::common::{elapsed_s, expected_leader};
use crate::events::{emit, EventFailed, EventOutcome, EventRing, EventTrace};

pub struct RunConfig {
    pub priorities: Vec<Priority>,
    /// Seed the priorities were drawn with, if random.
    pub seed: Option<u64>,
    pub ring: RingConfig,
    pub trace: bool,
}

pub async fn run(config: RunConfig, start: Instant) -> anyhow::Result<()> {
    let n = config.priorities.len();
    emit(&EventRing {
        event: "ring",
        priorities: config.priorities.iter().map(|p| p.0).collect(),
        seed: config.seed,
    });

    let mut ring = RingNetwork::with_config(&config.priorities, config.ring)?;
    let outcome = match ring.run_until_elected().await {
        Ok(outcome) => outcome,
        Err(e) => {
            report_failure(n, &e, start);
            return Err(e.into());
        }
    };

    if config.trace {
        for record in &outcome.trace {
            emit(&EventTrace::from(record));
        }
    }
    emit(&EventOutcome::new(&outcome, elapsed_s(start)));

    eprintln!();
    eprintln!(
        "Leader: {} (priority {}) after phase {}",
        outcome.leader, outcome.leader_priority, outcome.phase
    );
    eprintln!(
        "Messages: {} (probes {}, replies {}, elected {}) / bound {}",
        outcome.stats.total(),
        outcome.stats.probes,
        outcome.stats.replies,
        outcome.stats.elected,
        outcome.bound
    );
    eprintln!("Elapsed: {:.2} ms", outcome.elapsed.as_secs_f64() * 1000.0);

    let expected = expected_leader(&config.priorities);
    if outcome.leader.index() != expected {
        anyhow::bail!("elected {} but P{expected} holds the highest rank", outcome.leader);
    }
    Ok(())
}

fn report_failure(nodes: usize, error: &ElectionError, start: Instant) {
    emit(&EventFailed {
        event: "failed",
        nodes,
        error: error.to_string(),
        elapsed_s: elapsed_s(start),
    });
    tracing::error!("election failed: {error}");
}
