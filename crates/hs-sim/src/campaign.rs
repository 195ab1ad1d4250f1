//! Campaign mode: elections over a range of ring sizes with random priorities.
//!
//! Every run must elect the highest-priority process within `message_bound(N)`.

use std::time::Instant;

use hs_protocol::RingNetwork;

use crate::common::{expected_leader, random_priorities, ring_config, seeded_rng};
use crate::events::{emit, EventCampaignRun, EventCampaignSummary};

// ── Configuration ──────────────────────────────────────────────────

pub struct CampaignConfig {
    pub name: String,
    pub min_nodes: usize,
    pub max_nodes: usize,
    pub step: usize,
    pub runs_per_size: u32,
    pub seed: Option<u64>,
    pub timeout_ms: Option<u64>,
}

// ── Internal tracking ──────────────────────────────────────────────

struct CampaignStats {
    runs: u32,
    passed: u32,
    max_bound_ratio: f64,
    failures: Vec<String>,
}

impl CampaignStats {
    fn new() -> Self {
        Self {
            runs: 0,
            passed: 0,
            max_bound_ratio: 0.0,
            failures: Vec::new(),
        }
    }

    fn failed(&self) -> u32 {
        self.runs - self.passed
    }

    fn status(&self) -> &'static str {
        if self.failures.is_empty() {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

// ── Main entry ─────────────────────────────────────────────────────

pub async fn run(config: CampaignConfig) -> anyhow::Result<()> {
    if config.min_nodes == 0 || config.min_nodes > config.max_nodes {
        anyhow::bail!(
            "invalid size range {}..={}",
            config.min_nodes,
            config.max_nodes
        );
    }

    let campaign_start = Instant::now();
    let (_, base_seed) = seeded_rng(config.seed);
    let mut stats = CampaignStats::new();

    eprintln!(
        "Campaign '{}': N = {}..={} step {}, {} run(s) each, seed {base_seed}",
        config.name, config.min_nodes, config.max_nodes, config.step, config.runs_per_size
    );

    for nodes in (config.min_nodes..=config.max_nodes).step_by(config.step.max(1)) {
        for run in 0..config.runs_per_size {
            let seed = base_seed.wrapping_add(stats.runs as u64);
            let (mut rng, _) = seeded_rng(Some(seed));
            let priorities = random_priorities(nodes, &mut rng);
            let expected = expected_leader(&priorities);

            stats.runs += 1;
            let started = Instant::now();
            let result = match RingNetwork::with_config(
                &priorities,
                ring_config(config.timeout_ms, false, false),
            ) {
                Ok(mut ring) => ring.run_until_elected().await,
                Err(e) => Err(e),
            };

            let line = match result {
                Ok(outcome) => {
                    let messages = outcome.stats.total();
                    let ratio = messages as f64 / outcome.bound as f64;
                    stats.max_bound_ratio = stats.max_bound_ratio.max(ratio);

                    let wrong_leader = outcome.leader.index() != expected;
                    let detail = if wrong_leader {
                        format!("elected {} instead of P{expected}", outcome.leader)
                    } else {
                        format!("{messages}/{} messages", outcome.bound)
                    };
                    let status = if wrong_leader || messages > outcome.bound {
                        stats.failures.push(format!("N={nodes} seed={seed}: {detail}"));
                        "FAIL"
                    } else {
                        stats.passed += 1;
                        "PASS"
                    };

                    EventCampaignRun {
                        event: "campaign_run",
                        nodes,
                        run,
                        seed,
                        status,
                        leader: Some(outcome.leader.index()),
                        expected_leader: expected,
                        messages,
                        bound: outcome.bound,
                        elapsed_ms: outcome.elapsed.as_secs_f64() * 1000.0,
                        detail,
                    }
                }
                Err(e) => {
                    tracing::warn!(nodes, seed, "election failed: {e}");
                    stats.failures.push(format!("N={nodes} seed={seed}: {e}"));
                    EventCampaignRun {
                        event: "campaign_run",
                        nodes,
                        run,
                        seed,
                        status: "FAIL",
                        leader: None,
                        expected_leader: expected,
                        messages: 0,
                        bound: hs_protocol::message_bound(nodes),
                        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
                        detail: e.to_string(),
                    }
                }
            };

            if line.status == "FAIL" {
                eprintln!("  [FAIL] N={nodes:<4} run {run}: {}", line.detail);
            }
            emit(&line);
        }
    }

    // ── Summary ──────────────────────────────────────────────────
    emit(&EventCampaignSummary {
        event: "campaign_summary",
        name: config.name.clone(),
        runs: stats.runs,
        passed: stats.passed,
        failed: stats.failed(),
        max_bound_ratio: stats.max_bound_ratio,
        total_elapsed_s: campaign_start.elapsed().as_secs_f64(),
        overall_status: stats.status(),
    });

    eprintln!();
    eprintln!(
        "[{}] {}/{} runs passed, worst message count at {:.1}% of bound ({:.2}s)",
        stats.status(),
        stats.passed,
        stats.runs,
        stats.max_bound_ratio * 100.0,
        campaign_start.elapsed().as_secs_f64()
    );

    if !stats.failures.is_empty() {
        anyhow::bail!(
            "{} of {} runs failed:\n  {}",
            stats.failed(),
            stats.runs,
            stats.failures.join("\n  ")
        );
    }
    Ok(())
}
