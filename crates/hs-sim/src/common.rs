use std::collections::HashSet;
use std::time::{Duration, Instant};

use hs_protocol::{Priority, RingConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parse a comma-separated priority list, e.g. `5,9,2,7`.
pub fn parse_priorities(s: &str) -> anyhow::Result<Vec<Priority>> {
    let priorities = s
        .split(',')
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<u64>()
                .map(Priority)
                .map_err(|e| anyhow::anyhow!("invalid priority '{v}': {e}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    if priorities.is_empty() {
        anyhow::bail!("priority list is empty");
    }
    Ok(priorities)
}

/// `n` distinct priorities drawn uniformly from `1..=n^4`.
///
/// Collisions are redrawn, so the ring always has a unique maximum.
pub fn random_priorities(n: usize, rng: &mut StdRng) -> Vec<Priority> {
    let upper = (n as u64).saturating_pow(4).max(n as u64).max(1);
    let mut seen = HashSet::with_capacity(n);
    let mut priorities = Vec::with_capacity(n);
    while priorities.len() < n {
        let candidate = rng.random_range(1..=upper);
        if seen.insert(candidate) {
            priorities.push(Priority(candidate));
        }
    }
    priorities
}

/// Seeded RNG, or a fresh random seed when none is given. Returns the seed
/// so runs can be replayed.
pub fn seeded_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    (StdRng::seed_from_u64(seed), seed)
}

/// Ring configuration from CLI flags.
pub fn ring_config(timeout_ms: Option<u64>, strict: bool, trace: bool) -> RingConfig {
    let mut config = RingConfig::new().strict_priorities(strict).record_trace(trace);
    if let Some(ms) = timeout_ms {
        config = config.timeout(Duration::from_millis(ms));
    }
    config
}

/// Position of the process that must win: highest priority, lowest id on ties.
pub fn expected_leader(priorities: &[Priority]) -> usize {
    priorities
        .iter()
        .enumerate()
        .max_by_key(|(i, p)| (**p, std::cmp::Reverse(*i)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Elapsed seconds since `start`.
pub fn elapsed_s(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}
