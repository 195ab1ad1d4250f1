use crate::output;
use hs_protocol::{ElectionEventKind, ElectionOutcome, MessageStats, TraceRecord};
use serde::Serialize;
use std::io::Write;

/// Emit a JSONL event to stdout (flushed immediately for piped output).
/// If --output-dir was provided, also writes to the JSONL file.
pub fn emit<T: Serialize>(event: &T) {
    if let Ok(json) = serde_json::to_string(event) {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        let _ = writeln!(lock, "{json}");
        let _ = lock.flush();

        output::write_jsonl_line(&json);
    }
}

/// Local wall-clock timestamp for JSONL events.
pub fn now_iso() -> String {
    chrono::Local::now().to_rfc3339()
}

// ── Session events ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventStarted {
    pub event: &'static str,
    pub name: String,
    pub mode: String,
    pub nodes: usize,
    pub timestamp: String,
}

impl EventStarted {
    pub fn new(name: &str, mode: &str, nodes: usize) -> Self {
        Self {
            event: "started",
            name: name.to_string(),
            mode: mode.to_string(),
            nodes,
            timestamp: now_iso(),
        }
    }
}

// ── Election events ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventRing {
    pub event: &'static str,
    pub priorities: Vec<u64>,
    pub seed: Option<u64>,
}

/// One process event, flattened to a single JSONL line.
#[derive(Serialize)]
pub struct EventTrace<'a> {
    pub event: &'static str,
    pub elapsed_us: u64,
    pub process: usize,
    pub phase: u32,
    #[serde(flatten)]
    pub kind: &'a ElectionEventKind,
}

impl<'a> From<&'a TraceRecord> for EventTrace<'a> {
    fn from(record: &'a TraceRecord) -> Self {
        Self {
            event: "trace",
            elapsed_us: record.elapsed_us,
            process: record.event.process.index(),
            phase: record.event.phase,
            kind: &record.event.kind,
        }
    }
}

#[derive(Serialize)]
pub struct EventOutcome {
    pub event: &'static str,
    pub nodes: usize,
    pub leader: usize,
    pub leader_priority: u64,
    pub phase: u32,
    pub messages: u64,
    pub bound: u64,
    pub stats: MessageStats,
    pub elapsed_ms: f64,
    pub elapsed_s: f64,
}

impl EventOutcome {
    pub fn new(outcome: &ElectionOutcome, elapsed_s: f64) -> Self {
        Self {
            event: "outcome",
            nodes: outcome.snapshots.len(),
            leader: outcome.leader.index(),
            leader_priority: outcome.leader_priority.0,
            phase: outcome.phase,
            messages: outcome.stats.total(),
            bound: outcome.bound,
            stats: outcome.stats,
            elapsed_ms: outcome.elapsed.as_secs_f64() * 1000.0,
            elapsed_s,
        }
    }
}

#[derive(Serialize)]
pub struct EventFailed {
    pub event: &'static str,
    pub nodes: usize,
    pub error: String,
    pub elapsed_s: f64,
}

// ── Campaign events ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventCampaignRun {
    pub event: &'static str,
    pub nodes: usize,
    pub run: u32,
    pub seed: u64,
    pub status: &'static str,
    pub leader: Option<usize>,
    pub expected_leader: usize,
    pub messages: u64,
    pub bound: u64,
    pub elapsed_ms: f64,
    pub detail: String,
}

#[derive(Serialize)]
pub struct EventCampaignSummary {
    pub event: &'static str,
    pub name: String,
    pub runs: u32,
    pub passed: u32,
    pub failed: u32,
    pub max_bound_ratio: f64,
    pub total_elapsed_s: f64,
    pub overall_status: &'static str,
}
