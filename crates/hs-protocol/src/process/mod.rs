//! Election process: one ring participant and the task that drives it.
//!
//! `ElectionState` holds all protocol decisions and is pure. The event loop
//! owns it together with a `RingTransport`, executes the effects it returns,
//! and publishes a `ProcessSnapshot` after every step so observers can watch
//! without touching the state itself.

mod effect;
mod executor;
mod r#loop;
mod state;
mod transport;

pub use effect::ProcessEffect;
pub use state::ElectionState;
pub use transport::RingTransport;

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{mpsc, watch};

use crate::message::MessageKind;
use crate::metrics::MessageCounters;
use crate::types::{Direction, Phase, Priority, ProcessId, ProcessRole};

// ── Observation ───────────────────────────────────────────────────────

/// Read-only view of one process, published after every handled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSnapshot {
    pub id: ProcessId,
    pub priority: Priority,
    pub role: ProcessRole,
    pub phase: Phase,
    pub leader: Option<ProcessId>,
    pub finished: bool,
}

/// Something a process did, for traces and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectionEvent {
    pub process: ProcessId,
    pub phase: Phase,
    #[serde(flatten)]
    pub kind: ElectionEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElectionEventKind {
    /// Own probes sent both ways for the current phase.
    ProbesIssued { hops: u64 },
    ProbeRelayed {
        origin: ProcessId,
        hops_remaining: u64,
    },
    ProbeSwallowed { origin: ProcessId },
    /// Last hop of a foreign probe reached: reply sent back.
    ReplySent { origin: ProcessId },
    ReplyRelayed { origin: ProcessId },
    /// The probe sent in `probe` direction was answered.
    ReplyReceived { probe: Direction },
    PhaseAdvanced,
    Defeated,
    LeaderDeclared,
    ElectedRelayed { leader: ProcessId },
    ElectionComplete,
    ProtocolViolation { reason: String },
    LinkFailure { direction: Direction, reason: String },
}

/// An event stamped with the time since the ring started.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRecord {
    pub elapsed_us: u64,
    pub event: ElectionEvent,
}

/// Where a process reports what it did: shared counters, optional trace.
#[derive(Debug, Clone)]
pub struct EventSink {
    counters: Arc<MessageCounters>,
    trace_tx: Option<mpsc::UnboundedSender<TraceRecord>>,
    started: Instant,
}

impl EventSink {
    pub fn new(
        counters: Arc<MessageCounters>,
        trace_tx: Option<mpsc::UnboundedSender<TraceRecord>>,
        started: Instant,
    ) -> Self {
        Self {
            counters,
            trace_tx,
            started,
        }
    }

    /// Counters only, no trace.
    pub fn counting(counters: Arc<MessageCounters>) -> Self {
        Self::new(counters, None, Instant::now())
    }

    pub fn record_send(&self, kind: MessageKind) {
        self.counters.record_send(kind);
    }

    pub fn emit(&self, process: ProcessId, phase: Phase, kind: ElectionEventKind) {
        match kind {
            ElectionEventKind::ProtocolViolation { .. } => self.counters.violations.inc(),
            ElectionEventKind::LinkFailure { .. } => self.counters.link_failures.inc(),
            _ => {}
        }

        if let Some(tx) = &self.trace_tx {
            let record = TraceRecord {
                elapsed_us: self.started.elapsed().as_micros() as u64,
                event: ElectionEvent {
                    process,
                    phase,
                    kind,
                },
            };
            // Receiver gone means nobody is recording any more.
            let _ = tx.send(record);
        }
    }
}

// ── Process ───────────────────────────────────────────────────────────

/// One ring participant, ready to run on its own task.
pub struct ElectionProcess<T: RingTransport> {
    state: ElectionState,
    transport: T,
    snapshot_tx: watch::Sender<ProcessSnapshot>,
    sink: EventSink,
}

impl<T: RingTransport> ElectionProcess<T> {
    /// Build a process around `transport`. The receiver observes its
    /// snapshots for as long as the process lives.
    pub fn new(
        transport: T,
        priority: Priority,
        sink: EventSink,
    ) -> (Self, watch::Receiver<ProcessSnapshot>) {
        let state = ElectionState::new(transport.id(), priority, transport.ring_size());
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let process = Self {
            state,
            transport,
            snapshot_tx,
            sink,
        };
        (process, snapshot_rx)
    }

    pub fn id(&self) -> ProcessId {
        self.state.id()
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        self.state.snapshot()
    }

    /// Start the election and run until this process is done with it.
    ///
    /// Returns the final snapshot: `finished` is false if the loop ended on
    /// shutdown or closed links instead.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> ProcessSnapshot {
        r#loop::process_loop(
            self.state,
            self.transport,
            self.snapshot_tx,
            self.sink,
            shutdown,
        )
        .await
    }
}
