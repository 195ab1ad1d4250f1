//! Hirschberg-Sinclair leader election.
//!
//! Every process in a bidirectional ring runs in phases: in phase `k` it
//! probes `2^k` hops both ways and survives only if no stronger process sits
//! within that distance. The last survivor announces itself with an ELECTED
//! message that travels once around the ring. Worst case `O(N log N)`
//! messages.
//!
//! Runs on top of `hs-transport` (in-memory ring links).
//! Wire format: MessagePack (compact binary).

pub mod config;
pub mod error;
pub mod message;
pub mod metrics;
pub mod network;
pub mod process;
pub mod types;

pub use config::RingConfig;
pub use error::ElectionError;
pub use message::{Message, MessageKind};
pub use metrics::{MessageCounters, MessageStats};
pub use network::{ElectionOutcome, RingNetwork};
pub use process::{
    ElectionEvent, ElectionEventKind, ElectionProcess, ElectionState, EventSink, ProcessEffect,
    ProcessSnapshot, RingTransport, TraceRecord,
};
pub use types::{
    message_bound, probe_distance, spans_ring, Direction, Phase, Priority, ProcessId, ProcessRole,
    Rank,
};
