use crate::message::Message;
use crate::types::Direction;

use super::ElectionEventKind;

/// Intent produced by the pure logic of [`ElectionState`](super::ElectionState).
///
/// Every `handle_*` method returns `Vec<ProcessEffect>`; the process loop
/// then carries them out through the transport and the event sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEffect {
    /// Send a message on the outbound link for `direction`.
    Send {
        direction: Direction,
        message: Message,
    },

    /// Record a trace event for observers.
    Emit(ElectionEventKind),
}
