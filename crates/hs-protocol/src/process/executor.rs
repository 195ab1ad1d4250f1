//! Effect executor: the only place a process touches its links.
//!
//! Takes the list of ProcessEffect produced by ElectionState and carries it out:
//! - Send -> encode, transport.send_raw(), count the send
//! - Emit -> event sink (trace + failure counters)

use crate::message::Message;
use crate::types::{Direction, Phase};

use super::effect::ProcessEffect;
use super::transport::RingTransport;
use super::{ElectionEventKind, EventSink};

/// Execute a list of effects using the given transport and sink.
pub(super) async fn execute_effects<T: RingTransport>(
    effects: Vec<ProcessEffect>,
    transport: &T,
    phase: Phase,
    sink: &EventSink,
) {
    for effect in effects {
        match effect {
            ProcessEffect::Send { direction, message } => {
                send_message(transport, direction, &message, phase, sink).await;
            }
            ProcessEffect::Emit(kind) => {
                sink.emit(transport.id(), phase, kind);
            }
        }
    }
}

/// Encode and send one message. Failures are reported, never propagated:
/// a neighbour that already finished simply stops listening.
async fn send_message<T: RingTransport>(
    transport: &T,
    direction: Direction,
    message: &Message,
    phase: Phase,
    sink: &EventSink,
) {
    let frame = match message.to_bytes() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(process = %transport.id(), error = %e, "encode failed, message dropped");
            sink.emit(
                transport.id(),
                phase,
                ElectionEventKind::LinkFailure {
                    direction,
                    reason: e.to_string(),
                },
            );
            return;
        }
    };

    match transport.send_raw(direction, frame).await {
        Ok(()) => sink.record_send(message.kind()),
        Err(e) => {
            tracing::debug!(
                process = %transport.id(),
                %direction,
                kind = ?message.kind(),
                error = %e,
                "send failed, message dropped"
            );
            sink.emit(
                transport.id(),
                phase,
                ElectionEventKind::LinkFailure {
                    direction,
                    reason: e.to_string(),
                },
            );
        }
    }
}
