//! The per-process event loop.
//!
//! A single async task that owns one `ElectionState` and multiplexes over
//! inbound frames and the ring-wide shutdown signal.

use tokio::sync::watch;

use crate::message::Message;

use super::executor::execute_effects;
use super::state::ElectionState;
use super::transport::RingTransport;
use super::{EventSink, ProcessSnapshot};

/// Run one process until it finishes, its links close, or shutdown is signalled.
pub(super) async fn process_loop<T: RingTransport>(
    mut state: ElectionState,
    mut transport: T,
    snapshot_tx: watch::Sender<ProcessSnapshot>,
    sink: EventSink,
    mut shutdown: watch::Receiver<bool>,
) -> ProcessSnapshot {
    if *shutdown.borrow() {
        return state.snapshot();
    }

    let effects = state.handle_start();
    execute_effects(effects, &transport, state.phase(), &sink).await;
    snapshot_tx.send_replace(state.snapshot());

    while !state.is_finished() {
        tokio::select! {
            // ── 1. Frame from a neighbour ───────────────────────
            result = transport.recv_raw() => {
                let (arrived, frame) = match result {
                    Ok(received) => received,
                    Err(e) => {
                        tracing::debug!(process = %state.id(), "receive loop ended: {e}");
                        break;
                    }
                };

                let effects = match Message::from_bytes(&frame) {
                    Ok(message) => {
                        tracing::trace!(process = %state.id(), %arrived, ?message, "received");
                        state.handle_message(arrived, message)
                    }
                    Err(e) => state.handle_violation(format!("undecodable frame: {e}")),
                };
                execute_effects(effects, &transport, state.phase(), &sink).await;
                snapshot_tx.send_replace(state.snapshot());
            }

            // ── 2. Shutdown ─────────────────────────────────────
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!(process = %state.id(), role = %state.role(), "shutdown");
                    break;
                }
            }
        }
    }

    tracing::debug!(
        process = %state.id(),
        role = %state.role(),
        phase = state.phase(),
        finished = state.is_finished(),
        "process stopped"
    );
    state.snapshot()
}
