use bytes::Bytes;
use hs_transport::{RingPort, TransportError};

use crate::types::{Direction, ProcessId};

/// Link abstraction for one election process.
///
/// In production: impl by `RingPort` (in-memory ring links).
/// In tests: impl by `MockTransport` (records sends, injects frames).
#[async_trait::async_trait]
pub trait RingTransport: Send {
    /// Identity of the process this transport belongs to.
    fn id(&self) -> ProcessId;

    /// Number of processes in the ring.
    fn ring_size(&self) -> usize;

    /// Send one frame on the outbound link for `direction`.
    async fn send_raw(&self, direction: Direction, frame: Bytes) -> Result<(), TransportError>;

    /// Wait for the next frame from either neighbour, with the direction it
    /// travelled in.
    async fn recv_raw(&mut self) -> Result<(Direction, Bytes), TransportError>;
}

// ── Impl for RingPort (production) ──────────────────────────────────

#[async_trait::async_trait]
impl RingTransport for RingPort {
    fn id(&self) -> ProcessId {
        RingPort::id(self)
    }

    fn ring_size(&self) -> usize {
        RingPort::ring_size(self)
    }

    async fn send_raw(&self, direction: Direction, frame: Bytes) -> Result<(), TransportError> {
        RingPort::send_raw(self, direction, frame)
    }

    async fn recv_raw(&mut self) -> Result<(Direction, Bytes), TransportError> {
        RingPort::recv_raw(self).await
    }
}

// ── MockTransport (tests) ───────────────────────────────────────────
