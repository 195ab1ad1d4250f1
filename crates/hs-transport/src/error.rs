use crate::{Direction, ProcessId};

/// Errors returned by the ring transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("link {from} -> {to} ({direction}) is closed")]
    LinkClosed {
        from: ProcessId,
        to: ProcessId,
        direction: Direction,
    },

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("all inbound links are closed")]
    Shutdown,

    #[error("invalid process id: {0}")]
    InvalidProcessId(String),

    #[error("a ring needs at least one process")]
    EmptyRing,
}
