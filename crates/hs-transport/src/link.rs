use bytes::Bytes;
use tokio::sync::mpsc;

use crate::config::LinkConfig;
use crate::{Direction, ProcessId, TransportError};

/// Create one directed ring edge `from -> to`.
///
/// The queue is unbounded: a send never waits for the receiver, so two
/// neighbours flooding each other cannot deadlock.
pub fn ring_link(
    from: ProcessId,
    to: ProcessId,
    direction: Direction,
    config: &LinkConfig,
) -> (LinkSender, LinkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        LinkSender {
            from,
            to,
            direction,
            max_frame_size: config.max_frame_size,
            tx,
        },
        LinkReceiver {
            from,
            to,
            direction,
            rx,
        },
    )
}

/// Sending half of a directed ring edge.
#[derive(Debug)]
pub struct LinkSender {
    from: ProcessId,
    to: ProcessId,
    direction: Direction,
    max_frame_size: usize,
    tx: mpsc::UnboundedSender<Bytes>,
}

impl LinkSender {
    /// Enqueue a frame for in-order delivery to the other endpoint.
    pub fn send(&self, frame: Bytes) -> Result<(), TransportError> {
        if frame.len() > self.max_frame_size {
            return Err(TransportError::FrameTooLarge {
                size: frame.len(),
                max: self.max_frame_size,
            });
        }
        self.tx.send(frame).map_err(|_| TransportError::LinkClosed {
            from: self.from,
            to: self.to,
            direction: self.direction,
        })
    }

    pub fn from(&self) -> ProcessId {
        self.from
    }

    pub fn to(&self) -> ProcessId {
        self.to
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// True once the receiving endpoint has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half of a directed ring edge.
#[derive(Debug)]
pub struct LinkReceiver {
    from: ProcessId,
    to: ProcessId,
    direction: Direction,
    rx: mpsc::UnboundedReceiver<Bytes>,
}

impl LinkReceiver {
    /// Next frame in FIFO order. Suspends until one arrives.
    ///
    /// Returns `None` once the sender is dropped and the queue is drained.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    pub fn from(&self) -> ProcessId {
        self.from
    }

    pub fn to(&self) -> ProcessId {
        self.to
    }

    /// Direction frames on this link travel in.
    pub fn direction(&self) -> Direction {
        self.direction
    }
}
