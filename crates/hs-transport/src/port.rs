use bytes::Bytes;

use crate::link::{LinkReceiver, LinkSender};
use crate::{Direction, ProcessId, TransportError};

/// One process's view of the ring: a sender towards each neighbour and a
/// receiver from each neighbour.
///
/// Built by [`wire_ring`](crate::wire_ring).
#[derive(Debug)]
pub struct RingPort {
    id: ProcessId,
    ring_size: usize,
    clockwise_tx: LinkSender,
    counter_clockwise_tx: LinkSender,
    /// Frames travelling clockwise, sent by the counter-clockwise neighbour.
    clockwise_rx: Option<LinkReceiver>,
    /// Frames travelling counter-clockwise, sent by the clockwise neighbour.
    counter_clockwise_rx: Option<LinkReceiver>,
}

impl RingPort {
    pub(crate) fn new(
        id: ProcessId,
        ring_size: usize,
        clockwise_tx: LinkSender,
        counter_clockwise_tx: LinkSender,
        clockwise_rx: LinkReceiver,
        counter_clockwise_rx: LinkReceiver,
    ) -> Self {
        Self {
            id,
            ring_size,
            clockwise_tx,
            counter_clockwise_tx,
            clockwise_rx: Some(clockwise_rx),
            counter_clockwise_rx: Some(counter_clockwise_rx),
        }
    }

    /// The process this port belongs to.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size
    }

    /// The neighbour reached by sending in `direction`.
    pub fn neighbor(&self, direction: Direction) -> ProcessId {
        self.id.neighbor(direction, self.ring_size)
    }

    /// Send a frame on the outbound link for `direction`.
    pub fn send_raw(&self, direction: Direction, frame: Bytes) -> Result<(), TransportError> {
        match direction {
            Direction::Clockwise => self.clockwise_tx.send(frame),
            Direction::CounterClockwise => self.counter_clockwise_tx.send(frame),
        }
    }

    /// Receive the next frame from whichever inbound link is ready first.
    ///
    /// Returns the direction the frame travelled. A closed inbound link is
    /// retired and the port keeps waiting on the other one; once both are
    /// closed this returns [`TransportError::Shutdown`].
    pub async fn recv_raw(&mut self) -> Result<(Direction, Bytes), TransportError> {
        loop {
            if self.clockwise_rx.is_none() && self.counter_clockwise_rx.is_none() {
                return Err(TransportError::Shutdown);
            }

            let (direction, frame) = tokio::select! {
                frame = next_frame(self.clockwise_rx.as_mut()), if self.clockwise_rx.is_some() => {
                    (Direction::Clockwise, frame)
                }
                frame = next_frame(self.counter_clockwise_rx.as_mut()), if self.counter_clockwise_rx.is_some() => {
                    (Direction::CounterClockwise, frame)
                }
                else => return Err(TransportError::Shutdown),
            };

            match frame {
                Some(frame) => return Ok((direction, frame)),
                None => {
                    tracing::debug!(
                        process = %self.id,
                        %direction,
                        "inbound link closed by neighbour"
                    );
                    self.inbound_mut(direction).take();
                }
            }
        }
    }

    fn inbound_mut(&mut self, direction: Direction) -> &mut Option<LinkReceiver> {
        match direction {
            Direction::Clockwise => &mut self.clockwise_rx,
            Direction::CounterClockwise => &mut self.counter_clockwise_rx,
        }
    }
}

async fn next_frame(rx: Option<&mut LinkReceiver>) -> Option<Bytes> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
