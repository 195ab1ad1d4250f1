use crate::config::LinkConfig;
use crate::link::{ring_link, LinkReceiver};
use crate::port::RingPort;
use crate::{Direction, ProcessId, TransportError};

/// Wire `ring_size` processes into a bidirectional ring.
///
/// Creates `2 * ring_size` directed links. Port `i` sends clockwise to
/// `i + 1 mod N` and counter-clockwise to `i - 1 mod N`. A single process is
/// wired to itself on both sides.
pub fn wire_ring(ring_size: usize, config: &LinkConfig) -> Result<Vec<RingPort>, TransportError> {
    if ring_size == 0 {
        return Err(TransportError::EmptyRing);
    }

    let mut clockwise_tx = Vec::with_capacity(ring_size);
    let mut counter_clockwise_tx = Vec::with_capacity(ring_size);
    let mut clockwise_rx: Vec<Option<LinkReceiver>> = (0..ring_size).map(|_| None).collect();
    let mut counter_clockwise_rx: Vec<Option<LinkReceiver>> =
        (0..ring_size).map(|_| None).collect();

    for index in 0..ring_size {
        let id = ProcessId::new(index);

        let next = id.neighbor(Direction::Clockwise, ring_size);
        let (tx, rx) = ring_link(id, next, Direction::Clockwise, config);
        clockwise_tx.push(tx);
        clockwise_rx[next.index()] = Some(rx);

        let prev = id.neighbor(Direction::CounterClockwise, ring_size);
        let (tx, rx) = ring_link(id, prev, Direction::CounterClockwise, config);
        counter_clockwise_tx.push(tx);
        counter_clockwise_rx[prev.index()] = Some(rx);
    }

    let ports = clockwise_tx
        .into_iter()
        .zip(counter_clockwise_tx)
        .zip(clockwise_rx.into_iter().zip(counter_clockwise_rx))
        .enumerate()
        .filter_map(|(index, ((cw_tx, ccw_tx), (cw_rx, ccw_rx)))| {
            // Every slot is filled by exactly one neighbour in the loop above.
            Some(RingPort::new(
                ProcessId::new(index),
                ring_size,
                cw_tx,
                ccw_tx,
                cw_rx?,
                ccw_rx?,
            ))
        })
        .collect::<Vec<_>>();

    tracing::debug!(ring_size, links = 2 * ring_size, "ring wired");
    Ok(ports)
}
