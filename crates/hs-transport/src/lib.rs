//! Ring transport for the Hirschberg-Sinclair election.
//!
//! Every process in the ring owns a [`RingPort`]: two outbound links (one per
//! neighbour) and two inbound links. Links are reliable, FIFO, point-to-point
//! channels carrying opaque frames; the protocol layer decides what a frame
//! means.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use hs_transport::{wire_ring, Direction, LinkConfig};
//!
//! # async fn example() -> Result<(), hs_transport::TransportError> {
//! let mut ports = wire_ring(3, &LinkConfig::new())?;
//!
//! // Process 0 sends one frame clockwise (towards process 1)
//! ports[0].send_raw(Direction::Clockwise, Bytes::from_static(b"hello"))?;
//!
//! // Process 1 receives it, tagged with the direction it travelled
//! let (direction, frame) = ports[1].recv_raw().await?;
//! assert_eq!(direction, Direction::Clockwise);
//! assert_eq!(&frame[..], b"hello");
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod link;
mod port;
mod ring;

pub use config::LinkConfig;
pub use error::TransportError;
pub use link::{ring_link, LinkReceiver, LinkSender};
pub use port::RingPort;
pub use ring::wire_ring;

use std::fmt;
use std::str::FromStr;

/// Position of a process in the ring (ordinal `0..N`).
///
/// Stable for the lifetime of the process and unrelated to its priority.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProcessId(usize);

impl ProcessId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Ring index of this process.
    pub const fn index(self) -> usize {
        self.0
    }

    /// The adjacent process in `direction` for a ring of `ring_size` processes.
    ///
    /// Clockwise is `i + 1 mod N`, counter-clockwise is `i - 1 mod N`. With a
    /// single process both neighbours are the process itself.
    pub fn neighbor(self, direction: Direction, ring_size: usize) -> ProcessId {
        debug_assert!(ring_size > 0, "ring must not be empty");
        match direction {
            Direction::Clockwise => Self((self.0 + 1) % ring_size),
            Direction::CounterClockwise => Self((self.0 + ring_size - 1) % ring_size),
        }
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl fmt::Debug for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessId({})", self.0)
    }
}

impl FromStr for ProcessId {
    type Err = TransportError;

    /// Accepts both `3` and `P3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('P').unwrap_or(s);
        digits
            .parse::<usize>()
            .map(Self)
            .map_err(|_| TransportError::InvalidProcessId(s.to_string()))
    }
}

/// The outbound edge a frame travels on.
///
/// This is a link name, not a compass heading: a frame sent clockwise by
/// process `i` arrives at `i + 1` on its counter-clockwise side and still
/// travels clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Both directions, clockwise first.
    pub const BOTH: [Direction; 2] = [Direction::Clockwise, Direction::CounterClockwise];

    pub const fn reverse(self) -> Direction {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Clockwise => write!(f, "CW"),
            Direction::CounterClockwise => write!(f, "CCW"),
        }
    }
}
