use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ElectionError;
use crate::types::{Direction, Priority, ProcessId};

/// Election message, the only thing that crosses a ring link.
///
/// Serialized as MessagePack. `direction` always names the link the message
/// is travelling on; relays keep it, replies reverse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// "Is anyone within `hops_remaining` hops stronger than me?"
    Probe {
        origin: ProcessId,
        priority: Priority,
        direction: Direction,
        hops_remaining: u64,
    },
    /// The probe of `origin` reached its full distance unbeaten.
    Reply {
        origin: ProcessId,
        priority: Priority,
        direction: Direction,
    },
    /// `origin` won. Travels clockwise once around the ring.
    Elected { origin: ProcessId },
}

/// Message kind, used for accounting and trace output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Probe,
    Reply,
    Elected,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Probe { .. } => MessageKind::Probe,
            Message::Reply { .. } => MessageKind::Reply,
            Message::Elected { .. } => MessageKind::Elected,
        }
    }

    /// Process that created this message.
    pub fn origin(&self) -> ProcessId {
        match self {
            Message::Probe { origin, .. }
            | Message::Reply { origin, .. }
            | Message::Elected { origin } => *origin,
        }
    }

    /// Direction carried in the payload. ELECTED always travels clockwise.
    pub fn direction(&self) -> Direction {
        match self {
            Message::Probe { direction, .. } | Message::Reply { direction, .. } => *direction,
            Message::Elected { .. } => Direction::Clockwise,
        }
    }

    /// Serialize to a MessagePack frame.
    pub fn to_bytes(&self) -> Result<Bytes, ElectionError> {
        rmp_serde::to_vec(self).map(Bytes::from).map_err(Into::into)
    }

    /// Deserialize from a MessagePack frame.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ElectionError> {
        rmp_serde::from_slice(data).map_err(Into::into)
    }

    /// Check the payload against the edge it arrived on.
    ///
    /// A probe must have at least one hop left, and every message must carry
    /// the direction it actually travelled in.
    pub fn validate(&self, arrived: Direction) -> Result<(), ElectionError> {
        if let Message::Probe {
            hops_remaining: 0, ..
        } = self
        {
            return Err(ElectionError::ProtocolViolation {
                reason: "probe with zero hops remaining".into(),
            });
        }
        if self.direction() != arrived {
            return Err(ElectionError::ProtocolViolation {
                reason: format!(
                    "{:?} tagged {} arrived travelling {}",
                    self.kind(),
                    self.direction(),
                    arrived
                ),
            });
        }
        Ok(())
    }
}
