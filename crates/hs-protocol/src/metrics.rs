//! Message accounting shared between process tasks and the ring monitor.
//!
//! Counters are observability only; no protocol decision ever reads them.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::message::MessageKind;

/// A monotonically increasing counter backed by [`AtomicU64`].
///
/// Uses [`Ordering::Relaxed`]: the monitor only needs eventually accurate
/// totals, not cross-thread ordering.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Ring-wide counters, one per message kind plus failure counters.
///
/// Every hop counts: a probe relayed three times counts four sends.
#[derive(Debug, Default)]
pub struct MessageCounters {
    pub probes: Counter,
    pub replies: Counter,
    pub elected: Counter,
    pub violations: Counter,
    pub link_failures: Counter,
}

impl MessageCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful send of `kind`.
    pub fn record_send(&self, kind: MessageKind) {
        match kind {
            MessageKind::Probe => self.probes.inc(),
            MessageKind::Reply => self.replies.inc(),
            MessageKind::Elected => self.elected.inc(),
        }
    }

    /// Messages of every kind sent so far.
    pub fn total(&self) -> u64 {
        self.probes.get() + self.replies.get() + self.elected.get()
    }

    /// Point-in-time copy for reporting.
    pub fn stats(&self) -> MessageStats {
        MessageStats {
            probes: self.probes.get(),
            replies: self.replies.get(),
            elected: self.elected.get(),
            violations: self.violations.get(),
            link_failures: self.link_failures.get(),
        }
    }
}

/// Plain snapshot of [`MessageCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub probes: u64,
    pub replies: u64,
    pub elected: u64,
    pub violations: u64,
    pub link_failures: u64,
}

impl MessageStats {
    pub fn total(&self) -> u64 {
        self.probes + self.replies + self.elected
    }
}
