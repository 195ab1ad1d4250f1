use crate::error::ElectionError;
use crate::message::Message;
use crate::types::{
    probe_distance, spans_ring, Direction, Phase, Priority, ProcessId, ProcessRole, Rank,
};

use super::effect::ProcessEffect;
use super::{ElectionEventKind, ProcessSnapshot};

/// Replies received for the current phase, keyed by the probe they answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ReplySet {
    clockwise: bool,
    counter_clockwise: bool,
}

impl ReplySet {
    /// Mark the probe sent in `direction` as answered.
    /// Returns `false` if it was already answered.
    fn record(&mut self, direction: Direction) -> bool {
        let slot = match direction {
            Direction::Clockwise => &mut self.clockwise,
            Direction::CounterClockwise => &mut self.counter_clockwise,
        };
        !std::mem::replace(slot, true)
    }

    fn complete(&self) -> bool {
        self.clockwise && self.counter_clockwise
    }
}

/// Election state of one process. Pure logic: no async, no I/O.
///
/// Every `handle_*` method returns `Vec<ProcessEffect>`; none of them touch
/// the links directly.
#[derive(Debug, Clone)]
pub struct ElectionState {
    id: ProcessId,
    priority: Priority,
    ring_size: usize,
    role: ProcessRole,
    phase: Phase,
    replies: ReplySet,
    /// Winner, once known (self for the leader, ELECTED origin otherwise).
    leader: Option<ProcessId>,
    /// Nothing left to do: ELECTED came back (leader) or was relayed.
    finished: bool,
}

impl ElectionState {
    pub fn new(id: ProcessId, priority: Priority, ring_size: usize) -> Self {
        Self {
            id,
            priority,
            ring_size,
            role: ProcessRole::Active,
            phase: 0,
            replies: ReplySet::default(),
            leader: None,
            finished: false,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn leader(&self) -> Option<ProcessId> {
        self.leader
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            id: self.id,
            priority: self.priority,
            role: self.role,
            phase: self.phase,
            leader: self.leader,
            finished: self.finished,
        }
    }

    fn rank(&self) -> Rank {
        Rank::new(self.id, self.priority)
    }

    // ── Start ────────────────────────────────────────────────────────────

    /// Issue the phase-0 probes. A ring of one wins on the spot.
    pub fn handle_start(&mut self) -> Vec<ProcessEffect> {
        tracing::debug!(
            process = %self.id,
            priority = %self.priority,
            ring_size = self.ring_size,
            "election started"
        );
        self.begin_phase()
    }

    // ── Incoming ─────────────────────────────────────────────────────────

    /// Handle a decoded message that travelled in `arrived` direction.
    pub fn handle_message(&mut self, arrived: Direction, message: Message) -> Vec<ProcessEffect> {
        if let Err(e) = message.validate(arrived) {
            let reason = match e {
                ElectionError::ProtocolViolation { reason } => reason,
                other => other.to_string(),
            };
            return self.handle_violation(reason);
        }

        match message {
            Message::Probe {
                origin,
                priority,
                direction,
                hops_remaining,
            } => self.on_probe(origin, priority, direction, hops_remaining),
            Message::Reply {
                origin,
                priority,
                direction,
            } => self.on_reply(origin, priority, direction),
            Message::Elected { origin } => self.on_elected(origin),
        }
    }

    /// A malformed message reached this process.
    ///
    /// Contained here: an active process gives up its candidacy so the ring
    /// does not wait on it, and keeps relaying. A leader keeps its role, its
    /// ELECTED is already travelling.
    pub fn handle_violation(&mut self, reason: String) -> Vec<ProcessEffect> {
        tracing::warn!(process = %self.id, %reason, "protocol violation");
        let mut effects = vec![ProcessEffect::Emit(ElectionEventKind::ProtocolViolation {
            reason,
        })];
        if self.role == ProcessRole::Active {
            self.role = ProcessRole::Defeated;
            tracing::info!(process = %self.id, phase = self.phase, "defeated by protocol violation");
            effects.push(ProcessEffect::Emit(ElectionEventKind::Defeated));
        }
        effects
    }

    fn on_probe(
        &mut self,
        origin: ProcessId,
        priority: Priority,
        direction: Direction,
        hops_remaining: u64,
    ) -> Vec<ProcessEffect> {
        if origin == self.id {
            // Probe distance stays below the ring size, so only a corrupted
            // frame can bring a probe home.
            return self.handle_violation(format!(
                "own probe returned home with {hops_remaining} hops remaining"
            ));
        }

        if Rank::new(origin, priority) < self.rank() {
            tracing::debug!(process = %self.id, %origin, %priority, "probe swallowed");
            return vec![ProcessEffect::Emit(ElectionEventKind::ProbeSwallowed { origin })];
        }

        let hops_remaining = hops_remaining - 1;
        if hops_remaining > 0 {
            tracing::debug!(process = %self.id, %origin, hops_remaining, %direction, "probe relayed");
            return vec![
                ProcessEffect::Emit(ElectionEventKind::ProbeRelayed {
                    origin,
                    hops_remaining,
                }),
                ProcessEffect::Send {
                    direction,
                    message: Message::Probe {
                        origin,
                        priority,
                        direction,
                        hops_remaining,
                    },
                },
            ];
        }

        let back = direction.reverse();
        tracing::debug!(process = %self.id, %origin, %back, "probe exhausted, replying");
        vec![
            ProcessEffect::Emit(ElectionEventKind::ReplySent { origin }),
            ProcessEffect::Send {
                direction: back,
                message: Message::Reply {
                    origin,
                    priority,
                    direction: back,
                },
            },
        ]
    }

    fn on_reply(
        &mut self,
        origin: ProcessId,
        priority: Priority,
        direction: Direction,
    ) -> Vec<ProcessEffect> {
        if origin != self.id {
            return vec![
                ProcessEffect::Emit(ElectionEventKind::ReplyRelayed { origin }),
                ProcessEffect::Send {
                    direction,
                    message: Message::Reply {
                        origin,
                        priority,
                        direction,
                    },
                },
            ];
        }

        if priority != self.priority {
            return self.handle_violation(format!(
                "reply for {origin} carries priority {priority}, expected {}",
                self.priority
            ));
        }

        if self.role != ProcessRole::Active {
            tracing::debug!(process = %self.id, role = %self.role, "stale reply ignored");
            return Vec::new();
        }

        // A reply travelling counter-clockwise answers the clockwise probe.
        let answered = direction.reverse();
        if !self.replies.record(answered) {
            tracing::debug!(process = %self.id, %answered, phase = self.phase, "duplicate reply ignored");
            return Vec::new();
        }

        let mut effects = vec![ProcessEffect::Emit(ElectionEventKind::ReplyReceived {
            probe: answered,
        })];
        if !self.replies.complete() {
            return effects;
        }

        self.phase += 1;
        tracing::debug!(process = %self.id, phase = self.phase, "phase survived, advancing");
        effects.push(ProcessEffect::Emit(ElectionEventKind::PhaseAdvanced));
        effects.extend(self.begin_phase());
        effects
    }

    fn on_elected(&mut self, origin: ProcessId) -> Vec<ProcessEffect> {
        if origin == self.id {
            if self.role == ProcessRole::Leader && !self.finished {
                self.finished = true;
                tracing::info!(process = %self.id, "ELECTED completed the ring");
                return vec![ProcessEffect::Emit(ElectionEventKind::ElectionComplete)];
            }
            return self.handle_violation(format!(
                "ELECTED for {origin} returned to a {} process",
                self.role
            ));
        }

        if self.role == ProcessRole::Leader {
            return self.handle_violation(format!("competing ELECTED from {origin}"));
        }

        if self.leader.is_some() {
            tracing::debug!(process = %self.id, %origin, "duplicate ELECTED ignored");
            return Vec::new();
        }

        self.leader = Some(origin);
        let mut effects = Vec::with_capacity(3);
        if self.role == ProcessRole::Active {
            self.role = ProcessRole::Defeated;
            tracing::info!(process = %self.id, leader = %origin, phase = self.phase, "defeated");
            effects.push(ProcessEffect::Emit(ElectionEventKind::Defeated));
        }
        effects.push(ProcessEffect::Emit(ElectionEventKind::ElectedRelayed { leader: origin }));
        effects.push(ProcessEffect::Send {
            direction: Direction::Clockwise,
            message: Message::Elected { origin },
        });
        self.finished = true;
        effects
    }

    // ── Phases ───────────────────────────────────────────────────────────

    fn begin_phase(&mut self) -> Vec<ProcessEffect> {
        if spans_ring(self.phase, self.ring_size) {
            return self.declare_leader();
        }

        self.replies = ReplySet::default();
        let hops = probe_distance(self.phase);
        let mut effects = vec![ProcessEffect::Emit(ElectionEventKind::ProbesIssued { hops })];
        for direction in Direction::BOTH {
            effects.push(ProcessEffect::Send {
                direction,
                message: Message::Probe {
                    origin: self.id,
                    priority: self.priority,
                    direction,
                    hops_remaining: hops,
                },
            });
        }
        effects
    }

    fn declare_leader(&mut self) -> Vec<ProcessEffect> {
        self.role = ProcessRole::Leader;
        self.leader = Some(self.id);
        tracing::info!(
            process = %self.id,
            priority = %self.priority,
            phase = self.phase,
            "declared leader"
        );
        vec![
            ProcessEffect::Emit(ElectionEventKind::LeaderDeclared),
            ProcessEffect::Send {
                direction: Direction::Clockwise,
                message: Message::Elected { origin: self.id },
            },
        ]
    }
}
