//! Single-threaded ring driver for `ElectionState`.
//!
//! Keeps one FIFO queue per directed link and lets the caller pick which
//! link delivers next, so any interleaving the real runtime could produce
//! can be replayed deterministically.

#![allow(dead_code)]

use std::collections::VecDeque;

use hs_protocol::{
    Direction, ElectionEventKind, ElectionState, Message, Priority, ProcessEffect, ProcessId,
    ProcessSnapshot,
};

pub struct LockstepRing {
    states: Vec<ElectionState>,
    /// Index `2 * from + dir`, dir 0 = clockwise, 1 = counter-clockwise.
    links: Vec<VecDeque<Message>>,
    pub sent: u64,
    pub events: Vec<(ProcessId, ElectionEventKind)>,
}

fn link_index(from: ProcessId, direction: Direction) -> usize {
    let dir = match direction {
        Direction::Clockwise => 0,
        Direction::CounterClockwise => 1,
    };
    2 * from.index() + dir
}

impl LockstepRing {
    /// Build the ring and start every process.
    pub fn new(priorities: &[u64]) -> Self {
        let n = priorities.len();
        let mut ring = Self {
            states: priorities
                .iter()
                .enumerate()
                .map(|(i, p)| ElectionState::new(ProcessId::new(i), Priority(*p), n))
                .collect(),
            links: vec![VecDeque::new(); 2 * n],
            sent: 0,
            events: Vec::new(),
        };
        for i in 0..n {
            let effects = ring.states[i].handle_start();
            ring.apply(i, effects);
        }
        ring
    }

    fn apply(&mut self, from: usize, effects: Vec<ProcessEffect>) {
        let id = ProcessId::new(from);
        for effect in effects {
            match effect {
                ProcessEffect::Send { direction, message } => {
                    self.sent += 1;
                    self.links[link_index(id, direction)].push_back(message);
                }
                ProcessEffect::Emit(kind) => self.events.push((id, kind)),
            }
        }
    }

    /// Links with at least one message waiting.
    pub fn ready_links(&self) -> Vec<usize> {
        (0..self.links.len())
            .filter(|i| !self.links[*i].is_empty())
            .collect()
    }

    /// Deliver the head of link `link`. Finished processes no longer listen,
    /// so their frames are dropped.
    pub fn deliver(&mut self, link: usize) {
        let n = self.states.len();
        let Some(message) = self.links[link].pop_front() else {
            return;
        };
        let from = ProcessId::new(link / 2);
        let direction = if link % 2 == 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        let to = from.neighbor(direction, n).index();
        if self.states[to].is_finished() {
            return;
        }
        let effects = self.states[to].handle_message(direction, message);
        self.apply(to, effects);
    }

    /// Deliver until every link is empty. `choose(k)` picks one of `k` ready links.
    pub fn run_with(&mut self, mut choose: impl FnMut(usize) -> usize) {
        let mut steps = 0u64;
        loop {
            let ready = self.ready_links();
            if ready.is_empty() {
                return;
            }
            let pick = choose(ready.len()) % ready.len();
            self.deliver(ready[pick]);
            steps += 1;
            assert!(steps < 1_000_000, "lockstep ring did not quiesce");
        }
    }

    /// Always deliver from the lowest-numbered ready link.
    pub fn run_in_order(&mut self) {
        self.run_with(|_| 0);
    }

    pub fn snapshots(&self) -> Vec<ProcessSnapshot> {
        self.states.iter().map(|s| s.snapshot()).collect()
    }

    pub fn events_of(&self, id: ProcessId) -> Vec<ElectionEventKind> {
        self.events
            .iter()
            .filter(|(p, _)| *p == id)
            .map(|(_, kind)| kind.clone())
            .collect()
    }
}
