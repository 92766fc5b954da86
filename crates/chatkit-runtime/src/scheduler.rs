#![forbid(unsafe_code)]

//! Virtual clock, timers, animation frames, and transition waits.
//!
//! The scheduler is the only source of asynchrony in the system. It is
//! fully deterministic: time moves when [`Scheduler::advance`] is
//! called, and due work is drained as an ordered list of [`Wakeup`]s.
//!
//! Transition waits model "wait for all in-flight visual transitions on
//! an element to finish". The contract (drawer close must never hang)
//! is that a wait registered against an element with no active
//! transitions resolves on the very next tick.

use std::collections::HashMap;
use std::time::Duration;

use chatkit_dom::NodeId;

/// Handle to a pending timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Handle to a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Handle to a pending transition wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaitId(pub u64);

/// A resumption delivered by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// A timeout elapsed.
    Timer(TimerId),
    /// The next paint frame arrived.
    Frame(FrameId),
    /// Every in-flight transition on the node finished.
    TransitionsEnded { wait: WaitId, node: NodeId },
}

#[derive(Debug)]
struct TimerEntry {
    id: TimerId,
    deadline: Duration,
    seq: u64,
}

/// The cooperative scheduler.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_seq: u64,
    timers: Vec<TimerEntry>,
    frames: Vec<FrameId>,
    transitions: HashMap<NodeId, u32>,
    waits: Vec<(WaitId, NodeId)>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since the scheduler was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    fn next_id(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    // ─────────────────────────────────────────────────────────────────
    // Timers
    // ─────────────────────────────────────────────────────────────────

    pub fn set_timeout(&mut self, delay: Duration) -> TimerId {
        let seq = self.next_id();
        let id = TimerId(seq);
        self.timers.push(TimerEntry {
            id,
            deadline: self.now + delay,
            seq,
        });
        id
    }

    pub fn clear_timeout(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    // ─────────────────────────────────────────────────────────────────
    // Frames
    // ─────────────────────────────────────────────────────────────────

    pub fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_id());
        self.frames.push(id);
        id
    }

    // ─────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────

    /// Mark one visual transition on `node` as started.
    pub fn begin_transition(&mut self, node: NodeId) {
        *self.transitions.entry(node).or_insert(0) += 1;
    }

    /// Mark one visual transition on `node` as finished.
    pub fn end_transition(&mut self, node: NodeId) {
        if let Some(count) = self.transitions.get_mut(&node) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.transitions.remove(&node);
            }
        }
    }

    #[must_use]
    pub fn active_transitions(&self, node: NodeId) -> u32 {
        self.transitions.get(&node).copied().unwrap_or(0)
    }

    /// Resolve once the node has no in-flight transitions.
    ///
    /// Resolves on the next tick if the set is already empty; a second
    /// wait on the same node is independent, so redundant close calls
    /// are tolerated.
    pub fn wait_transitions(&mut self, node: NodeId) -> WaitId {
        let id = WaitId(self.next_id());
        self.waits.push((id, node));
        id
    }

    // ─────────────────────────────────────────────────────────────────
    // Draining
    // ─────────────────────────────────────────────────────────────────

    /// Drain work that is ready without moving the clock: pending
    /// frames, then transition waits whose node is settled.
    pub fn tick(&mut self) -> Vec<Wakeup> {
        let mut wakeups = Vec::new();
        for frame in self.frames.drain(..) {
            wakeups.push(Wakeup::Frame(frame));
        }
        let mut remaining = Vec::new();
        for (wait, node) in self.waits.drain(..) {
            if self.transitions.get(&node).copied().unwrap_or(0) == 0 {
                wakeups.push(Wakeup::TransitionsEnded { wait, node });
            } else {
                remaining.push((wait, node));
            }
        }
        self.waits = remaining;
        wakeups
    }

    /// Move the clock forward and drain everything that becomes due,
    /// in deadline order (ties broken by registration order).
    pub fn advance(&mut self, by: Duration) -> Vec<Wakeup> {
        let mut wakeups = self.tick();
        self.now += by;
        let now = self.now;

        let mut due: Vec<TimerEntry> = Vec::new();
        let mut remaining = Vec::new();
        for timer in self.timers.drain(..) {
            if timer.deadline <= now {
                due.push(timer);
            } else {
                remaining.push(timer);
            }
        }
        self.timers = remaining;
        due.sort_by_key(|t| (t.deadline, t.seq));
        for timer in due {
            wakeups.push(Wakeup::Timer(timer.id));
        }

        wakeups.extend(self.tick());
        wakeups
    }
}
