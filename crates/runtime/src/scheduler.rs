//! Virtual-time event queue.
//!
//! Events are ordered by due time, then by the order they were pushed, so
//! wakeups scheduled for the same instant fire FIFO.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use behavior_tree::Wakeup;

use crate::entity::ActorId;

/// A wakeup waiting in the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub due: u64,
    pub seq: u64,
    pub actor: ActorId,
    pub wakeup: Wakeup,
}

impl Ord for Scheduled {
    // Reversed so the max-heap pops the earliest (due, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Scheduled>,
    now: u64,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Schedules `wakeup` for `actor` at `now + delay`.
    pub fn push(&mut self, delay: u64, actor: ActorId, wakeup: Wakeup) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled {
            due: self.now.saturating_add(delay),
            seq,
            actor,
            wakeup,
        });
    }

    /// Due time of the next event, if any.
    pub fn peek_due(&self) -> Option<u64> {
        self.heap.peek().map(|event| event.due)
    }

    /// Removes the next event and advances the clock to its due time.
    pub fn pop(&mut self) -> Option<Scheduled> {
        let event = self.heap.pop()?;
        self.now = self.now.max(event.due);
        Some(event)
    }

    /// Moves the clock forward to `time` without firing anything.
    ///
    /// Never moves the clock backwards or past a pending event.
    pub fn advance_to(&mut self, time: u64) {
        let limit = self.peek_due().map_or(time, |due| due.min(time));
        self.now = self.now.max(limit);
    }

    /// Drops every pending event addressed to `actor`.
    pub fn forget(&mut self, actor: ActorId) {
        self.heap.retain(|event| event.actor != actor);
    }
}
