//! Scheduled timer events
//!
//! Target timers are queue entries drained by the tick loop instead of
//! callbacks; cancelling one removes its entries.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::target::TargetId;
use crate::Millis;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerEffect {
    /// Pick a fresh motion goal
    Retarget,
}

/// A timer that has come due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub fire_at: Millis,
    pub target: TargetId,
    pub effect: TimerEffect,
}

// Field order drives the derived ordering: earliest first, then insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    fire_at: Millis,
    seq: u64,
    target: TargetId,
    effect: TimerEffect,
}

/// Min-queue of pending timers
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, fire_at: Millis, target: TargetId, effect: TimerEffect) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            fire_at,
            seq,
            target,
            effect,
        }));
    }

    /// Pop the earliest timer if it is due at `now`
    pub fn pop_due(&mut self, now: Millis) -> Option<ScheduledEvent> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.fire_at <= now => {
                let Reverse(entry) = self.heap.pop()?;
                Some(ScheduledEvent {
                    fire_at: entry.fire_at,
                    target: entry.target,
                    effect: entry.effect,
                })
            }
            _ => None,
        }
    }

    /// Drop every pending timer for `target`, returning how many were removed
    pub fn cancel_target(&mut self, target: TargetId) -> usize {
        let before = self.heap.len();
        self.heap.retain(|Reverse(entry)| entry.target != target);
        before - self.heap.len()
    }

    /// Push every pending timer later by `delta` (pause compensation)
    pub fn shift(&mut self, delta: Millis) {
        if delta == 0 {
            return;
        }
        let entries = std::mem::take(&mut self.heap).into_vec();
        self.heap = entries
            .into_iter()
            .map(|Reverse(mut entry)| {
                entry.fire_at = entry.fire_at.saturating_add(delta);
                Reverse(entry)
            })
            .collect();
    }

    pub fn next_fire_at(&self) -> Option<Millis> {
        self.heap.peek().map(|Reverse(entry)| entry.fire_at)
    }

    pub fn is_scheduled(&self, target: TargetId) -> bool {
        self.heap.iter().any(|Reverse(entry)| entry.target == target)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
