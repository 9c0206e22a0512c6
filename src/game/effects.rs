//! Timed power-up effects
//!
//! Every pickup schedules its own expiry on the simulation clock. Expiries
//! live in a min-heap that the engine polls once per tick, so resetting a
//! game is just [`ActiveEffects::clear`] and no stale timer can outlive it.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::time::Duration;

use super::state::PowerUpKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Expiry {
    at: Duration,
    seq: u64,
    kind: PowerUpKind,
}

/// The set of effects currently in force
///
/// Overlapping pickups of the same kind are counted separately; the kind
/// stays active until its last instance expires.
#[derive(Debug, Clone, Default)]
pub struct ActiveEffects {
    queue: BinaryHeap<Reverse<Expiry>>,
    counts: BTreeMap<PowerUpKind, usize>,
    next_seq: u64,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start one instance of `kind` that ends at `expires_at`
    pub fn activate(&mut self, kind: PowerUpKind, expires_at: Duration) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Expiry {
            at: expires_at,
            seq,
            kind,
        }));
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    /// Drop every instance whose expiry is at or before `now`
    ///
    /// Returns the kinds that stopped being active as a result.
    pub fn expire(&mut self, now: Duration) -> Vec<PowerUpKind> {
        let mut ended = Vec::new();

        while let Some(Reverse(next)) = self.queue.peek() {
            if next.at > now {
                break;
            }
            let kind = next.kind;
            self.queue.pop();

            if let Some(count) = self.counts.get_mut(&kind) {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(&kind);
                    ended.push(kind);
                }
            }
        }

        ended
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.counts.contains_key(&kind)
    }

    /// Active kinds in a stable order
    pub fn kinds(&self) -> impl Iterator<Item = PowerUpKind> + '_ {
        self.counts.keys().copied()
    }

    /// Time left on the longest-running instance of `kind`
    pub fn remaining(&self, kind: PowerUpKind, now: Duration) -> Option<Duration> {
        self.queue
            .iter()
            .filter(|Reverse(e)| e.kind == kind)
            .map(|Reverse(e)| e.at.saturating_sub(now))
            .max()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
