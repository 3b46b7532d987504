//! Virtual-time timers
//!
//! Single-threaded stand-in for `setInterval`/`setTimeout`. The host advances
//! time explicitly; due timers come out in (deadline, scheduling order), so two
//! timers armed for the same instant fire in the order they were armed.
//!
//! Every timer carries a [`CancelToken`]. Cancelling the token drops all work
//! armed with it, which is how an owner tears down its pending callbacks.

use std::cell::Cell;
use std::rc::Rc;

/// Milliseconds on the scene clock
pub type Millis = u64;

/// Shared cancellation flag, captured when a timer is armed
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Handle for cancelling a single timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<A> {
    id: TimerId,
    due: Millis,
    /// Arm order, breaks deadline ties
    seq: u64,
    /// Some(period) for repeating timers
    period: Option<Millis>,
    action: A,
    token: CancelToken,
}

/// Timer queue over actions of type `A`
#[derive(Debug)]
pub struct Scheduler<A> {
    now: Millis,
    entries: Vec<Entry<A>>,
    next_seq: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            now: 0,
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Current scheduler time
    pub fn now(&self) -> Millis {
        self.now
    }

    fn arm(
        &mut self,
        delay: Millis,
        period: Option<Millis>,
        action: A,
        token: &CancelToken,
    ) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        self.entries.push(Entry {
            id,
            due: self.now + delay,
            seq,
            period,
            action,
            token: token.clone(),
        });
        id
    }

    /// Fire `action` once, `delay` ms from now
    pub fn schedule_once(&mut self, delay: Millis, action: A, token: &CancelToken) -> TimerId {
        self.arm(delay, None, action, token)
    }

    /// Fire `action` every `period` ms, first firing one period from now
    pub fn schedule_every(&mut self, period: Millis, action: A, token: &CancelToken) -> TimerId {
        let period = period.max(1);
        self.arm(period, Some(period), action, token)
    }

    /// Cancel a single timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Number of live (not cancelled) timers
    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.token.is_cancelled())
            .count()
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, time: Millis) {
        self.now = self.now.max(time);
    }
}

impl<A: Clone> Scheduler<A> {
    /// Pop the earliest timer due at or before `until`.
    ///
    /// Advances the clock to that timer's deadline. Repeating timers are
    /// re-armed one period later; cancelled timers are discarded on the way.
    pub fn pop_due(&mut self, until: Millis) -> Option<(Millis, A)> {
        self.entries.retain(|e| !e.token.is_cancelled());

        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;

        let due = self.entries[idx].due;
        self.now = self.now.max(due);

        let action = match self.entries[idx].period {
            Some(period) => {
                // Re-arm in place; a fresh seq keeps it behind timers armed earlier
                let seq = self.next_seq;
                self.next_seq += 1;
                let entry = &mut self.entries[idx];
                entry.due += period;
                entry.seq = seq;
                entry.action.clone()
            }
            None => self.entries.swap_remove(idx).action,
        };

        Some((due, action))
    }
}
