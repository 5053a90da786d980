//! Cooperative timer scheduler.
//!
//! Every self-rescheduling loop of the game (countdown, spawn loop, wave
//! loop, end-game watchdog, pool releases) runs on a `Scheduler`. Nothing
//! fires on its own: the owner advances the clock once per tick and pops due
//! timers one at a time, so a callback can re-arm or cancel other timers
//! before the next one is delivered.
//!
//! Due timers are delivered by deadline, ties broken by scheduling order.
//! While a timer is being delivered `now()` reports its deadline, so a loop
//! that re-arms from inside its callback keeps a cadence that does not drift
//! with the host tick size.

use std::time::Duration;

/// Handle of a scheduled timer. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct PendingTimer<T> {
    id: TimerId,
    deadline: Duration,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    horizon: Duration,
    next_id: u64,
    pending: Vec<PendingTimer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingTimer {
            id,
            deadline: self.now + delay,
            payload,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let index = self.pending.iter().position(|t| t.id == id)?;
        Some(self.pending.remove(index).payload)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    /// Time left before `id` fires, `None` if it is not pending.
    pub fn remaining(&self, id: TimerId) -> Option<Duration> {
        self.pending
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.deadline.saturating_sub(self.now))
    }

    /// Cancels whatever timer the slot holds, then schedules a fresh one in it.
    pub fn rearm(&mut self, slot: &mut Option<TimerId>, delay: Duration, payload: T) -> TimerId {
        self.cancel_slot(slot);
        let id = self.schedule(delay, payload);
        *slot = Some(id);
        id
    }

    pub fn cancel_slot(&mut self, slot: &mut Option<TimerId>) {
        if let Some(id) = slot.take() {
            self.cancel(id);
        }
    }

    /// Moves the horizon forward. Timers up to the new horizon become due and
    /// are handed out by `pop_due`.
    pub fn advance(&mut self, dt: Duration) {
        self.horizon = self.horizon.max(self.now) + dt;
    }

    pub fn pop_due(&mut self) -> Option<(TimerId, T)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= self.horizon)
            .min_by_key(|(_, t)| (t.deadline, t.id))
            .map(|(index, _)| index);

        match index {
            Some(index) => {
                let timer = self.pending.remove(index);
                self.now = self.now.max(timer.deadline);
                Some((timer.id, timer.payload))
            }
            None => {
                self.now = self.horizon;
                None
            }
        }
    }

    /// Drops every pending timer. The clock keeps its value.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
