//! Scheduled-callback queue shared by every animation state machine.
//!
//! Each machine owns one `Scheduler` and drives it from its own `advance`.
//! Events fire in due-time order (ties broken by insertion order), and
//! `cancel_all` drops every pending event in one step, which is how a
//! re-trigger or an unmount discards the previous activation.

use std::time::Duration;

/// Identifies a scheduled event so it can be cancelled individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

struct Pending<T> {
    due: Duration,
    token: TimerToken,
    event: T,
}

pub struct Scheduler<T> {
    now: Duration,
    next_token: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_token: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler-local clock. Only moves forward.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, after: Duration, event: T) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.push(Pending {
            due: self.now + after,
            token,
            event,
        });
        token
    }

    pub fn cancel(&mut self, token: TimerToken) {
        self.pending.retain(|p| p.token != token);
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Absolute deadline `dt` from the current clock, for use with `pop_due`.
    pub fn deadline(&self, dt: Duration) -> Duration {
        self.now + dt
    }

    /// Removes and returns the earliest event due at or before `deadline`,
    /// moving the clock to its due time. Handlers may schedule more events
    /// between calls; those are picked up by the same drain loop.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<T> {
        let (pos, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= deadline)
            .min_by_key(|(_, p)| (p.due, p.token.0))?;
        let pending = self.pending.remove(pos);
        self.now = self.now.max(pending.due);
        Some(pending.event)
    }

    /// Moves the clock to `deadline` once every due event has been drained.
    pub fn finish(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// Convenience for machines that don't react between events.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        let deadline = self.deadline(dt);
        let mut fired = Vec::new();
        while let Some(event) = self.pop_due(deadline) {
            fired.push(event);
        }
        self.finish(deadline);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_in_due_order_with_insertion_tiebreak() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(30), "c");
        scheduler.schedule(ms(10), "a");
        scheduler.schedule(ms(10), "b");

        assert_eq!(scheduler.advance(ms(5)), Vec::<&str>::new());
        assert_eq!(scheduler.advance(ms(25)), vec!["a", "b", "c"]);
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.now(), ms(30));
    }

    #[test]
    fn cancel_removes_single_event() {
        let mut scheduler = Scheduler::new();
        let first = scheduler.schedule(ms(10), 1);
        scheduler.schedule(ms(20), 2);
        scheduler.cancel(first);

        assert_eq!(scheduler.advance(ms(50)), vec![2]);
    }

    #[test]
    fn cancel_all_discards_stale_activation() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(10), 1);
        scheduler.schedule(ms(20), 2);
        scheduler.cancel_all();

        assert!(scheduler.advance(ms(100)).is_empty());
    }

    #[test]
    fn events_scheduled_while_draining_fire_in_same_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(10), 0u32);
        let deadline = scheduler.deadline(ms(35));
        let mut seen = Vec::new();
        while let Some(n) = scheduler.pop_due(deadline) {
            seen.push((n, scheduler.now()));
            if n < 5 {
                scheduler.schedule(ms(10), n + 1);
            }
        }
        scheduler.finish(deadline);

        assert_eq!(seen, vec![(0, ms(10)), (1, ms(20)), (2, ms(30))]);
        assert_eq!(scheduler.pending_len(), 1);
        assert_eq!(scheduler.now(), ms(35));
    }
}
