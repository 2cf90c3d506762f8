// SPDX-License-Identifier: MIT
//
// The animation timer.
//
// Views that animate call `register_tick` while rendering. Once a frame is
// drawn the manager looks at this frame's registrations and starts or stops
// a fixed-interval timer accordingly. No interest, no timer: an idle screen
// blocks on input with no timeout.
//
// A tick goes to the views registered in the frame before it. Staying
// subscribed takes both a `true` from `receive_tick` and a fresh
// registration in the frame the tick causes; a view that declined has its
// registration in that frame ignored.
//
// The manager owns no thread and no clock. The event loop asks for the
// deadline, waits until it, and calls back with the current instant.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::tree::ViewId;

/// Default tick period, roughly 60 frames per second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    next: Instant,
    last: Instant,
}

#[derive(Debug)]
pub struct TickManager {
    interval: Duration,
    registered: Vec<ViewId>,
    /// Views whose last `receive_tick` returned false. Cleared by
    /// `end_render`.
    declined: Vec<ViewId>,
    timer: Option<Timer>,
}

impl TickManager {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            registered: Vec::new(),
            declined: Vec::new(),
            timer: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Forget this frame's registrations.
    pub fn reset(&mut self) {
        self.registered.clear();
    }

    /// Ignored for a view that declined the tick that started this frame.
    pub fn register(&mut self, view: ViewId) {
        if !self.registered.contains(&view) && !self.declined.contains(&view) {
            self.registered.push(view);
        }
    }

    /// Views registered so far this frame.
    #[inline]
    #[must_use]
    pub fn registered(&self) -> &[ViewId] {
        &self.registered
    }

    /// Start or stop the timer to match this frame's registrations.
    pub fn end_render(&mut self, now: Instant) {
        self.declined.clear();
        match (!self.registered.is_empty(), self.timer.is_some()) {
            (true, false) => {
                debug!(interval = ?self.interval, "tick timer started");
                self.timer = Some(Timer {
                    next: now + self.interval,
                    last: now,
                });
            }
            (false, true) => self.stop(),
            _ => {}
        }
    }

    /// When the next tick is due, if the timer runs.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.map(|timer| timer.next)
    }

    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.timer.is_some_and(|timer| now >= timer.next)
    }

    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Claim a due tick: the time since the previous one and the views
    /// registered in the last frame. `None` when the timer isn't due.
    pub fn begin_fire(&mut self, now: Instant) -> Option<(Duration, Vec<ViewId>)> {
        if !self.is_due(now) {
            return None;
        }
        let timer = self.timer.as_mut()?;
        let dt = now.saturating_duration_since(timer.last);
        timer.last = now;
        timer.next = now + self.interval;

        Some((dt, self.registered.clone()))
    }

    /// Record the views whose `receive_tick` returned false. Their
    /// registrations in the coming frame don't count.
    pub fn finish_fire(&mut self, declined: Vec<ViewId>) {
        self.declined = declined;
    }

    /// Cancel the timer.
    pub fn stop(&mut self) {
        if self.timer.take().is_some() {
            debug!("tick timer stopped");
        }
        self.declined.clear();
    }
}

impl Default for TickManager {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<ViewId> {
        let mut map = SlotMap::<ViewId, ()>::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn no_interest_no_timer() {
        let mut tick = TickManager::default();
        tick.end_render(Instant::now());
        assert!(!tick.is_running());
        assert_eq!(tick.deadline(), None);
    }

    #[test]
    fn registration_starts_timer() {
        let v = ids(1);
        let mut tick = TickManager::default();
        let t0 = Instant::now();
        tick.register(v[0]);
        tick.end_render(t0);
        assert_eq!(tick.deadline(), Some(t0 + DEFAULT_TICK_INTERVAL));
        assert!(!tick.is_due(t0));
        assert!(tick.is_due(t0 + 16 * MS));
    }

    #[test]
    fn fire_delivers_elapsed_time() {
        let v = ids(1);
        let mut tick = TickManager::new(10 * MS);
        let t0 = Instant::now();
        tick.register(v[0]);
        tick.end_render(t0);

        assert_eq!(tick.begin_fire(t0 + 5 * MS), None);
        let (dt, targets) = tick.begin_fire(t0 + 12 * MS).unwrap();
        assert_eq!(dt, 12 * MS);
        assert_eq!(targets, v);
        assert_eq!(tick.deadline(), Some(t0 + 22 * MS));
    }

    #[test]
    fn ticks_need_registration_every_frame() {
        let v = ids(1);
        let mut tick = TickManager::new(10 * MS);
        let t0 = Instant::now();
        tick.register(v[0]);
        tick.end_render(t0);

        let (_, targets) = tick.begin_fire(t0 + 10 * MS).unwrap();
        assert_eq!(targets, v);
        tick.finish_fire(Vec::new());
        tick.reset();
        tick.end_render(t0 + 10 * MS);
        assert!(!tick.is_running());
        assert_eq!(tick.begin_fire(t0 + 20 * MS), None);
    }

    #[test]
    fn declining_ignores_the_next_registration() {
        let v = ids(2);
        let mut tick = TickManager::new(10 * MS);
        let t0 = Instant::now();
        tick.register(v[0]);
        tick.register(v[1]);
        tick.end_render(t0);

        let (_, targets) = tick.begin_fire(t0 + 10 * MS).unwrap();
        assert_eq!(targets, v);
        tick.finish_fire(vec![v[1]]);
        tick.reset();
        tick.register(v[0]);
        tick.register(v[1]);
        assert_eq!(tick.registered(), [v[0]]);
        tick.end_render(t0 + 10 * MS);

        let (_, targets) = tick.begin_fire(t0 + 20 * MS).unwrap();
        assert_eq!(targets, [v[0]]);
    }

    #[test]
    fn declining_lasts_one_frame() {
        let v = ids(1);
        let mut tick = TickManager::new(10 * MS);
        let t0 = Instant::now();
        tick.register(v[0]);
        tick.end_render(t0);
        tick.begin_fire(t0 + 10 * MS).unwrap();
        tick.finish_fire(vec![v[0]]);

        tick.reset();
        tick.register(v[0]);
        tick.end_render(t0 + 10 * MS);
        assert!(!tick.is_running());

        tick.reset();
        tick.register(v[0]);
        tick.end_render(t0 + 30 * MS);
        assert_eq!(tick.deadline(), Some(t0 + 40 * MS));
    }

    #[test]
    fn stop_is_unconditional() {
        let v = ids(1);
        let mut tick = TickManager::default();
        tick.register(v[0]);
        tick.end_render(Instant::now());
        tick.stop();
        assert!(!tick.is_running());
        assert_eq!(tick.begin_fire(Instant::now() + Duration::from_secs(1)), None);
    }
}
