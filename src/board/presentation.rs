//! Auto-cycle through every focusable item while nobody is driving.
//!
//! One self-rescheduling timer slot. The presenter only yields cycle indices;
//! the controller maps them onto `BoardLayout::cycle_order()` and moves focus.

use std::time::Duration;

use tokio::time::Instant;

use super::timer::TimerSlot;

#[derive(Debug, Clone)]
pub struct Presenter {
    dwell: Duration,
    timer: TimerSlot,
    /// `None` until the first advance
    index: Option<usize>,
}

impl Presenter {
    pub fn new(dwell: Duration) -> Self {
        Self {
            dwell,
            timer: TimerSlot::new(),
            index: None,
        }
    }

    /// Start or resume cycling and return the index to focus now.
    ///
    /// A fresh presenter advances straight to the first item. A resumed one
    /// re-shows its current item (clamped to `count`) for a full dwell, so the
    /// board never visibly rewinds.
    pub fn start(&mut self, count: usize, now: Instant) -> Option<usize> {
        self.stop();
        match self.index {
            None => self.advance(count, now),
            Some(_) => {
                self.timer.arm(now, self.dwell);
                self.current(count)
            }
        }
    }

    pub fn stop(&mut self) {
        self.timer.clear();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_armed()
    }

    /// Handle the tick if it is due. A paused tick is skipped and not rescheduled;
    /// the resume path restarts the loop.
    pub fn poll(&mut self, now: Instant, count: usize, paused: bool) -> Option<usize> {
        if !self.timer.fire_if_due(now) || paused {
            return None;
        }
        self.advance(count, now)
    }

    /// Move to the next item modulo `count` and reschedule. With nothing to
    /// show the index is left alone but the loop keeps ticking.
    pub fn advance(&mut self, count: usize, now: Instant) -> Option<usize> {
        self.timer.arm(now, self.dwell);
        if count == 0 {
            return None;
        }
        let next = self.index.map_or(0, |i| (i + 1) % count);
        self.index = Some(next);
        Some(next)
    }

    /// Current index re-clamped against `count`; out of range falls back to 0.
    pub fn current(&mut self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let index = self.index.filter(|i| *i < count).unwrap_or(0);
        self.index = Some(index);
        Some(index)
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DWELL: Duration = Duration::from_secs(10);

    #[test]
    fn fresh_start_shows_first_item() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(DWELL);
        assert_eq!(presenter.start(3, t0), Some(0));
        assert_eq!(presenter.next_deadline(), Some(t0 + DWELL));
    }

    #[test]
    fn advancing_n_times_returns_to_start() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(DWELL);
        let first = presenter.start(4, t0);
        let mut last = first;
        for _ in 0..4 {
            last = presenter.advance(4, t0);
        }
        assert_eq!(last, first);
    }

    #[test]
    fn shrinking_list_reclamps_index() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(DWELL);
        presenter.start(5, t0);
        for _ in 0..4 {
            presenter.advance(5, t0);
        }
        assert_eq!(presenter.index(), Some(4));
        // List shrank to two items between calls
        let next = presenter.advance(2, t0).unwrap();
        assert!(next < 2);
        assert_eq!(presenter.current(1), Some(0));
    }

    #[test]
    fn empty_list_keeps_ticking() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(DWELL);
        assert_eq!(presenter.start(0, t0), None);
        assert!(presenter.is_running());

        assert_eq!(presenter.poll(t0 + DWELL, 0, false), None);
        assert!(presenter.is_running());
        // Data arrived: next tick cycles
        assert_eq!(presenter.poll(t0 + DWELL * 2, 2, false), Some(0));
    }

    #[test]
    fn paused_tick_skips_without_reset() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(DWELL);
        presenter.start(3, t0);
        presenter.advance(3, t0);

        assert_eq!(presenter.poll(t0 + DWELL, 3, true), None);
        assert!(!presenter.is_running());
        assert_eq!(presenter.index(), Some(1));
    }

    #[test]
    fn resume_reshows_current_for_full_dwell() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(DWELL);
        presenter.start(3, t0);
        presenter.advance(3, t0);
        presenter.stop();

        let t1 = t0 + Duration::from_secs(30);
        assert_eq!(presenter.start(3, t1), Some(1));
        assert_eq!(presenter.next_deadline(), Some(t1 + DWELL));
        assert_eq!(presenter.poll(t1 + DWELL, 3, false), Some(2));
    }

    #[test]
    fn early_poll_does_nothing() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(DWELL);
        presenter.start(3, t0);
        assert_eq!(presenter.poll(t0 + Duration::from_secs(9), 3, false), None);
        assert_eq!(presenter.index(), Some(0));
    }
}
