use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::guard::RenderGuard;
use crate::metrics::Metrics;
use crate::timer::Timer;

/// Default cooldown between a rebuild finishing and the next one being allowed.
pub const DEFAULT_RELEASE_DELAY_MS: u64 = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    /// A rebuild ran and its cooldown window has not elapsed yet.
    Rendering,
    Stopped,
}

/// What a single change notification turned into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Notification {
    Rendered,
    /// Dropped because a rebuild is running or cooling down.
    Coalesced,
    /// Dropped because the detector was stopped.
    Ignored,
}

/// Turns bursts of content-change notifications into at most one rebuild per
/// cooldown window.
///
/// Transitions:
/// - `Idle` + notification: arm guard, rebuild, schedule release -> `Rendering`
/// - `Rendering` + notification: dropped
/// - `Rendering` + release timer: -> `Idle`
/// - any + `stop()`: -> `Stopped` (terminal)
///
/// The detector does not know what a rebuild does; callers pass it as a
/// closure to [`ChangeDetector::notify`].
pub struct ChangeDetector {
    guard: RenderGuard,
    timer: Rc<dyn Timer>,
    release_delay_ms: u64,
    stopped: Cell<bool>,
    metrics: RefCell<Metrics>,
}

impl ChangeDetector {
    pub fn new(timer: Rc<dyn Timer>) -> Self {
        Self::with_release_delay(timer, DEFAULT_RELEASE_DELAY_MS)
    }

    pub fn with_release_delay(timer: Rc<dyn Timer>, release_delay_ms: u64) -> Self {
        Self {
            guard: RenderGuard::new(),
            timer,
            release_delay_ms,
            stopped: Cell::new(false),
            metrics: RefCell::new(Metrics::new()),
        }
    }

    pub fn state(&self) -> DetectorState {
        if self.stopped.get() {
            DetectorState::Stopped
        } else if self.guard.is_armed() {
            DetectorState::Rendering
        } else {
            DetectorState::Idle
        }
    }

    /// Handles one change notification, running `render` if the guard allows.
    ///
    /// Notifications raised from inside `render` are coalesced.
    pub fn notify(&self, render: impl FnOnce()) -> Notification {
        self.metrics
            .borrow_mut()
            .inc_counter("detector.notifications", 1);

        if self.stopped.get() {
            self.metrics.borrow_mut().inc_counter("detector.ignored", 1);
            return Notification::Ignored;
        }
        if !self.guard.try_arm() {
            trace!("change notification coalesced");
            self.metrics.borrow_mut().inc_counter("detector.coalesced", 1);
            return Notification::Coalesced;
        }

        debug!(release_delay_ms = self.release_delay_ms, "rebuilding overview");
        let _release = ScheduledRelease(self);
        render();
        self.metrics.borrow_mut().inc_counter("detector.renders", 1);
        Notification::Rendered
    }

    fn schedule_release(&self) {
        if !self.guard.release_after(self.timer.as_ref(), self.release_delay_ms) {
            warn!("release timer refused; guard released immediately");
        }
    }

    /// Permanently stops reacting to notifications and releases the guard.
    pub fn stop(&self) {
        if !self.stopped.replace(true) {
            debug!("change detector stopped");
        }
        self.guard.release();
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.borrow().clone()
    }
}

/// Schedules the guard release when dropped, including while unwinding out
/// of a panicking rebuild.
struct ScheduledRelease<'a>(&'a ChangeDetector);

impl Drop for ScheduledRelease<'_> {
    fn drop(&mut self) {
        self.0.schedule_release();
    }
}

impl std::fmt::Debug for ChangeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeDetector")
            .field("state", &self.state())
            .field("release_delay_ms", &self.release_delay_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeDetector, DetectorState, Notification};
    use crate::timer::{ManualTimer, Timer};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    struct RefusingTimer;

    impl Timer for RefusingTimer {
        fn defer(&self, _delay_ms: u64, _callback: Box<dyn FnOnce()>) -> bool {
            false
        }
    }

    fn detector(timer: &ManualTimer) -> ChangeDetector {
        ChangeDetector::new(Rc::new(timer.clone()))
    }

    #[test]
    fn burst_inside_one_window_renders_once() {
        let timer = ManualTimer::new();
        let det = detector(&timer);
        let renders = Cell::new(0);

        assert_eq!(det.notify(|| renders.set(renders.get() + 1)), Notification::Rendered);
        for _ in 0..25 {
            assert_eq!(
                det.notify(|| renders.set(renders.get() + 1)),
                Notification::Coalesced
            );
        }
        assert_eq!(renders.get(), 1);
        assert_eq!(det.state(), DetectorState::Rendering);
        assert_eq!(det.metrics().counter("detector.coalesced"), 25);
    }

    #[test]
    fn release_reopens_for_exactly_one_render() {
        let timer = ManualTimer::new();
        let det = detector(&timer);
        let renders = Cell::new(0);
        let bump = || renders.set(renders.get() + 1);

        det.notify(bump);
        timer.advance(99);
        assert_eq!(det.notify(bump), Notification::Coalesced);
        timer.advance(1);
        assert_eq!(det.state(), DetectorState::Idle);

        assert_eq!(det.notify(bump), Notification::Rendered);
        assert_eq!(det.notify(bump), Notification::Coalesced);
        assert_eq!(renders.get(), 2);
    }

    #[test]
    fn nested_notification_from_render_is_coalesced() {
        let timer = ManualTimer::new();
        let det = Rc::new(detector(&timer));
        let inner = Rc::clone(&det);
        let nested = Cell::new(None);

        det.notify(|| nested.set(Some(inner.notify(|| panic!("re-entered render")))));
        assert_eq!(nested.get(), Some(Notification::Coalesced));
    }

    #[test]
    fn guard_is_released_even_when_render_does_nothing() {
        let timer = ManualTimer::new();
        let det = detector(&timer);
        det.notify(|| {});
        assert_eq!(timer.pending(), 1);
        timer.advance(100);
        assert_eq!(det.state(), DetectorState::Idle);
    }

    #[test]
    fn panicking_render_still_schedules_release() {
        let timer = ManualTimer::new();
        let det = detector(&timer);
        let unwound = catch_unwind(AssertUnwindSafe(|| det.notify(|| panic!("render failed"))));
        assert!(unwound.is_err());
        assert_eq!(det.state(), DetectorState::Rendering);
        assert_eq!(timer.pending(), 1);

        timer.advance(100);
        assert_eq!(det.state(), DetectorState::Idle);
        assert_eq!(det.notify(|| {}), Notification::Rendered);
    }

    #[test]
    fn refused_release_timer_does_not_wedge_the_detector() {
        let det = ChangeDetector::new(Rc::new(RefusingTimer));
        assert_eq!(det.notify(|| {}), Notification::Rendered);
        assert_eq!(det.state(), DetectorState::Idle);
        assert_eq!(det.notify(|| {}), Notification::Rendered);
    }

    #[test]
    fn stopped_detector_ignores_everything() {
        let timer = ManualTimer::new();
        let det = detector(&timer);
        det.notify(|| {});
        det.stop();
        assert_eq!(det.state(), DetectorState::Stopped);
        assert_eq!(det.notify(|| panic!("render after stop")), Notification::Ignored);
        timer.advance(1_000);
        assert_eq!(det.state(), DetectorState::Stopped);
        assert_eq!(det.metrics().counter("detector.ignored"), 1);
    }

    proptest! {
        #[test]
        fn renders_at_most_once_per_window(gaps in proptest::collection::vec(0u64..250, 1..60)) {
            let timer = ManualTimer::new();
            let det = detector(&timer);
            let renders = Cell::new(0u32);
            let mut last_render_at: Option<u64> = None;

            for gap in gaps {
                timer.advance(gap);
                let now = timer.now().ms();
                let outcome = det.notify(|| renders.set(renders.get() + 1));
                let window_open = last_render_at.is_none_or(|t| now >= t + 100);
                if window_open {
                    prop_assert_eq!(outcome, Notification::Rendered);
                    last_render_at = Some(now);
                } else {
                    prop_assert_eq!(outcome, Notification::Coalesced);
                }
            }
            prop_assert_eq!(u64::from(renders.get()), det.metrics().counter("detector.renders"));
        }
    }
}
