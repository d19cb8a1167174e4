use std::cell::Cell;
use std::rc::Rc;

use crate::timer::Timer;

#[derive(Debug, Default)]
struct GuardState {
    armed: Cell<bool>,
    /// Bumped on every arm so a stale release cannot clear a newer arming.
    epoch: Cell<u64>,
}

/// Re-entrancy flag for overview rebuilds.
///
/// Lifecycle: armed when a rebuild starts, released by a deferred timer a
/// short delay after the rebuild completes. While armed, new rebuild
/// requests are dropped.
#[derive(Debug, Clone, Default)]
pub struct RenderGuard {
    state: Rc<GuardState>,
}

impl RenderGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.state.armed.get()
    }

    /// Arms the guard. Returns `false` (and changes nothing) if already armed.
    pub fn try_arm(&self) -> bool {
        if self.state.armed.get() {
            return false;
        }
        self.state.armed.set(true);
        self.state.epoch.set(self.state.epoch.get().wrapping_add(1));
        true
    }

    pub fn release(&self) {
        self.state.armed.set(false);
    }

    /// Schedules a release of the current arming after `delay_ms`.
    ///
    /// If the timer refuses the callback the guard is released right away,
    /// so it can never stay armed forever.
    pub fn release_after(&self, timer: &dyn Timer, delay_ms: u64) -> bool {
        let state = Rc::clone(&self.state);
        let epoch = state.epoch.get();
        let scheduled = timer.defer(
            delay_ms,
            Box::new(move || {
                if state.epoch.get() == epoch {
                    state.armed.set(false);
                }
            }),
        );
        if !scheduled {
            self.release();
        }
        scheduled
    }
}
