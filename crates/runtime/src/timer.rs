use std::cell::RefCell;
use std::rc::Rc;

use foundation::time::Time;

/// Fire-and-forget deferred callbacks on the current thread.
///
/// Implementations must never invoke `callback` synchronously from `defer`.
pub trait Timer {
    /// Returns `false` if the host refused the callback; it was dropped unrun.
    fn defer(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> bool;
}

impl<T: Timer + ?Sized> Timer for Rc<T> {
    fn defer(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> bool {
        (**self).defer(delay_ms, callback)
    }
}

struct Pending {
    due: Time,
    order: u64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Queue {
    now: Time,
    next_order: u64,
    pending: Vec<Pending>,
}

/// Deterministic timer driven by explicit clock advances.
///
/// Ordering contract: due callbacks fire by `(due, insertion_order)`, so two
/// callbacks scheduled for the same instant run in the order they were
/// deferred. Callbacks may defer further work; anything that falls due
/// inside the same `advance` window also fires.
#[derive(Clone, Default)]
pub struct ManualTimer {
    queue: Rc<RefCell<Queue>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Time {
        self.queue.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Advance the clock by `ms` and run everything that becomes due.
    ///
    /// Returns the number of callbacks fired.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now().after(ms);
        let mut fired = 0usize;
        while let Some(next) = self.pop_due(target) {
            self.queue.borrow_mut().now = next.due;
            (next.callback)();
            fired += 1;
        }
        self.queue.borrow_mut().now = target;
        fired
    }

    fn pop_due(&self, limit: Time) -> Option<Pending> {
        let mut q = self.queue.borrow_mut();
        let idx = q
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= limit)
            .min_by(|(_, a), (_, b)| a.due.cmp(&b.due).then_with(|| a.order.cmp(&b.order)))
            .map(|(i, _)| i)?;
        Some(q.pending.remove(idx))
    }
}

impl Timer for ManualTimer {
    fn defer(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> bool {
        let mut q = self.queue.borrow_mut();
        let due = q.now.after(delay_ms);
        let order = q.next_order;
        q.next_order = q.next_order.wrapping_add(1);
        q.pending.push(Pending {
            due,
            order,
            callback,
        });
        true
    }
}

impl std::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let q = self.queue.borrow();
        f.debug_struct("ManualTimer")
            .field("now", &q.now)
            .field("pending", &q.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ManualTimer, Timer};
    use foundation::time::Time;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |tag: &'static str| {
            let sink = Rc::clone(&sink);
            Box::new(move || sink.borrow_mut().push(tag)) as Box<dyn FnOnce()>
        };
        (log, make)
    }

    #[test]
    fn fires_only_when_due() {
        let timer = ManualTimer::new();
        let (log, make) = recorder();
        assert!(timer.defer(100, make("a")));

        assert_eq!(timer.advance(99), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(timer.advance(1), 1);
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(timer.now(), Time(100));
        assert_eq!(timer.pending(), 0);
    }

    #[test]
    fn same_instant_runs_in_insertion_order() {
        let timer = ManualTimer::new();
        let (log, make) = recorder();
        timer.defer(50, make("late"));
        timer.defer(10, make("b"));
        timer.defer(10, make("c"));

        assert_eq!(timer.advance(50), 3);
        assert_eq!(*log.borrow(), vec!["b", "c", "late"]);
    }

    #[test]
    fn callbacks_can_defer_follow_ups() {
        let timer = ManualTimer::new();
        let (log, make) = recorder();
        let chained = timer.clone();
        let follow_up = make("second");
        let first = make("first");
        timer.defer(
            10,
            Box::new(move || {
                first();
                chained.defer(10, follow_up);
            }),
        );

        assert_eq!(timer.advance(15), 1);
        assert_eq!(timer.pending(), 1);
        assert_eq!(timer.advance(5), 1);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }
}
