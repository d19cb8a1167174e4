use std::cell::RefCell;
use std::rc::Rc;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

struct Listeners<E> {
    next_id: u64,
    entries: Vec<(ListenerId, Listener<E>)>,
}

/// Synchronous, single-threaded publish/subscribe channel.
///
/// Cloning the bus yields another handle to the same listener list.
///
/// Delivery contract:
/// - `emit` calls every listener registered at the moment `emit` starts, in
///   registration order, before returning.
/// - Listeners may subscribe, unsubscribe or emit from inside a callback.
///   Changes made during a delivery take effect from the next `emit`.
pub struct EventBus<E> {
    inner: Rc<RefCell<Listeners<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("listeners", &inner.entries.len())
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id = inner.next_id.wrapping_add(1);
        inner.entries.push((id, Rc::new(listener)));
        id
    }

    /// Returns `true` if the listener was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|(lid, _)| *lid != id);
        inner.entries.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Delivers `event` and returns how many listeners received it.
    pub fn emit(&self, event: &E) -> usize {
        // Snapshot so no borrow is held while user callbacks run.
        let snapshot: Vec<Listener<E>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }
}
