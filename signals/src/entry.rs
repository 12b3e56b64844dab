use std::any::Any;
use std::cell::Cell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Identity of a registered callback.
///
/// Derived from the data address of the callback's `Rc`, so two clones of the same
/// `Rc` share an id while two separately created closures never do. Every id holds a
/// weak reference to the callback, which keeps the address reserved until the last id
/// naming it is dropped. An id that outlives its listener therefore never matches a
/// callback registered later.
#[derive(Clone)]
pub struct ListenerId {
    addr: usize,
    _reserved: Rc<dyn Any>,
}

impl ListenerId {
    /// The identity of a shared callback
    pub fn of<F: ?Sized + 'static>(callback: &Rc<F>) -> Self {
        ListenerId { addr: Rc::as_ptr(callback).cast::<()>() as usize, _reserved: Rc::new(Rc::downgrade(callback)) }
    }
}

impl PartialEq for ListenerId {
    fn eq(&self, other: &Self) -> bool { self.addr == other.addr }
}

impl Eq for ListenerId {}

impl Hash for ListenerId {
    fn hash<H: Hasher>(&self, state: &mut H) { self.addr.hash(state) }
}

impl From<ListenerId> for usize {
    fn from(id: ListenerId) -> usize { id.addr }
}

impl std::fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "ListenerId({:#x})", self.addr) }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:#x}", self.addr) }
}

/// Anything that can name a registered callback: the callback itself, its entry, or its id.
pub trait AsListenerId {
    fn listener_id(&self) -> ListenerId;
}

impl AsListenerId for ListenerId {
    fn listener_id(&self) -> ListenerId { self.clone() }
}

impl<F: ?Sized + 'static> AsListenerId for Rc<F> {
    fn listener_id(&self) -> ListenerId { ListenerId::of(self) }
}

impl<P> AsListenerId for ListenerEntry<P> {
    fn listener_id(&self) -> ListenerId { self.id() }
}

impl<T: AsListenerId + ?Sized> AsListenerId for &T {
    fn listener_id(&self) -> ListenerId { (**self).listener_id() }
}

/// A registered callback plus its dispatch metadata.
///
/// This is a shared handle: the copy returned by `add` and the copy held by the signal
/// are the same entry, so the fluent modifiers below reconfigure the registration in place.
///
/// ```rust
/// use prio_signals::Signal0;
///
/// let signal = Signal0::new();
/// let entry = signal.add(|| println!("ready")).with_priority(10).call_limit(2);
/// assert_eq!(entry.priority(), 10);
/// assert_eq!(entry.remaining_invocations(), Some(2));
/// ```
pub struct ListenerEntry<P>(Rc<Inner<P>>);

struct Inner<P> {
    id: ListenerId,
    invoke: Box<dyn Fn(&P)>,
    priority: Cell<i32>,
    // None = unlimited
    remaining: Cell<Option<u32>>,
}

impl<P> Clone for ListenerEntry<P> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<P> PartialEq for ListenerEntry<P> {
    fn eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<P> Eq for ListenerEntry<P> {}

impl<P> std::fmt::Debug for ListenerEntry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("id", &self.0.id)
            .field("priority", &self.0.priority.get())
            .field("remaining", &self.0.remaining.get())
            .finish()
    }
}

impl<P> ListenerEntry<P> {
    /// Creates an entry with priority 0 and an unlimited budget.
    /// `invoke` is the type-erased call; `id` names the original callback.
    pub fn new(id: ListenerId, invoke: impl Fn(&P) + 'static) -> Self {
        Self(Rc::new(Inner { id, invoke: Box::new(invoke), priority: Cell::new(0), remaining: Cell::new(None) }))
    }

    pub fn id(&self) -> ListenerId { self.0.id.clone() }

    pub fn priority(&self) -> i32 { self.0.priority.get() }

    /// `None` means unlimited
    pub fn remaining_invocations(&self) -> Option<u32> { self.0.remaining.get() }

    /// An expired entry has exhausted its budget. It is never invoked again and is
    /// dropped from its signal at the end of the next emission.
    pub fn is_expired(&self) -> bool { self.0.remaining.get() == Some(0) }

    /// Calls the wrapped callback with `payload` and spends one unit of budget.
    /// Does nothing once the entry is expired.
    pub fn invoke(&self, payload: &P) {
        if self.is_expired() {
            return;
        }
        (self.0.invoke)(payload);
        // the callback may have changed the budget itself, so read it after the call
        if let Some(n) = self.0.remaining.get() {
            self.0.remaining.set(Some(n.saturating_sub(1)));
        }
    }

    /// Higher priorities run earlier. Equal priorities run in registration order.
    pub fn with_priority(self, priority: i32) -> Self {
        self.0.priority.set(priority);
        self
    }

    /// Limits the entry to `limit` more invocations; `None` lifts the limit.
    pub fn call_limit(self, limit: impl Into<Option<u32>>) -> Self {
        self.0.remaining.set(limit.into());
        self
    }

    pub fn once(self) -> Self { self.call_limit(1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn counting_entry() -> (ListenerEntry<i32>, Rc<RefCell<Vec<i32>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let callback: Rc<dyn Fn(i32)> = {
            let seen = seen.clone();
            Rc::new(move |value: i32| seen.borrow_mut().push(value))
        };
        let id = ListenerId::of(&callback);
        (ListenerEntry::new(id, move |value: &i32| callback(*value)), seen)
    }

    #[test]
    fn test_defaults() {
        let (entry, _) = counting_entry();
        assert_eq!(entry.priority(), 0);
        assert_eq!(entry.remaining_invocations(), None);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_invoke_decrements_budget() {
        let (entry, seen) = counting_entry();
        let entry = entry.call_limit(2);

        entry.invoke(&1);
        assert_eq!(entry.remaining_invocations(), Some(1));
        assert!(!entry.is_expired());

        entry.invoke(&2);
        assert!(entry.is_expired());

        // expired entries are a silent no-op
        entry.invoke(&3);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(entry.remaining_invocations(), Some(0));
    }

    #[test]
    fn test_unlimited_never_expires() {
        let (entry, seen) = counting_entry();
        for i in 0..100 {
            entry.invoke(&i);
        }
        assert_eq!(seen.borrow().len(), 100);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_fluent_modifiers_share_state() {
        let (entry, _) = counting_entry();
        let handle = entry.clone().with_priority(7).once();
        assert_eq!(entry.priority(), 7);
        assert_eq!(entry.remaining_invocations(), Some(1));
        assert_eq!(handle, entry);

        // lifting the limit again
        let entry = entry.call_limit(None);
        assert_eq!(handle.remaining_invocations(), None);
        assert_eq!(entry.priority(), 7);
    }

    #[test]
    fn test_zero_limit_is_expired_immediately() {
        let (entry, seen) = counting_entry();
        let entry = entry.call_limit(0);
        assert!(entry.is_expired());
        entry.invoke(&1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_identity_follows_rc() {
        let a: Rc<dyn Fn()> = Rc::new(|| {});
        let b: Rc<dyn Fn()> = Rc::new(|| {});
        assert_eq!(ListenerId::of(&a), ListenerId::of(&a.clone()));
        assert_ne!(ListenerId::of(&a), ListenerId::of(&b));
        assert_eq!(a.listener_id(), (&a).listener_id());
    }

    #[test]
    fn test_id_reserves_address_after_callback_is_dropped() {
        let old: Rc<dyn Fn()> = Rc::new(|| {});
        let id = ListenerId::of(&old);
        drop(old);

        // the allocation stays reserved, so fresh callbacks never land on the same address
        let fresh: Vec<Rc<dyn Fn()>> = (0..64).map(|_| Rc::new(|| {}) as Rc<dyn Fn()>).collect();
        assert!(fresh.iter().all(|callback| ListenerId::of(callback) != id));
    }
}
