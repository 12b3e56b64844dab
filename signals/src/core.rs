use crate::entry::{AsListenerId, ListenerEntry, ListenerId};
use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// The dispatcher shared by every signal arity.
///
/// Holds the registered listeners in insertion order plus an index from callback identity
/// to entry, and runs the priority-ordered emission over a single payload type `P`.
/// Cloning yields another handle onto the same registry.
pub struct SignalCore<P>(Rc<Inner<P>>);

struct Inner<P> {
    registry: RefCell<Registry<P>>,
    emission: Rc<EmissionState>,
}

struct Registry<P> {
    listeners: Vec<ListenerEntry<P>>,
    by_identity: HashMap<ListenerId, ListenerEntry<P>>,
}

#[derive(Default)]
struct EmissionState {
    // nesting depth of emit calls on this signal
    depth: Cell<usize>,
    interrupted: Cell<bool>,
}

impl EmissionState {
    fn interrupt(&self) {
        if self.depth.get() > 0 {
            self.interrupted.set(true);
        }
    }
}

/// A handle that can only interrupt the emission currently running on its signal.
///
/// Listeners typically capture one of these instead of the signal itself, which
/// would otherwise form an `Rc` cycle through the listener.
#[derive(Clone)]
pub struct Interrupter(Rc<EmissionState>);

impl Interrupter {
    /// See [`SignalCore::interrupt_current_emission`]
    pub fn interrupt(&self) { self.0.interrupt() }
}

/// A non-owning handle to a [`SignalCore`].
pub struct WeakSignalCore<P>(Weak<Inner<P>>);

impl<P> Clone for WeakSignalCore<P> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<P> WeakSignalCore<P> {
    pub fn upgrade(&self) -> Option<SignalCore<P>> { self.0.upgrade().map(SignalCore) }
}

impl<P> Clone for SignalCore<P> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<P> Default for SignalCore<P> {
    fn default() -> Self { Self::new() }
}

impl<P> std::fmt::Debug for SignalCore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalCore").field("listeners", &self.count()).field("emitting", &self.is_emitting()).finish()
    }
}

impl<P> SignalCore<P> {
    pub fn new() -> Self {
        Self(Rc::new(Inner {
            registry: RefCell::new(Registry { listeners: Vec::new(), by_identity: HashMap::new() }),
            emission: Rc::new(EmissionState::default()),
        }))
    }

    /// Registers a callback under `id`, wrapping it with `wrap` only if the id is new.
    ///
    /// Re-registering an id returns the existing entry untouched, so any priority or call
    /// limit configured on it earlier is preserved.
    pub fn add_with<F>(&self, id: ListenerId, wrap: impl FnOnce() -> F) -> ListenerEntry<P>
    where F: Fn(&P) + 'static {
        let mut registry = self.0.registry.borrow_mut();
        if let Some(existing) = registry.by_identity.get(&id) {
            return existing.clone();
        }
        trace!("SignalCore.add {}", id);
        let entry = ListenerEntry::new(id.clone(), wrap());
        registry.listeners.push(entry.clone());
        registry.by_identity.insert(id, entry.clone());
        entry
    }

    /// Registers a payload callback. The `Rc` is the callback's identity.
    pub fn add(&self, callback: Rc<dyn Fn(&P)>) -> ListenerEntry<P>
    where P: 'static {
        let id = ListenerId::of(&callback);
        self.add_with(id, move || move |payload: &P| callback(payload))
    }

    pub fn contains(&self, listener: impl AsListenerId) -> bool {
        self.0.registry.borrow().by_identity.contains_key(&listener.listener_id())
    }

    /// The live entry registered for `listener`, if any
    pub fn entry(&self, listener: impl AsListenerId) -> Option<ListenerEntry<P>> {
        self.0.registry.borrow().by_identity.get(&listener.listener_id()).cloned()
    }

    /// Removes the listener. Removing something that was never registered is a no-op.
    pub fn remove(&self, listener: impl AsListenerId) {
        let id = listener.listener_id();
        let mut registry = self.0.registry.borrow_mut();
        if let Some(entry) = registry.by_identity.remove(&id) {
            registry.listeners.retain(|e| *e != entry);
            trace!("SignalCore.remove {}", id);
        }
    }

    pub fn clear(&self) {
        let mut registry = self.0.registry.borrow_mut();
        registry.listeners.clear();
        registry.by_identity.clear();
    }

    /// Number of registered listeners, including expired ones the next sweep will drop.
    pub fn count(&self) -> usize { self.0.registry.borrow().listeners.len() }

    pub fn is_empty(&self) -> bool { self.count() == 0 }

    /// True while an `emit` on this signal is on the stack
    pub fn is_emitting(&self) -> bool { self.0.emission.depth.get() > 0 }

    /// Stops the current emission before the next listener runs.
    ///
    /// Meant to be called by a listener during its own invocation. Listeners that already
    /// ran are unaffected and nothing is deregistered. Outside an emission this does nothing.
    pub fn interrupt_current_emission(&self) { self.0.emission.interrupt() }

    /// Whether the running emission has been asked to stop
    pub fn interrupt_requested(&self) -> bool { self.0.emission.interrupted.get() }

    pub fn interrupter(&self) -> Interrupter { Interrupter(self.0.emission.clone()) }

    pub fn downgrade(&self) -> WeakSignalCore<P> { WeakSignalCore(Rc::downgrade(&self.0)) }

    /// Invokes every live listener with `payload`, highest priority first.
    ///
    /// The order is fixed from a snapshot taken on entry: listeners added, removed or
    /// cleared by a callback only affect later emissions. Expired entries are swept once
    /// the loop ends, including when a listener panics.
    pub fn emit(&self, payload: &P) {
        let guard = EmissionGuard::enter(self);

        let mut snapshot = self.0.registry.borrow().listeners.clone();
        // stable, so equal priorities keep insertion order
        snapshot.sort_by_key(|entry| Reverse(entry.priority()));

        for (index, entry) in snapshot.iter().enumerate() {
            if self.0.emission.interrupted.get() {
                debug!("SignalCore.emit interrupted, skipping {} listeners", snapshot.len() - index);
                break;
            }
            if entry.is_expired() {
                trace!("SignalCore.emit skipping expired {}", entry.id());
                continue;
            }
            trace!("SignalCore.emit -> {} (priority {})", entry.id(), entry.priority());
            entry.invoke(payload);
        }

        drop(guard);
    }

    fn sweep(&self) {
        // runs from Drop, possibly mid-unwind, so never panic on the borrow
        let Ok(mut registry) = self.0.registry.try_borrow_mut() else {
            debug!("SignalCore.sweep skipped, registry is borrowed");
            return;
        };
        let before = registry.listeners.len();
        registry.listeners.retain(|entry| !entry.is_expired());
        registry.by_identity.retain(|_, entry| !entry.is_expired());
        let swept = before - registry.listeners.len();
        trace!("SignalCore.sweep {} listeners, {} expired", before, swept);
        if swept > 0 {
            debug!("SignalCore.sweep removed {} expired listeners", swept);
        }
    }
}

/// Brackets one emission: bumps the depth and stashes the caller's interrupt flag on entry,
/// sweeps and restores on drop. Running in `Drop` keeps the registry consistent when a
/// listener panic unwinds through `emit`.
struct EmissionGuard<'a, P> {
    core: &'a SignalCore<P>,
    outer_interrupted: bool,
}

impl<'a, P> EmissionGuard<'a, P> {
    fn enter(core: &'a SignalCore<P>) -> Self {
        let emission = &core.0.emission;
        let outer_interrupted = emission.interrupted.replace(false);
        emission.depth.set(emission.depth.get() + 1);
        Self { core, outer_interrupted }
    }
}

impl<P> Drop for EmissionGuard<'_, P> {
    fn drop(&mut self) {
        self.core.sweep();
        let emission = &self.core.0.emission;
        emission.depth.set(emission.depth.get() - 1);
        emission.interrupted.set(self.outer_interrupted);
    }
}
