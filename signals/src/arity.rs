//! Typed front-ends over [`SignalCore`], one per argument count.
//!
//! Each adapter packs its arguments into a tuple payload and hands everything else to the
//! core, so ordering, call limits and interrupts behave identically for every arity.

use crate::{
    core::{Interrupter, SignalCore, WeakSignalCore},
    entry::{AsListenerId, ListenerEntry, ListenerId},
    listener::IntoListener,
};
use std::rc::Rc;

macro_rules! signal {
    ($(#[$meta:meta])* $signal:ident, $weak:ident, $callback:ident; $($arg:ident: $ty:ident),*) => {
        /// Shared callback form for
        #[doc = concat!("[`", stringify!($signal), "`]")]
        /// listeners. Hold on to one of these to add, query and remove the same listener.
        pub type $callback<$($ty),*> = Rc<dyn Fn($($ty),*)>;

        $(#[$meta])*
        pub struct $signal<$($ty),*> {
            core: SignalCore<($($ty,)*)>,
        }

        /// A non-owning handle to a
        #[doc = concat!("[`", stringify!($signal), "`].")]
        pub struct $weak<$($ty),*>(WeakSignalCore<($($ty,)*)>);

        impl<$($ty),*> Clone for $signal<$($ty),*> {
            fn clone(&self) -> Self { Self { core: self.core.clone() } }
        }

        impl<$($ty),*> Default for $signal<$($ty),*> {
            fn default() -> Self { Self::new() }
        }

        impl<$($ty),*> std::fmt::Debug for $signal<$($ty),*> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($signal)).field("listeners", &self.count()).finish()
            }
        }

        impl<$($ty),*> Clone for $weak<$($ty),*> {
            fn clone(&self) -> Self { Self(self.0.clone()) }
        }

        impl<$($ty),*> $weak<$($ty),*> {
            pub fn upgrade(&self) -> Option<$signal<$($ty),*>> { self.0.upgrade().map(|core| $signal { core }) }
        }

        impl<$($ty),*> $signal<$($ty),*> {
            pub fn new() -> Self { Self { core: SignalCore::new() } }

            /// Whether `listener` (a callback `Rc`, an entry or an id) is registered
            pub fn contains(&self, listener: impl AsListenerId) -> bool { self.core.contains(listener) }

            /// The entry registered for `listener`, if any
            pub fn entry(&self, listener: impl AsListenerId) -> Option<ListenerEntry<($($ty,)*)>> { self.core.entry(listener) }

            /// Removes `listener`; a no-op when it is not registered
            pub fn remove(&self, listener: impl AsListenerId) { self.core.remove(listener) }

            pub fn clear(&self) { self.core.clear() }

            pub fn count(&self) -> usize { self.core.count() }

            pub fn is_empty(&self) -> bool { self.core.is_empty() }

            pub fn is_emitting(&self) -> bool { self.core.is_emitting() }

            /// Stops the running emission before its next listener. See [`SignalCore::interrupt_current_emission`].
            pub fn interrupt_current_emission(&self) { self.core.interrupt_current_emission() }

            pub fn interrupt_requested(&self) -> bool { self.core.interrupt_requested() }

            pub fn interrupter(&self) -> Interrupter { self.core.interrupter() }

            pub fn downgrade(&self) -> $weak<$($ty),*> { $weak(self.core.downgrade()) }

            /// The untyped dispatcher behind this signal
            pub fn core(&self) -> &SignalCore<($($ty,)*)> { &self.core }
        }

        impl<$($ty: Clone + 'static),*> $signal<$($ty),*> {
            /// Registers `listener`, or returns its existing entry if it is already registered.
            ///
            /// The entry can be configured fluently, e.g. `signal.add(cb).with_priority(1).once()`.
            pub fn add(&self, listener: impl IntoListener<dyn Fn($($ty),*)>) -> ListenerEntry<($($ty,)*)> {
                let callback: $callback<$($ty),*> = listener.into_listener();
                self.core.add_with(ListenerId::of(&callback), move || move |($($arg,)*): &($($ty,)*)| callback($($arg.clone()),*))
            }

            /// Calls every registered listener, highest priority first
            pub fn emit(&self, $($arg: $ty),*) { self.core.emit(&($($arg,)*)) }
        }
    };
}

signal!(
    /// A signal whose listeners take no arguments.
    ///
    /// ```rust
    /// use prio_signals::Signal0;
    /// use std::{cell::Cell, rc::Rc};
    ///
    /// let fired = Rc::new(Cell::new(0));
    /// let signal = Signal0::new();
    /// signal.add({
    ///     let fired = fired.clone();
    ///     move || fired.set(fired.get() + 1)
    /// })
    /// .once();
    ///
    /// signal.emit();
    /// signal.emit();
    /// assert_eq!(fired.get(), 1);
    /// assert!(signal.is_empty());
    /// ```
    Signal0, WeakSignal0, Callback0;
);

signal!(
    /// A signal carrying one value.
    Signal1, WeakSignal1, Callback1; a: A
);

signal!(
    /// A signal carrying two values.
    Signal2, WeakSignal2, Callback2; a: A, b: B
);

signal!(
    /// A signal carrying three values.
    Signal3, WeakSignal3, Callback3; a: A, b: B, c: C
);

signal!(
    /// A signal carrying four values.
    Signal4, WeakSignal4, Callback4; a: A, b: B, c: C, d: D
);
