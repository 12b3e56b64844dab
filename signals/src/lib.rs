/*!
Typed, prioritized, single-threaded signals

A signal holds an ordered set of listeners and calls them synchronously, on the caller's stack,
whenever it is emitted. One dispatcher ([`SignalCore`]) implements ordering, call limits,
interrupts and cleanup over a single payload type; [`Signal0`] through [`Signal4`] are thin
typed front-ends that pack their arguments into a tuple payload.

# Design:
- Listeners run highest priority first. Equal priorities run in registration order.
- Each emission iterates a snapshot taken when it starts. Listeners may add, remove, clear or
  re-emit on the same signal; those changes apply from the next emission on.
- An entry with a call limit expires when its budget hits zero and is dropped from the signal
  at the end of that emission. Until then it still shows up in `count()`.
- `interrupt_current_emission()` called from a listener skips the remaining lower-priority
  listeners of that one emission. Nothing is deregistered.
- Listener panics are not caught. The expiration sweep still runs while the panic unwinds.
- Not thread safe: signals are `Rc` handles and are neither `Send` nor `Sync`.

# Basic usage

```rust
use prio_signals::*;
use std::{cell::RefCell, rc::Rc};

let log = Rc::new(RefCell::new(Vec::new()));
let signal = Signal2::<u32, &'static str>::new();

let audit: Callback2<u32, &'static str> = {
    let log = log.clone();
    Rc::new(move |id: u32, name: &'static str| log.borrow_mut().push(format!("audit {id} {name}")))
};
signal.add(audit.clone()).with_priority(10);
signal.add({
    let log = log.clone();
    move |id: u32, _: &'static str| log.borrow_mut().push(format!("welcome {id}"))
})
.once();

signal.emit(1, "buffy");
signal.emit(2, "willow");
assert_eq!(*log.borrow(), ["audit 1 buffy", "welcome 1", "audit 2 willow"]);

// the same Rc names the same listener
assert!(signal.contains(&audit));
signal.remove(&audit);
assert!(signal.is_empty());
```

# Interrupting an emission

```rust
use prio_signals::*;
use std::{cell::Cell, rc::Rc};

let reached = Rc::new(Cell::new(false));
let signal = Signal1::<i32>::new();
let interrupter = signal.interrupter();

signal.add(move |value: i32| {
    if value < 0 {
        interrupter.interrupt();
    }
})
.with_priority(1);
signal.add({
    let reached = reached.clone();
    move |_: i32| reached.set(true)
});

signal.emit(-1);
assert!(!reached.get());
signal.emit(1);
assert!(reached.get());
```
*/

mod arity;
mod core;
mod entry;
mod listener;

pub use arity::*;
pub use self::core::*;
pub use entry::*;
pub use listener::*;
