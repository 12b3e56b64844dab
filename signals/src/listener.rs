use std::rc::Rc;

/// Conversion into the shared callback form a signal stores.
///
/// `F` is the unsized callback signature, e.g. `dyn Fn(i32, String)`. An `Rc<F>` converts
/// as-is and keeps its identity, so passing clones of the same `Rc` to `add`, `contains`
/// and `remove` always refers to one registration. Any other closure is moved into a fresh
/// `Rc` and therefore registers as a new listener every time.
pub trait IntoListener<F: ?Sized> {
    fn into_listener(self) -> Rc<F>;
}

impl<F: ?Sized> IntoListener<F> for Rc<F> {
    fn into_listener(self) -> Rc<F> { self }
}

impl<L> IntoListener<dyn Fn()> for L
where L: Fn() + 'static
{
    fn into_listener(self) -> Rc<dyn Fn()> { Rc::new(self) }
}

macro_rules! into_listener_for_closures {
    ($($ty:ident),+) => {
        impl<L, $($ty),+> IntoListener<dyn Fn($($ty),+)> for L
        where L: Fn($($ty),+) + 'static
        {
            fn into_listener(self) -> Rc<dyn Fn($($ty),+)> { Rc::new(self) }
        }
    };
}

into_listener_for_closures!(A);
into_listener_for_closures!(A, B);
into_listener_for_closures!(A, B, C);
into_listener_for_closures!(A, B, C, D);

// Channel senders forward every emitted value; a disconnected receiver is ignored.

impl<T: 'static> IntoListener<dyn Fn(T)> for std::sync::mpsc::Sender<T> {
    fn into_listener(self) -> Rc<dyn Fn(T)> {
        Rc::new(move |value: T| {
            let _ = self.send(value);
        })
    }
}

#[cfg(feature = "tokio")]
impl<T: 'static> IntoListener<dyn Fn(T)> for tokio::sync::mpsc::UnboundedSender<T> {
    fn into_listener(self) -> Rc<dyn Fn(T)> {
        Rc::new(move |value: T| {
            let _ = self.send(value);
        })
    }
}
