use std::cell::RefCell;
use std::rc::Rc;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() { tracing_subscriber::fmt().with_max_level(Level::TRACE).with_test_writer().init(); }

/// Returns a shared recorder that listeners can push into, and a check function that drains it.
#[allow(unused)]
pub fn watcher<T: 'static>() -> (Rc<dyn Fn(T)>, Box<dyn Fn() -> Vec<T>>) {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let record = {
        let changes = changes.clone();
        Rc::new(move |value: T| changes.borrow_mut().push(value)) as Rc<dyn Fn(T)>
    };

    let check = Box::new(move || changes.borrow_mut().drain(..).collect::<Vec<T>>());

    (record, check)
}
