use std::cell::RefCell;
use std::rc::Rc;

/// A current value plus a subscriber list: set-and-notify-on-change.
///
/// This is the engine's replacement for reactive push-fields. Only the
/// "value changed → notify subscribers" contract is provided; there is no stream, no
/// completion, no threading. Subscribers are invoked synchronously, and a new subscriber
/// is immediately called with the current value.
///
/// Clones share the same underlying cell, so the engine and the adapter observe one
/// value. Do not subscribe from within a notification callback.
pub struct Signal<V> {
    inner: Rc<SignalInner<V>>,
}

struct SignalInner<V> {
    value: RefCell<V>,
    subscribers: RefCell<Vec<Box<dyn Fn(&V)>>>,
}

impl<V> Clone for Signal<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V: Clone + PartialEq> Signal<V> {
    pub fn new(initial: V) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(initial),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn get(&self) -> V {
        self.inner.value.borrow().clone()
    }

    /// Stores `value`; notifies subscribers only when it differs from the current one.
    pub fn set(&self, value: V) {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        let value = self.inner.value.borrow().clone();
        for subscriber in self.inner.subscribers.borrow().iter() {
            subscriber(&value);
        }
    }

    pub fn subscribe(&self, f: impl Fn(&V) + 'static) {
        f(&self.inner.value.borrow());
        self.inner.subscribers.borrow_mut().push(Box::new(f));
    }
}

impl<V: core::fmt::Debug> core::fmt::Debug for Signal<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}
