// ============================================================================
// REACTIVITY - Change notification for shared state
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

type Callback<T> = Rc<dyn Fn(&T)>;

/// Listeners notified with a snapshot after every state change.
pub struct Subscribers<T> {
    callbacks: RefCell<Vec<Callback<T>>>,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            callbacks: RefCell::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&T) + 'static,
    {
        self.callbacks.borrow_mut().push(Rc::new(callback));
    }

    /// Callbacks may subscribe or read the owning state while being notified;
    /// the list is snapshotted first.
    pub fn notify(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = self.callbacks.borrow().clone();
        for callback in callbacks {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}
