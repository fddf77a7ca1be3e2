use std::{cell::RefCell, rc::Rc};

use log::warn;

/// Receives the single per-window change notification of a root replica
pub trait PropertyMutate: 'static {
    /// Called with the property that first changed in the current window.
    /// Returns whether the notification was taken.
    fn mutate(&mut self, property: &str) -> bool;
}

// PropertyMutator
#[derive(Clone)]
pub struct PropertyMutator {
    inner: Rc<RefCell<dyn PropertyMutate>>,
}

impl PropertyMutator {
    pub fn new<M: PropertyMutate>(mutator: M) -> Self {
        Self {
            inner: Rc::new(RefCell::new(mutator)),
        }
    }

    pub fn mutate(&self, property: &str) -> bool {
        let Ok(mut mutator) = self.inner.try_borrow_mut() else {
            warn!(
                "PropertyMutator re-entered while handling a notification, dropping notification for `{}`",
                property
            );
            return false;
        };
        mutator.mutate(property)
    }
}
