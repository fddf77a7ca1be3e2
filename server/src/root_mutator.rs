use std::{cell::RefCell, collections::HashSet, hash::Hash, rc::Rc};

use log::{trace, warn};

use naia_replica_shared::PropertyMutate;

/// Records the key of a root whose graph changed during the current round
pub(crate) struct RootMutator<E: Copy + Eq + Hash> {
    key: E,
    changed: Rc<RefCell<HashSet<E>>>,
}

impl<E: Copy + Eq + Hash> RootMutator<E> {
    pub fn new(key: E, changed: &Rc<RefCell<HashSet<E>>>) -> Self {
        Self {
            key,
            changed: changed.clone(),
        }
    }
}

impl<E: Copy + Eq + Hash + 'static> PropertyMutate for RootMutator<E> {
    fn mutate(&mut self, property: &str) -> bool {
        let Ok(mut changed) = self.changed.try_borrow_mut() else {
            warn!("changed-root set is busy, `{}` change not recorded", property);
            return false;
        };
        trace!("root changed through `{}`", property);
        changed.insert(self.key);
        true
    }
}
