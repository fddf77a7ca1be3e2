use std::{any::Any, fmt, ops::Deref, rc::Rc};

use crate::{types::Version, ApplyReport, ChangeTracker, Diff, EntityRef, Value};

use super::change_tracker::ParentLink;

/// Contract shared by every replicable composite: change trackers and the
/// container replicators that wrap lists or maps of replicas.
pub trait Replicator: Any {
    /// Changes for an observer that has seen `from` and is being brought up to `to`
    fn gen_diff(&self, from: Version, to: Version) -> Diff;
    /// Merges an incoming payload into the live object
    fn apply_diff(&self, payload: &Value) -> ApplyReport;
    /// Highest version any slot was stamped with
    fn version(&self) -> Version;
    /// Plain snapshot of the live object
    fn target(&self) -> Value;
    /// Replaces the live object's contents from a snapshot
    fn set_target(&self, target: &Value);
    fn replica_id(&self) -> ReplicaId;
    fn parent_link(&self) -> Option<ParentLink>;
    /// Installs a new parent link, returning the previous one
    fn set_parent_link(&self, link: Option<ParentLink>) -> Option<ParentLink>;
    fn as_any(&self) -> &dyn Any;
}

// ReplicaId
/// Identity of a live replica, stable for as long as it is alive
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ReplicaId(usize);

impl ReplicaId {
    /// Identity taken from the address of the replica's shared state
    pub fn of<T: ?Sized>(pointer: *const T) -> Self {
        Self(pointer as *const () as usize)
    }
}

// ReplicaRef
/// Shared handle to a replicable composite held in a parent slot
#[derive(Clone)]
pub struct ReplicaRef {
    inner: Rc<dyn Replicator>,
}

impl ReplicaRef {
    pub fn new<R: Replicator>(replica: R) -> Self {
        Self {
            inner: Rc::new(replica),
        }
    }

    pub fn id(&self) -> ReplicaId {
        self.inner.replica_id()
    }

    pub fn as_tracker(&self) -> Option<&ChangeTracker> {
        self.inner.as_any().downcast_ref::<ChangeTracker>()
    }

    pub fn downcast_ref<R: Replicator>(&self) -> Option<&R> {
        self.inner.as_any().downcast_ref::<R>()
    }
}

impl Deref for ReplicaRef {
    type Target = dyn Replicator;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl fmt::Debug for ReplicaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReplicaRef").field(&self.id()).finish()
    }
}

impl From<ChangeTracker> for ReplicaRef {
    fn from(tracker: ChangeTracker) -> Self {
        ReplicaRef::new(tracker)
    }
}

// Data
/// Contents of a tracked slot: either plain data, or a nested replica whose
/// changes bubble up into the slot.
#[derive(Clone, Debug)]
pub enum Data {
    Plain(Value),
    Child(ReplicaRef),
}

impl Data {
    pub fn is_null(&self) -> bool {
        matches!(self, Data::Plain(Value::Null))
    }

    pub fn is_child(&self) -> bool {
        matches!(self, Data::Child(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Data::Plain(value) => Some(value),
            Data::Child(_) => None,
        }
    }

    pub fn as_child(&self) -> Option<&ReplicaRef> {
        match self {
            Data::Plain(_) => None,
            Data::Child(child) => Some(child),
        }
    }

    pub fn child_id(&self) -> Option<ReplicaId> {
        self.as_child().map(ReplicaRef::id)
    }

    /// Plain values compare by value, children by identity
    pub fn same_as(&self, other: &Data) -> bool {
        match (self, other) {
            (Data::Plain(a), Data::Plain(b)) => a == b,
            (Data::Child(a), Data::Child(b)) => a.id() == b.id(),
            _ => false,
        }
    }

    /// Plain view of the slot, with children flattened to their targets
    pub fn snapshot(&self) -> Value {
        match self {
            Data::Plain(value) => value.clone(),
            Data::Child(child) => child.target(),
        }
    }
}

impl Default for Data {
    fn default() -> Self {
        Data::Plain(Value::Null)
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Data::Plain(value)
    }
}

impl From<ReplicaRef> for Data {
    fn from(child: ReplicaRef) -> Self {
        Data::Child(child)
    }
}

impl From<ChangeTracker> for Data {
    fn from(tracker: ChangeTracker) -> Self {
        Data::Child(ReplicaRef::new(tracker))
    }
}

impl From<&ChangeTracker> for Data {
    fn from(tracker: &ChangeTracker) -> Self {
        Data::Child(ReplicaRef::new(tracker.clone()))
    }
}

macro_rules! plain_data_from {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Data {
                fn from(value: $source) -> Self {
                    Data::Plain(Value::from(value))
                }
            }
        )*
    };
}

plain_data_from!(bool, i32, i64, u32, f32, f64, &str, String, EntityRef);
