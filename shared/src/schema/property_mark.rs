use std::{any::Any, fmt, sync::Arc};

use crate::{ChangeTracker, Data, Value};

/// Custom setter chained after the tracking side effect of an assignment
pub type SetterHook = Arc<dyn Fn(&ChangeTracker, &Data) + Send + Sync>;

/// Called with `(target, key, new value)` whenever a slot is marked dirty.
/// Returning `false` stops the change from being relayed to the parent.
pub type NotifyHook = Arc<dyn Fn(&ChangeTracker, &str, &Data) -> bool + Send + Sync>;

/// Handler invoked when an incoming diff carries a key naming it
pub type RemoteCall = Arc<dyn Fn(&ChangeTracker, &Value) + Send + Sync>;

// SyncCondition
/// Filter attached to a property that only the transport layer knows how to read
#[derive(Clone)]
pub struct SyncCondition {
    inner: Arc<dyn Any + Send + Sync>,
}

impl SyncCondition {
    pub fn new<C: Any + Send + Sync>(condition: C) -> Self {
        Self {
            inner: Arc::new(condition),
        }
    }

    pub fn downcast_ref<C: Any>(&self) -> Option<&C> {
        self.inner.as_ref().downcast_ref::<C>()
    }
}

impl fmt::Debug for SyncCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SyncCondition(..)")
    }
}

// PropertyMark
/// Static, per-type description of one tracked property
#[derive(Clone)]
pub struct PropertyMark {
    name: String,
    default: Value,
    setter: Option<SetterHook>,
    sync_condition: Option<SyncCondition>,
    notify_hook: Option<NotifyHook>,
}

impl PropertyMark {
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            setter: None,
            sync_condition: None,
            notify_hook: None,
        }
    }

    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&ChangeTracker, &Data) + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    pub fn with_sync_condition(mut self, condition: SyncCondition) -> Self {
        self.sync_condition = Some(condition);
        self
    }

    pub fn with_notify_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ChangeTracker, &str, &Data) -> bool + Send + Sync + 'static,
    {
        self.notify_hook = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn setter(&self) -> Option<&SetterHook> {
        self.setter.as_ref()
    }

    pub fn sync_condition(&self) -> Option<&SyncCondition> {
        self.sync_condition.as_ref()
    }

    pub fn notify_hook(&self) -> Option<&NotifyHook> {
        self.notify_hook.as_ref()
    }
}

impl fmt::Debug for PropertyMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMark")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("setter", &self.setter.is_some())
            .field("sync_condition", &self.sync_condition.is_some())
            .field("notify_hook", &self.notify_hook.is_some())
            .finish()
    }
}
