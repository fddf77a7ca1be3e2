use std::{
    any::Any,
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    rc::{Rc, Weak},
    sync::Arc,
};

use log::{debug, trace, warn};

use crate::{
    schema::class_schema::ClassSchema,
    types::{Version, BASELINE_VERSION},
    ApplyReport, Diff, Value,
};

use super::{
    error::TrackerError,
    property_mutate::PropertyMutator,
    replicator::{Data, ReplicaId, ReplicaRef, Replicator},
    tracked_slot::TrackedSlot,
};

pub(crate) struct TrackerInner {
    pub schema: Arc<ClassSchema>,
    pub slots: BTreeMap<String, TrackedSlot>,
    pub last_diff_version: Version,
    pub version: Version,
    pub dirty: bool,
    pub pending_notify: bool,
    pub parent: Option<ParentLink>,
    pub mutator: Option<PropertyMutator>,
}

// ChangeTracker
/// Per-instance change state of one replicated object.
///
/// Cloning yields another handle to the same tracker.
#[derive(Clone)]
pub struct ChangeTracker {
    pub(crate) inner: Rc<RefCell<TrackerInner>>,
}

impl ChangeTracker {
    /// Creates a clean tracker with every tracked slot holding its default
    pub fn new(schema: Arc<ClassSchema>) -> Self {
        let slots = schema
            .entries()
            .map(|mark| {
                (
                    mark.name().to_string(),
                    TrackedSlot::seeded(Data::Plain(mark.default_value().clone())),
                )
            })
            .collect();

        Self {
            inner: Rc::new(RefCell::new(TrackerInner {
                schema,
                slots,
                last_diff_version: BASELINE_VERSION,
                version: BASELINE_VERSION,
                dirty: false,
                pending_notify: false,
                parent: None,
                mutator: None,
            })),
        }
    }

    /// Creates a tracker, then assigns the instance's current values through
    /// the tracked path. Values equal to their default leave the slot clean,
    /// and nested replicas get linked.
    pub fn with_values<I, S>(schema: Arc<ClassSchema>, values: I) -> Self
    where
        I: IntoIterator<Item = (S, Data)>,
        S: AsRef<str>,
    {
        let tracker = Self::new(schema);
        for (name, data) in values {
            let name = name.as_ref();
            if !tracker.schema().tracks(name) {
                trace!(
                    "Schema {} does not track `{}`, leaving it out of the tracker",
                    tracker.schema().name(),
                    name
                );
                continue;
            }
            tracker.set(name, data);
        }
        tracker
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<TrackerInner>>) -> Self {
        Self { inner }
    }

    pub fn schema(&self) -> Arc<ClassSchema> {
        Arc::clone(&self.inner.borrow().schema)
    }

    pub fn id(&self) -> ReplicaId {
        ReplicaId::of(Rc::as_ptr(&self.inner))
    }

    /// Assigns `data` to a tracked property. Returns whether anything changed.
    /// Failures are logged.
    pub fn set(&self, name: &str, data: impl Into<Data>) -> bool {
        match self.try_set(name, data) {
            Ok(changed) => changed,
            Err(error) => {
                warn!("{}", error);
                false
            }
        }
    }

    /// Assigns `data` to a tracked property.
    ///
    /// Assigning a value equal to the current one does nothing, as does
    /// assigning `Null` over a nested replica. Otherwise the slot is marked
    /// dirty, the change is relayed once per window towards the root, and the
    /// property's custom setter runs last.
    pub fn try_set(&self, name: &str, data: impl Into<Data>) -> Result<bool, TrackerError> {
        let data = data.into();

        if let Data::Child(child) = &data {
            self.check_not_ancestor(name, child)?;
        }

        let previous = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let Some(slot) = inner.slots.get_mut(name) else {
                return Err(TrackerError::UnknownProperty {
                    schema: inner.schema.name().to_string(),
                    property: name.to_string(),
                });
            };
            if slot.data.same_as(&data) {
                return Ok(false);
            }
            if slot.data.is_child() && data.is_null() {
                trace!(
                    "{}: ignoring null assignment over nested replica `{}`",
                    inner.schema.name(),
                    name
                );
                return Ok(false);
            }
            std::mem::replace(&mut slot.data, data.clone())
        };

        if let Data::Child(old_child) = &previous {
            self.orphan(name, old_child);
        }
        if let Data::Child(child) = &data {
            self.adopt(name, child);
        }

        self.mark_dirty(name, &data);

        let setter = self
            .schema()
            .mark(name)
            .and_then(|mark| mark.setter().cloned());
        if let Some(setter) = setter {
            setter(self, &data);
        }

        Ok(true)
    }

    /// Current contents of a tracked slot
    pub fn get(&self, name: &str) -> Option<Data> {
        self.inner
            .borrow()
            .slots
            .get(name)
            .map(|slot| slot.data.clone())
    }

    /// Plain view of a tracked slot, nested replicas flattened
    pub fn value(&self, name: &str) -> Option<Value> {
        self.get(name).map(|data| data.snapshot())
    }

    /// The nested tracker held in `name`, if that slot holds one
    pub fn child(&self, name: &str) -> Option<ChangeTracker> {
        match self.get(name)? {
            Data::Child(child) => child.as_tracker().cloned(),
            Data::Plain(_) => None,
        }
    }

    pub fn parent(&self) -> Option<ChangeTracker> {
        self.parent_link().and_then(|link| link.parent())
    }

    pub fn parent_key(&self) -> Option<String> {
        self.parent_link().map(|link| link.key().to_string())
    }

    /// Attaches the receiver of this tracker's per-window notification
    pub fn set_mutator(&self, mutator: PropertyMutator) {
        self.inner.borrow_mut().mutator = Some(mutator);
    }

    pub fn clear_mutator(&self) {
        self.inner.borrow_mut().mutator = None;
    }

    /// Whether any slot changed since the last diff generation
    pub fn is_dirty(&self) -> bool {
        self.inner.borrow().dirty
    }

    pub fn is_slot_dirty(&self, name: &str) -> bool {
        self.inner
            .borrow()
            .slots
            .get(name)
            .map_or(false, |slot| slot.dirty)
    }

    /// Whether the current window's change was already relayed
    pub fn has_pending_notify(&self) -> bool {
        self.inner.borrow().pending_notify
    }

    pub fn last_diff_version(&self) -> Version {
        self.inner.borrow().last_diff_version
    }

    pub fn slot_version(&self, name: &str) -> Option<Version> {
        self.inner.borrow().slots.get(name).map(|slot| slot.version)
    }

    pub fn tracked_names(&self) -> Vec<String> {
        self.inner.borrow().slots.keys().cloned().collect()
    }

    /// Marks `key` dirty on behalf of the nested replica it holds
    pub(crate) fn notify_changed(&self, key: &str) {
        let data = {
            let inner = self.inner.borrow();
            match inner.slots.get(key) {
                Some(slot) => slot.data.clone(),
                None => {
                    warn!(
                        "{}: change notification for untracked key `{}`",
                        inner.schema.name(),
                        key
                    );
                    return;
                }
            }
        };
        self.mark_dirty(key, &data);
    }

    /// Clears `key` if it still holds `child`, which has moved elsewhere.
    /// The move is a topology change, so the cleared slot is not marked dirty:
    /// observers repeat the move on their own mirrors.
    pub(crate) fn release_child(&self, key: &str, child: ReplicaId) {
        let released = {
            let mut inner = self.inner.borrow_mut();
            match inner.slots.get_mut(key) {
                Some(slot) if slot.data.child_id() == Some(child) => {
                    slot.data = Data::Plain(Value::Null);
                    true
                }
                _ => false,
            }
        };
        if released {
            debug!(
                "{}: nested replica left `{}`, slot cleared",
                self.schema().name(),
                key
            );
        }
    }

    fn mark_dirty(&self, name: &str, data: &Data) {
        let notify_hook = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            if let Some(slot) = inner.slots.get_mut(name) {
                slot.dirty = true;
            }
            inner.dirty = true;
            inner
                .schema
                .mark(name)
                .and_then(|mark| mark.notify_hook().cloned())
        };

        if let Some(hook) = notify_hook {
            if !hook(self, name, data) {
                debug!(
                    "{}: notify hook held back change of `{}`",
                    self.schema().name(),
                    name
                );
                return;
            }
        }

        self.relay(name);
    }

    fn relay(&self, name: &str) {
        let (link, mutator) = {
            let mut inner = self.inner.borrow_mut();
            if inner.pending_notify {
                return;
            }
            inner.pending_notify = true;
            (inner.parent.clone(), inner.mutator.clone())
        };

        if let Some(link) = link {
            link.notify_changed();
        }
        if let Some(mutator) = mutator {
            let _success = mutator.mutate(name);
        }
    }

    fn adopt(&self, name: &str, child: &ReplicaRef) {
        let link = ParentLink::new(self, name);
        if let Some(previous) = child.set_parent_link(Some(link)) {
            if !previous.points_to(self, name) {
                previous.release(child.id());
            }
        }
    }

    fn orphan(&self, name: &str, child: &ReplicaRef) {
        let linked_here = child
            .parent_link()
            .map_or(false, |link| link.points_to(self, name));
        if linked_here {
            child.set_parent_link(None);
        }
    }

    fn check_not_ancestor(&self, name: &str, child: &ReplicaRef) -> Result<(), TrackerError> {
        let cyclic = || TrackerError::CyclicAssignment {
            schema: self.schema().name().to_string(),
            property: name.to_string(),
        };

        if child.id() == self.id() {
            return Err(cyclic());
        }
        let mut ancestor = self.parent();
        while let Some(tracker) = ancestor {
            if tracker.id() == child.id() {
                return Err(cyclic());
            }
            ancestor = tracker.parent();
        }
        Ok(())
    }

    /// Plain snapshot of every tracked slot
    pub fn snapshot(&self) -> Value {
        let slots: Vec<(String, Data)> = self
            .inner
            .borrow()
            .slots
            .iter()
            .map(|(name, slot)| (name.clone(), slot.data.clone()))
            .collect();
        slots
            .into_iter()
            .map(|(name, data)| (name, data.snapshot()))
            .collect()
    }
}

impl Replicator for ChangeTracker {
    fn gen_diff(&self, from: Version, to: Version) -> Diff {
        ChangeTracker::gen_diff(self, from, to)
    }

    fn apply_diff(&self, payload: &Value) -> ApplyReport {
        match payload {
            Value::Map(diff) => ChangeTracker::apply_diff(self, diff),
            _ => ApplyReport::not_structured(""),
        }
    }

    fn version(&self) -> Version {
        self.inner.borrow().version
    }

    fn target(&self) -> Value {
        self.snapshot()
    }

    fn set_target(&self, target: &Value) {
        let Some(target) = target.as_map() else {
            warn!(
                "{}: set_target expects a mapping, ignoring",
                self.schema().name()
            );
            return;
        };
        for (name, value) in target {
            match (self.get(name), value) {
                (None, _) => trace!(
                    "{}: snapshot key `{}` is not tracked",
                    self.schema().name(),
                    name
                ),
                (Some(Data::Child(child)), Value::Map(_)) => child.set_target(value),
                (Some(_), _) => {
                    self.set(name, value.clone());
                }
            }
        }
    }

    fn replica_id(&self) -> ReplicaId {
        self.id()
    }

    fn parent_link(&self) -> Option<ParentLink> {
        self.inner.borrow().parent.clone()
    }

    fn set_parent_link(&self, link: Option<ParentLink>) -> Option<ParentLink> {
        std::mem::replace(&mut self.inner.borrow_mut().parent, link)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for ChangeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ChangeTracker")
            .field("schema", &inner.schema.name())
            .field("version", &inner.version)
            .field("last_diff_version", &inner.last_diff_version)
            .field("dirty", &inner.dirty)
            .field("pending_notify", &inner.pending_notify)
            .finish()
    }
}

// ParentLink
/// Back-reference from a nested replica to the slot holding it. Does not
/// keep the parent alive.
#[derive(Clone)]
pub struct ParentLink {
    parent: Weak<RefCell<TrackerInner>>,
    key: String,
}

impl ParentLink {
    pub fn new(parent: &ChangeTracker, key: &str) -> Self {
        Self {
            parent: Rc::downgrade(&parent.inner),
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn parent(&self) -> Option<ChangeTracker> {
        self.parent.upgrade().map(ChangeTracker::from_inner)
    }

    /// Relays a change of the nested replica to the parent slot
    pub fn notify_changed(&self) {
        match self.parent() {
            Some(parent) => parent.notify_changed(&self.key),
            None => trace!("parent of `{}` was dropped, change not relayed", self.key),
        }
    }

    pub(crate) fn points_to(&self, tracker: &ChangeTracker, key: &str) -> bool {
        std::ptr::eq(self.parent.as_ptr(), Rc::as_ptr(&tracker.inner)) && self.key == key
    }

    pub(crate) fn release(&self, child: ReplicaId) {
        if let Some(parent) = self.parent() {
            parent.release_child(&self.key, child);
        }
    }
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentLink")
            .field("key", &self.key)
            .field("alive", &(self.parent.strong_count() > 0))
            .finish()
    }
}
