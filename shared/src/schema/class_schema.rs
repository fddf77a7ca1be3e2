use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use log::{debug, warn};

use crate::{ChangeTracker, Value};

use super::{
    error::SchemaError,
    property_mark::{PropertyMark, RemoteCall},
};

/// Which properties of a type get tracked
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingPolicy {
    /// Registered properties, plus the listed names
    ExplicitList(BTreeSet<String>),
    /// Registered properties, plus every declared field not in the skip-list
    SkipList(BTreeSet<String>),
}

impl Default for TrackingPolicy {
    fn default() -> Self {
        TrackingPolicy::ExplicitList(BTreeSet::new())
    }
}

// ClassSchema
/// Immutable catalog of the tracked properties of one type, shared by every
/// instance of that type.
pub struct ClassSchema {
    name: String,
    entries: BTreeMap<String, PropertyMark>,
    policy: TrackingPolicy,
    remote_calls: BTreeMap<String, RemoteCall>,
    skipped: Vec<SchemaError>,
}

impl ClassSchema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            ..SchemaBuilder::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> impl Iterator<Item = &PropertyMark> {
        self.entries.values()
    }

    pub fn mark(&self, name: &str) -> Option<&PropertyMark> {
        self.entries.get(name)
    }

    pub fn tracks(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy(&self) -> &TrackingPolicy {
        &self.policy
    }

    pub fn remote_call(&self, name: &str) -> Option<&RemoteCall> {
        self.remote_calls.get(name)
    }

    /// Entries dropped while building, already logged
    pub fn skipped(&self) -> &[SchemaError] {
        &self.skipped
    }
}

impl fmt::Debug for ClassSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassSchema")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .field("policy", &self.policy)
            .field("remote_calls", &self.remote_calls.keys().collect::<Vec<_>>())
            .field("skipped", &self.skipped)
            .finish()
    }
}

// SchemaBuilder
#[derive(Default)]
pub struct SchemaBuilder {
    name: String,
    fields: Option<Vec<(String, Value)>>,
    marks: BTreeMap<String, PropertyMark>,
    policy: TrackingPolicy,
    remote_calls: BTreeMap<String, RemoteCall>,
}

impl SchemaBuilder {
    /// Declares a field of the type together with its declared initial value.
    /// Once any field is declared, registered properties are checked against
    /// the declared fields.
    pub fn field(&mut self, name: impl Into<String>, initial: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let initial = initial.into();
        let fields = self.fields.get_or_insert_with(Vec::new);
        if let Some(existing) = fields.iter_mut().find(|(field, _)| *field == name) {
            existing.1 = initial;
        } else {
            fields.push((name, initial));
        }
        self
    }

    /// Registers a tracked property with a default value
    pub fn property(&mut self, name: impl Into<String>, default: impl Into<Value>) -> &mut Self {
        self.mark(PropertyMark::new(name, default))
    }

    /// Registers a tracked property. The last registration for a name wins.
    pub fn mark(&mut self, mark: PropertyMark) -> &mut Self {
        if let Some(previous) = self.marks.insert(mark.name().to_string(), mark) {
            debug!(
                "Schema {}: property `{}` registered again, replacing earlier registration",
                self.name,
                previous.name()
            );
        }
        self
    }

    /// Tracks the registered properties plus the listed names
    pub fn explicit<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy = TrackingPolicy::ExplicitList(names.into_iter().map(Into::into).collect());
        self
    }

    /// Tracks every declared field except those listed
    pub fn track_all<I, S>(&mut self, skip: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy = TrackingPolicy::SkipList(skip.into_iter().map(Into::into).collect());
        self
    }

    /// Registers a handler run when an incoming diff carries `name`
    pub fn remote_call<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&ChangeTracker, &Value) + Send + Sync + 'static,
    {
        self.remote_calls.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn build(&mut self) -> Arc<ClassSchema> {
        let SchemaBuilder {
            name,
            fields,
            marks,
            policy,
            remote_calls,
        } = std::mem::take(self);

        let declared: Option<BTreeMap<String, Value>> =
            fields.map(|fields| fields.into_iter().collect());
        let mut entries = BTreeMap::new();
        let mut skipped = Vec::new();

        let missing = |property: &str, skipped: &mut Vec<SchemaError>| {
            let error = SchemaError::MissingDescriptor {
                schema: name.clone(),
                property: property.to_string(),
            };
            warn!("{}", error);
            skipped.push(error);
        };

        for (property, mark) in marks {
            if let Some(declared) = &declared {
                if !declared.contains_key(&property) {
                    missing(&property, &mut skipped);
                    continue;
                }
            }
            entries.insert(property, mark);
        }

        match &policy {
            TrackingPolicy::ExplicitList(allowed) => {
                for property in allowed {
                    if entries.contains_key(property) {
                        continue;
                    }
                    let initial = match &declared {
                        Some(declared) => match declared.get(property) {
                            Some(initial) => initial.clone(),
                            None => {
                                missing(property, &mut skipped);
                                continue;
                            }
                        },
                        None => Value::Null,
                    };
                    entries.insert(property.clone(), PropertyMark::new(property.as_str(), initial));
                }
            }
            TrackingPolicy::SkipList(skip) => match &declared {
                Some(declared) => {
                    for (property, initial) in declared {
                        if skip.contains(property) || entries.contains_key(property) {
                            continue;
                        }
                        entries.insert(
                            property.clone(),
                            PropertyMark::new(property.as_str(), initial.clone()),
                        );
                    }
                }
                None => {
                    debug!(
                        "Schema {}: tracking all fields, but no fields were declared",
                        name
                    );
                }
            },
        }

        Arc::new(ClassSchema {
            name,
            entries,
            policy,
            remote_calls,
            skipped,
        })
    }
}
