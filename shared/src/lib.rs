//! # Naia Replica Shared
//! Change tracking, diff generation and diff application shared between
//! naia-replica-server & naia-replica-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod delta_packet;
mod diff;
mod replica;
mod replicate;
mod schema;
mod types;
mod value;

pub use delta_packet::DeltaPacket;
pub use diff::{Diff, DiffMap};
pub use replica::{
    apply_diff::{apply_delta, ApplyReport},
    change_tracker::{ChangeTracker, ParentLink},
    error::{DeltaError, TrackerError},
    property_mutate::{PropertyMutate, PropertyMutator},
    replicator::{Data, ReplicaId, ReplicaRef, Replicator},
};
pub use replicate::{compute_delta, tracker_of, Replicate, TrackerCell};
pub use schema::{
    class_schema::{ClassSchema, SchemaBuilder, TrackingPolicy},
    error::SchemaError,
    property_mark::{NotifyHook, PropertyMark, RemoteCall, SetterHook, SyncCondition},
    schema_cell::SchemaCell,
};
pub use types::{observer_lacks, Version, BASELINE_VERSION};
pub use value::{EntityRef, Value};
