//! # Naia Replica Server
//! Owns the replicated roots, tracks which of them changed each round and
//! produces one delta packet per observer, starting from the version that
//! observer last acknowledged.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use naia_replica_shared::{
        ChangeTracker, ClassSchema, DeltaPacket, Diff, DiffMap, PropertyMark, SyncCondition,
        Value, Version, BASELINE_VERSION,
    };
}

mod error;
mod host_world;
mod observer;
mod root_mutator;
mod server_config;

pub use error::HostWorldError;
pub use host_world::HostWorld;
pub use observer::{ObserverFilter, ObserverKey};
pub use server_config::ServerConfig;
