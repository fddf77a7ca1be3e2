//! # Naia Replica Client
//! Keeps mirrors of the roots replicated by a naia-replica-server and merges
//! incoming delta packets into them in version order.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use naia_replica_shared::{
        ApplyReport, ChangeTracker, ClassSchema, DeltaError, DeltaPacket, DiffMap, Value,
        Version, BASELINE_VERSION,
    };
}

mod applied_window;
mod client_config;
mod error;
mod remote_world;

pub use applied_window::AppliedWindow;
pub use client_config::ClientConfig;
pub use error::RemoteWorldError;
pub use remote_world::RemoteWorld;
