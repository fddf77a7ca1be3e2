use thiserror::Error;

use naia_replica_shared::Version;

/// Errors returned by the `try_*` operations of `RemoteWorld`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteWorldError {
    /// The packet's window ends at or before the applied version
    #[error("Stale packet ({from}, {to}], already applied up to {applied}")]
    StalePacket {
        from: Version,
        to: Version,
        applied: Version,
    },

    /// The packet's window runs backwards
    #[error("Malformed packet window ({from}, {to}]")]
    BackwardsWindow { from: Version, to: Version },

    /// A mirror is already registered under this key
    #[error("A mirror is already registered under this key")]
    MirrorAlreadyInserted,
}
