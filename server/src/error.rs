use thiserror::Error;

use naia_replica_shared::Version;

use crate::ObserverKey;

/// Errors returned by the `try_*` operations of `HostWorld`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostWorldError {
    /// A root is already registered under this key
    #[error("A root is already registered under this key")]
    RootAlreadyRegistered,

    /// No observer is registered under this key
    #[error("Observer {observer:?} does not exist")]
    NoSuchObserver { observer: ObserverKey },

    /// The observer acknowledged a round that was never sent
    #[error("Observer {observer:?} acknowledged version {version}, but the current round is {round}")]
    FutureAck {
        observer: ObserverKey,
        version: Version,
        round: Version,
    },
}
