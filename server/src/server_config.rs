use naia_replica_shared::Version;

/// Contains Config properties which will be used by a HostWorld
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Advance the round even when no root changed since the last one
    pub advance_idle_rounds: bool,
    /// Observers that fall more than this many rounds behind are resynced
    /// from the baseline instead of receiving an ever growing window.
    /// `None` never resyncs.
    pub resync_after_rounds: Option<Version>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            advance_idle_rounds: false,
            resync_after_rounds: Some(64),
        }
    }
}
