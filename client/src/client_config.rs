/// Contains Config properties which will be used by a RemoteWorld
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// How many packets from the future are held while waiting for the
    /// window they build on. The one farthest from the applied version is
    /// dropped first.
    pub max_buffered_packets: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_buffered_packets: 32,
        }
    }
}
