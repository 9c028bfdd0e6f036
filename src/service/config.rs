use std::time::Duration;

const DEFAULT_BROADCAST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_NETWORK: &str = "mainnet";

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on a single gateway submission.
    pub broadcast_timeout: Duration,
    /// Network name handed to the key and signing collaborators.
    pub network: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broadcast_timeout: DEFAULT_BROADCAST_TIMEOUT,
            network: DEFAULT_NETWORK.to_string(),
        }
    }
}
