//! Network identification and the per-network timing policy.

use std::time::Duration;

use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

/// Name of the designated production network.
pub const PRODUCTION_NETWORK: &str = "matic";
/// Name of the disposable local network.
pub const EPHEMERAL_NETWORK: &str = "hardhat";

/// Action interval on the production network (12 hours).
pub const PRODUCTION_ACTION_INTERVAL: u64 = 12 * 60 * 60;
/// Action interval on every other network (5 minutes).
pub const DEFAULT_ACTION_INTERVAL: u64 = 5 * 60;
/// Grace period before deploying to a non-ephemeral network.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 10;

/// The network targeted by a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Deref, Display, From)]
#[serde(transparent)]
pub struct Network(String);

impl Network {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Network {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Minimum number of seconds between two posting actions, passed to the contract constructor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct ActionInterval(u64);

impl ActionInterval {
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

/// Environment class of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum NetworkClass {
    /// The network real users post on.
    Production,
    /// A disposable in-process network.
    Ephemeral,
    /// Any other persistent network.
    Testnet,
}

/// Maps networks to their environment class and timing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPolicy {
    /// Network classified as production.
    pub production_network: String,
    /// Network classified as ephemeral. Deployments there skip the grace period.
    pub ephemeral_network: String,
    /// Action interval in seconds on the production network.
    pub production_interval: u64,
    /// Action interval in seconds on every other network.
    pub default_interval: u64,
    /// Seconds to wait before deploying to a non-ephemeral network.
    pub grace_period_secs: u64,
}

impl Default for NetworkPolicy {
    fn default() -> Self {
        Self {
            production_network: PRODUCTION_NETWORK.to_string(),
            ephemeral_network: EPHEMERAL_NETWORK.to_string(),
            production_interval: PRODUCTION_ACTION_INTERVAL,
            default_interval: DEFAULT_ACTION_INTERVAL,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
        }
    }
}

impl NetworkPolicy {
    pub fn classify(&self, network: &Network) -> NetworkClass {
        if network.name() == self.production_network {
            NetworkClass::Production
        } else if network.name() == self.ephemeral_network {
            NetworkClass::Ephemeral
        } else {
            NetworkClass::Testnet
        }
    }

    /// Select the action interval for a network. Total over every network name.
    pub fn action_interval(&self, network: &Network) -> ActionInterval {
        match self.classify(network) {
            NetworkClass::Production => ActionInterval::from_secs(self.production_interval),
            NetworkClass::Ephemeral | NetworkClass::Testnet => {
                ActionInterval::from_secs(self.default_interval)
            }
        }
    }

    pub fn is_ephemeral(&self, network: &Network) -> bool {
        self.classify(network) == NetworkClass::Ephemeral
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}
