//! Outbound synchronization and conflict handling.

pub mod conflict;
mod engine;
pub mod exchange;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use conflict::Resolution;
pub use engine::{PassSummary, SkipReason, SyncEngine, SyncPass};
pub use exchange::{ExchangeOutcome, RemoteExchange, SimulatedExchange};

/// Network state reported by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    #[default]
    Online,
    Slow,
    Offline,
}

impl Connectivity {
    /// Only a fully online network is used for sync.
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Online)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Slow => "slow",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connectivity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "slow" => Ok(Self::Slow),
            "offline" => Ok(Self::Offline),
            other => Err(Error::InvalidInput(format!("unknown network status: {other}"))),
        }
    }
}
