//! Remote exchange abstraction.
//!
//! The engine hands each outbound report to a [`RemoteExchange`] and only
//! cares about the outcome. [`SimulatedExchange`] stands in for a real
//! protocol client: it waits a jittered latency and acknowledges.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::conflict::fabricate_remote_edit;
use crate::config::SyncSettings;
use crate::error::Result;
use crate::models::Report;

/// Result of one exchange attempt for one report
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    /// The remote accepted the local copy
    Acknowledged,
    /// The remote declined; the report stays unsynchronized
    Rejected,
    /// The remote holds a different copy of the report
    Diverged(Report),
}

/// A transport that can push one report to the remote peer.
///
/// Returning `Err` is treated like [`ExchangeOutcome::Rejected`].
#[async_trait]
pub trait RemoteExchange: Send + Sync {
    /// Push `report` and report what the remote made of it.
    async fn exchange(&self, report: &Report) -> Result<ExchangeOutcome>;
}

/// Delay-and-acknowledge stand-in for a real remote.
#[derive(Debug, Clone)]
pub struct SimulatedExchange {
    latency_min: Duration,
    latency_max: Duration,
    conflict_rate: f64,
}

impl SimulatedExchange {
    pub const fn new(latency_min: Duration, latency_max: Duration) -> Self {
        Self {
            latency_min,
            latency_max,
            conflict_rate: 0.0,
        }
    }

    /// Exchange with no latency
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn from_settings(settings: &SyncSettings) -> Self {
        let (min, max) = settings.latency_window();
        Self::new(min, max).with_conflict_rate(settings.conflict_rate)
    }

    /// Make a fraction of exchanges come back diverged
    #[must_use]
    pub fn with_conflict_rate(mut self, rate: f64) -> Self {
        self.conflict_rate = rate;
        self
    }

    fn pick_latency(&self) -> Duration {
        if self.latency_max <= self.latency_min {
            return self.latency_min;
        }
        rand::thread_rng().gen_range(self.latency_min..=self.latency_max)
    }

    fn roll_conflict(&self) -> bool {
        self.conflict_rate > 0.0 && rand::thread_rng().gen_bool(self.conflict_rate.min(1.0))
    }
}

impl Default for SimulatedExchange {
    fn default() -> Self {
        Self::from_settings(&SyncSettings::default())
    }
}

#[async_trait]
impl RemoteExchange for SimulatedExchange {
    async fn exchange(&self, report: &Report) -> Result<ExchangeOutcome> {
        let latency = self.pick_latency();
        let diverged = self.roll_conflict();

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if diverged {
            tracing::debug!(report_id = %report.id, "simulated remote returned a divergent copy");
            return Ok(ExchangeOutcome::Diverged(fabricate_remote_edit(report)));
        }
        Ok(ExchangeOutcome::Acknowledged)
    }
}
