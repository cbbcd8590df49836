//! Runtime configuration for the sync engine and report service.
//!
//! Settings come from an optional JSON file; every field has a default so an
//! empty object (or no file at all) yields the stock behavior.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

/// Environment variable naming the settings file
pub const CONFIG_ENV_VAR: &str = "SIGNALDROP_CONFIG";

const DEFAULT_LATENCY_MIN_MS: u64 = 800;
const DEFAULT_LATENCY_MAX_MS: u64 = 1200;

/// Tunables for sync simulation and the report service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    /// Lower bound of the simulated exchange latency
    pub latency_min_ms: u64,
    /// Upper bound of the simulated exchange latency
    pub latency_max_ms: u64,
    /// Probability in `[0, 1]` that the simulated remote reports a divergent copy
    pub conflict_rate: f64,
    /// Start a sync pass after each local create/edit while online
    pub auto_sync: bool,
    /// Seed sample reports into an empty store on first listing
    pub seed_samples: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            latency_min_ms: DEFAULT_LATENCY_MIN_MS,
            latency_max_ms: DEFAULT_LATENCY_MAX_MS,
            conflict_rate: 0.0,
            auto_sync: true,
            seed_samples: true,
        }
    }
}

impl SyncSettings {
    /// Parse and validate settings from a JSON payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(payload)
            .map_err(|error| Error::Config(format!("invalid settings JSON: {error}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let payload = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&payload)
    }

    /// Load from an explicit path, else `SIGNALDROP_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let from_env = normalize_text_option(std::env::var(CONFIG_ENV_VAR).ok());
        match from_env {
            Some(path) => {
                tracing::debug!("Loading sync settings from {path}");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.latency_min_ms > self.latency_max_ms {
            return Err(Error::Config(format!(
                "latency_min_ms ({}) must not exceed latency_max_ms ({})",
                self.latency_min_ms, self.latency_max_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.conflict_rate) {
            return Err(Error::Config(format!(
                "conflict_rate must be within [0, 1], got {}",
                self.conflict_rate
            )));
        }
        Ok(())
    }

    /// Latency window for the simulated exchange
    pub const fn latency_window(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.latency_min_ms),
            Duration::from_millis(self.latency_max_ms),
        )
    }

    /// Settings with no simulated latency (tests, scripted runs)
    #[must_use]
    pub fn instant() -> Self {
        Self {
            latency_min_ms: 0,
            latency_max_ms: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_latency() {
        let settings = SyncSettings::default();
        assert_eq!(
            settings.latency_window(),
            (Duration::from_millis(800), Duration::from_millis(1200))
        );
        assert!(settings.auto_sync);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn empty_object_yields_defaults() {
        let settings = SyncSettings::from_json("{}").unwrap();
        assert_eq!(settings, SyncSettings::default());
    }

    #[test]
    fn partial_payload_overrides_fields() {
        let settings =
            SyncSettings::from_json(r#"{ "latency_min_ms": 5, "latency_max_ms": 10 }"#).unwrap();
        assert_eq!(settings.latency_min_ms, 5);
        assert_eq!(settings.latency_max_ms, 10);
        assert!(settings.seed_samples);
    }

    #[test]
    fn rejects_unknown_fields() {
        let error = SyncSettings::from_json(r#"{ "retries": 3 }"#).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn rejects_inverted_latency_window() {
        let error =
            SyncSettings::from_json(r#"{ "latency_min_ms": 50, "latency_max_ms": 10 }"#).unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn rejects_out_of_range_conflict_rate() {
        let error = SyncSettings::from_json(r#"{ "conflict_rate": 1.5 }"#).unwrap_err();
        assert!(error.to_string().contains("conflict_rate"));
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("signaldrop.json");
        std::fs::write(&path, r#"{ "auto_sync": false }"#).unwrap();

        let settings = SyncSettings::resolve(Some(&path)).unwrap();
        assert!(!settings.auto_sync);
    }
}
