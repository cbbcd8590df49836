//! Caller-facing report operations: create, edit, delete, list, sync.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio::task::JoinHandle;

use super::ids::{IdGenerator, UuidV7Generator};
use super::store::{ReportStore, StoreLocation};
use crate::config::SyncSettings;
use crate::error::Result;
use crate::models::{sort_by_recent, Report, ReportDraft, ReportId, ReportPatch, ReportStatus};
use crate::notify::{Notifier, Subscription};
use crate::sync::{Connectivity, RemoteExchange, Resolution, SimulatedExchange, SyncEngine, SyncPass};
use crate::util::now_millis;

const DAY_MS: i64 = 86_400_000;

/// Number of reports in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub offline: usize,
    pub syncing: usize,
    pub synced: usize,
    pub conflict: usize,
}

impl StatusCounts {
    fn tally(reports: &[Report]) -> Self {
        let mut counts = Self::default();
        for report in reports {
            match report.status {
                ReportStatus::Offline => counts.offline += 1,
                ReportStatus::Syncing => counts.syncing += 1,
                ReportStatus::Synced => counts.synced += 1,
                ReportStatus::Conflict => counts.conflict += 1,
            }
        }
        counts
    }

    pub const fn total(&self) -> usize {
        self.offline + self.syncing + self.synced + self.conflict
    }
}

/// Report workflow shared by every client.
///
/// Local mutations always land in the store first; when the network is
/// online and auto-sync is enabled a pass is started in the background.
pub struct ReportService {
    store: Arc<ReportStore>,
    engine: Arc<SyncEngine>,
    ids: Arc<dyn IdGenerator>,
    settings: SyncSettings,
    connectivity: RwLock<Connectivity>,
}

impl ReportService {
    /// Assemble a service around an existing engine.
    pub fn new(engine: Arc<SyncEngine>, settings: SyncSettings) -> Self {
        Self {
            store: Arc::clone(engine.store()),
            engine,
            ids: Arc::new(UuidV7Generator),
            settings,
            connectivity: RwLock::new(Connectivity::default()),
        }
    }

    /// Build store, simulated exchange, and engine from settings.
    ///
    /// Nothing is opened until the first operation.
    pub fn open(location: StoreLocation, settings: SyncSettings) -> Self {
        let exchange = SimulatedExchange::from_settings(&settings);
        Self::with_exchange(location, settings, Arc::new(exchange))
    }

    /// Like [`ReportService::open`] with a caller-supplied transport.
    pub fn with_exchange(
        location: StoreLocation,
        settings: SyncSettings,
        exchange: Arc<dyn RemoteExchange>,
    ) -> Self {
        let store = Arc::new(ReportStore::new(location));
        let engine = Arc::new(SyncEngine::new(store, exchange, Notifier::new()));
        Self::new(engine, settings)
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub const fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    pub const fn store(&self) -> &Arc<ReportStore> {
        &self.store
    }

    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Register a "state changed" observer.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.engine.subscribe(callback)
    }

    pub fn connectivity(&self) -> Connectivity {
        *self
            .connectivity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the latest network status from the host environment.
    pub fn set_connectivity(&self, connectivity: Connectivity) {
        *self
            .connectivity
            .write()
            .unwrap_or_else(PoisonError::into_inner) = connectivity;
        tracing::debug!("Network status set to {connectivity}");
    }

    /// All reports, newest edit first.
    ///
    /// An empty store is seeded with sample reports when enabled.
    pub async fn list(&self) -> Result<Vec<Report>> {
        let mut reports = self.store.get_all().await?;
        if reports.is_empty() && self.settings.seed_samples {
            self.seed_samples().await?;
            reports = self.store.get_all().await?;
        }
        sort_by_recent(&mut reports);
        Ok(reports)
    }

    /// Reports in one status, newest edit first.
    pub async fn list_by_status(&self, status: ReportStatus) -> Result<Vec<Report>> {
        let mut reports = self.store.get_by_status(status).await?;
        sort_by_recent(&mut reports);
        Ok(reports)
    }

    pub async fn get(&self, id: &ReportId) -> Result<Option<Report>> {
        self.store.get(id).await
    }

    /// Persist a new `offline` report.
    pub async fn create(&self, draft: ReportDraft) -> Result<Report> {
        let report = draft.into_report(self.ids.next_id())?;
        self.store.put(&report).await?;
        self.engine.notifier().notify();
        tracing::debug!(report_id = %report.id, "Created report");

        self.schedule_sync();
        Ok(report)
    }

    /// Apply a local edit. Returns `None` when the report does not exist.
    pub async fn update(&self, id: &ReportId, patch: ReportPatch) -> Result<Option<Report>> {
        let Some(mut report) = self.store.get(id).await? else {
            return Ok(None);
        };

        patch.apply(&mut report)?;
        self.store.put(&report).await?;
        self.engine.notifier().notify();
        tracing::debug!(report_id = %id, "Updated report");

        self.schedule_sync();
        Ok(Some(report))
    }

    /// Delete a report; unknown ids are ignored.
    pub async fn delete(&self, id: &ReportId) -> Result<()> {
        self.store.delete(id).await?;
        self.engine.notifier().notify();
        Ok(())
    }

    pub async fn status_counts(&self) -> Result<StatusCounts> {
        let reports = self.store.get_all().await?;
        Ok(StatusCounts::tally(&reports))
    }

    /// Run a pass now using the current network status.
    pub async fn sync_now(&self, should_fail: bool) -> Result<SyncPass> {
        self.engine
            .sync(self.connectivity().is_connected(), should_fail)
            .await
    }

    pub async fn inject_conflict(&self, id: &ReportId) -> Result<Option<Report>> {
        self.engine.inject_conflict(id).await
    }

    pub async fn resolve_conflict(
        &self,
        id: &ReportId,
        strategy: Resolution,
    ) -> Result<Option<Report>> {
        self.engine.resolve_conflict(id, strategy).await
    }

    /// Start a background pass when auto-sync is on and the network is online.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule_sync(&self) -> Option<JoinHandle<()>> {
        if !self.settings.auto_sync || !self.connectivity().is_connected() {
            return None;
        }

        let engine = Arc::clone(&self.engine);
        Some(tokio::spawn(async move {
            if let Err(error) = engine.sync(true, false).await {
                tracing::error!("Background sync failed: {error}");
            }
        }))
    }

    /// Write the sample reports, replacing any with the same ids.
    pub async fn seed_samples(&self) -> Result<usize> {
        let samples = sample_reports(now_millis());
        for sample in &samples {
            self.store.put(sample).await?;
        }
        self.engine.notifier().notify();
        tracing::info!("Seeded {} sample report(s)", samples.len());
        Ok(samples.len())
    }
}

/// Starter reports shown in an empty store.
pub fn sample_reports(now_ms: i64) -> Vec<Report> {
    let mut welcome = Report::with_id(
        ReportId::from("sample-1"),
        "Welcome to SignalDrop",
        "SignalDrop keeps field reports on this device first and syncs them when a \
         connection comes back.\n\n\
         - Create and edit reports with no network at all\n\
         - Pending reports sync automatically once you are online\n\
         - Concurrent remote edits surface as conflicts you resolve explicitly",
    );
    welcome.tags = vec!["welcome".into(), "tutorial".into()];
    welcome.created_at = now_ms - DAY_MS;
    welcome.updated_at = now_ms - DAY_MS;
    welcome.status = ReportStatus::Synced;

    let mut offline = Report::with_id(
        ReportId::from("sample-2"),
        "Testing Offline Functionality",
        "1. Switch the network to offline\n\
         2. Create or edit a few reports; they are stored locally\n\
         3. Switch back to online and run a sync\n\
         4. Inject a conflict to try the local, remote, and merge resolutions",
    );
    offline.tags = vec!["testing".into(), "offline".into()];
    offline.created_at = now_ms - 2 * DAY_MS;
    offline.updated_at = now_ms - 2 * DAY_MS;
    offline.status = ReportStatus::Synced;

    vec![welcome, offline]
}
