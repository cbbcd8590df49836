//! Sync engine: drives reports through offline → syncing → synced.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;

use super::conflict::{self, fabricate_remote_edit, Resolution};
use super::exchange::{ExchangeOutcome, RemoteExchange};
use crate::error::Result;
use crate::models::{Report, ReportId, ReportStatus};
use crate::notify::{Notifier, Subscription};
use crate::services::ReportStore;

/// Why a `sync` call did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another pass was already in flight
    AlreadyRunning,
    /// The caller reported no connectivity
    Disconnected,
}

/// Per-pass tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// `offline` reports in the snapshot
    pub attempted: usize,
    /// Reached `synced`
    pub synced: usize,
    /// Reverted to `offline`
    pub failed: usize,
    /// Moved to `conflict` by a divergent remote copy
    pub diverged: usize,
}

/// What a `sync` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPass {
    Skipped(SkipReason),
    Completed(PassSummary),
}

impl SyncPass {
    pub const fn summary(&self) -> Option<&PassSummary> {
        match self {
            Self::Completed(summary) => Some(summary),
            Self::Skipped(_) => None,
        }
    }
}

enum RecordOutcome {
    Synced,
    Failed,
    Diverged,
}

/// Clears the in-flight flag when the pass ends, however it ends.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates outbound sync passes and the conflict protocol.
///
/// At most one pass runs at a time for the whole store; overlapping calls
/// collapse into the running one.
pub struct SyncEngine {
    store: Arc<ReportStore>,
    exchange: Arc<dyn RemoteExchange>,
    notifier: Notifier,
    in_flight: AtomicBool,
}

impl SyncEngine {
    pub fn new(
        store: Arc<ReportStore>,
        exchange: Arc<dyn RemoteExchange>,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            exchange,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    pub const fn store(&self) -> &Arc<ReportStore> {
        &self.store
    }

    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Register a "state changed" observer.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    /// Whether a pass is currently in flight
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Push every `offline` report to the remote.
    ///
    /// `should_fail` injects a failure into every exchange of this pass; the
    /// affected reports return to `offline` and are retried by a later call.
    pub async fn sync(&self, is_connected: bool, should_fail: bool) -> Result<SyncPass> {
        if self.is_syncing() {
            return Ok(SyncPass::Skipped(SkipReason::AlreadyRunning));
        }
        if !is_connected {
            return Ok(SyncPass::Skipped(SkipReason::Disconnected));
        }
        let Some(_guard) = PassGuard::acquire(&self.in_flight) else {
            return Ok(SyncPass::Skipped(SkipReason::AlreadyRunning));
        };

        self.recover_stranded().await?;

        let pending = self.store.get_by_status(ReportStatus::Offline).await?;
        tracing::debug!("Starting sync pass over {} report(s)", pending.len());

        let mut summary = PassSummary {
            attempted: pending.len(),
            ..PassSummary::default()
        };

        for report in pending {
            match self.sync_record(report, should_fail).await? {
                RecordOutcome::Synced => summary.synced += 1,
                RecordOutcome::Failed => summary.failed += 1,
                RecordOutcome::Diverged => summary.diverged += 1,
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            synced = summary.synced,
            failed = summary.failed,
            diverged = summary.diverged,
            "Sync pass finished"
        );
        Ok(SyncPass::Completed(summary))
    }

    /// Return reports left in `syncing` by an interrupted pass to `offline`.
    ///
    /// Only called while the in-flight flag is held, so no live exchange in
    /// this engine owns them.
    async fn recover_stranded(&self) -> Result<()> {
        let stranded = self.store.get_by_status(ReportStatus::Syncing).await?;
        if stranded.is_empty() {
            return Ok(());
        }

        tracing::warn!("Recovering {} report(s) stuck in syncing", stranded.len());
        for mut report in stranded {
            report.status = ReportStatus::Offline;
            self.store.put(&report).await?;
        }
        self.notifier.notify();
        Ok(())
    }

    async fn sync_record(&self, mut report: Report, inject_failure: bool) -> Result<RecordOutcome> {
        report.status = ReportStatus::Syncing;
        self.store.put(&report).await?;
        self.notifier.notify();

        let exchanged = AssertUnwindSafe(self.exchange.exchange(&report))
            .catch_unwind()
            .await;
        let outcome = match exchanged {
            Ok(Ok(_)) if inject_failure => ExchangeOutcome::Rejected,
            Ok(Ok(outcome)) => outcome,
            Ok(Err(error)) => {
                tracing::warn!(report_id = %report.id, "Sync exchange failed: {error}");
                ExchangeOutcome::Rejected
            }
            Err(_) => {
                tracing::error!(report_id = %report.id, "Sync exchange panicked");
                ExchangeOutcome::Rejected
            }
        };

        let result = match outcome {
            ExchangeOutcome::Acknowledged => {
                report.status = ReportStatus::Synced;
                report.sync_version = Some(report.next_sync_version());
                RecordOutcome::Synced
            }
            ExchangeOutcome::Rejected => {
                report.status = ReportStatus::Offline;
                RecordOutcome::Failed
            }
            ExchangeOutcome::Diverged(remote) => {
                tracing::info!(report_id = %report.id, "Remote holds a divergent copy");
                report.mark_conflict(remote);
                RecordOutcome::Diverged
            }
        };

        self.store.put(&report).await?;
        self.notifier.notify();
        Ok(result)
    }

    /// Attach a fabricated concurrent remote edit and move the report into
    /// `conflict`. Returns `None` when the report does not exist.
    pub async fn inject_conflict(&self, id: &ReportId) -> Result<Option<Report>> {
        let Some(mut report) = self.store.get(id).await? else {
            return Ok(None);
        };

        let remote = fabricate_remote_edit(&report);
        report.mark_conflict(remote);
        self.store.put(&report).await?;
        self.notifier.notify();

        tracing::debug!(report_id = %id, "Injected remote conflict");
        Ok(Some(report))
    }

    /// Settle a conflict. Returns `None` when the report does not exist or
    /// carries no remote version.
    pub async fn resolve_conflict(
        &self,
        id: &ReportId,
        strategy: Resolution,
    ) -> Result<Option<Report>> {
        let Some(report) = self.store.get(id).await? else {
            return Ok(None);
        };
        let Some(resolved) = conflict::resolve(report, strategy) else {
            return Ok(None);
        };

        self.store.put(&resolved).await?;
        self.notifier.notify();

        tracing::info!(report_id = %id, strategy = %strategy, "Resolved conflict");
        Ok(Some(resolved))
    }
}
