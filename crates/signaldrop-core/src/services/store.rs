//! Async, shareable report store.

use std::path::PathBuf;

use tokio::sync::{Mutex, OnceCell};

use crate::db::{Database, ReportRepository, SqliteReportRepository};
use crate::error::Result;
use crate::models::{Report, ReportId, ReportStatus};

/// Where the store keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// `SQLite` file, created on first use
    Path(PathBuf),
    /// Private in-memory database (tests, dry runs)
    InMemory,
}

/// Durable keyed storage of reports.
///
/// The underlying database is opened lazily on the first operation. Opening is
/// memoized: concurrent first calls share a single initialization, and a
/// failed attempt is retried by the next call.
pub struct ReportStore {
    location: StoreLocation,
    db: OnceCell<Mutex<Database>>,
}

impl ReportStore {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            db: OnceCell::new(),
        }
    }

    /// Store backed by a file at `path`
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::Path(path.into()))
    }

    /// Store backed by a private in-memory database
    pub fn in_memory() -> Self {
        Self::new(StoreLocation::InMemory)
    }

    pub const fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Whether the underlying database has been opened yet
    pub fn is_initialized(&self) -> bool {
        self.db.initialized()
    }

    /// Open the underlying database if that has not happened yet.
    pub async fn init(&self) -> Result<()> {
        self.database().await.map(|_| ())
    }

    async fn database(&self) -> Result<&Mutex<Database>> {
        self.db
            .get_or_try_init(|| async { self.open().map(Mutex::new) })
            .await
    }

    fn open(&self) -> Result<Database> {
        match &self.location {
            StoreLocation::Path(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                tracing::debug!("Opening report store at {}", path.display());
                Database::open(path)
            }
            StoreLocation::InMemory => {
                tracing::debug!("Opening in-memory report store");
                Database::open_in_memory()
            }
        }
    }

    /// Insert or fully replace the report with the same id.
    pub async fn put(&self, report: &Report) -> Result<()> {
        let db = self.database().await?.lock().await;
        SqliteReportRepository::new(db.connection()).put(report)
    }

    /// Fetch a report; `None` when absent.
    pub async fn get(&self, id: &ReportId) -> Result<Option<Report>> {
        let db = self.database().await?.lock().await;
        SqliteReportRepository::new(db.connection()).get(id)
    }

    /// Every report, unordered.
    pub async fn get_all(&self) -> Result<Vec<Report>> {
        let db = self.database().await?.lock().await;
        SqliteReportRepository::new(db.connection()).get_all()
    }

    /// Every report with the given status.
    pub async fn get_by_status(&self, status: ReportStatus) -> Result<Vec<Report>> {
        let db = self.database().await?.lock().await;
        SqliteReportRepository::new(db.connection()).get_by_status(status)
    }

    /// Remove a report; absent ids are ignored.
    pub async fn delete(&self, id: &ReportId) -> Result<()> {
        let db = self.database().await?.lock().await;
        SqliteReportRepository::new(db.connection()).delete(id)
    }
}

impl std::fmt::Debug for ReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStore")
            .field("location", &self.location)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn initializes_lazily_on_first_use() {
        let store = ReportStore::in_memory();
        assert!(!store.is_initialized());

        assert!(store.get_all().await.unwrap().is_empty());
        assert!(store.is_initialized());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_first_use_shares_one_database() {
        let store = Arc::new(ReportStore::in_memory());
        let report = Report::new("Shared", "");

        let writer = {
            let store = Arc::clone(&store);
            let report = report.clone();
            tokio::spawn(async move { store.put(&report).await })
        };
        let initializer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.init().await })
        };
        writer.await.unwrap().unwrap();
        initializer.await.unwrap().unwrap();
        store.init().await.unwrap();

        // A second database would not see the write
        assert_eq!(store.get(&report.id).await.unwrap(), Some(report));
    }

    #[tokio::test]
    async fn persists_across_store_instances() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("reports.db");
        let report = Report::new("Durable", "still here");

        ReportStore::at_path(&path).put(&report).await.unwrap();

        let reopened = ReportStore::at_path(&path);
        assert_eq!(reopened.get(&report.id).await.unwrap(), Some(report));
    }

    #[tokio::test]
    async fn unusable_medium_is_storage_unavailable() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("reports.db");
        std::fs::write(&path, vec![0xAB_u8; 4096]).unwrap();

        let store = ReportStore::at_path(&path);
        let error = store.get_all().await.unwrap_err();
        assert!(error.is_storage_unavailable());
        assert!(!store.is_initialized());
    }

    #[tokio::test]
    async fn delete_missing_leaves_others() {
        let store = ReportStore::in_memory();
        let report = Report::new("Keep", "");
        store.put(&report).await.unwrap();

        store.delete(&ReportId::from("ghost")).await.unwrap();

        assert_eq!(store.get_all().await.unwrap(), vec![report]);
    }
}
