//! Report repository implementation

use crate::error::Result;
use crate::models::{GeoLocation, Report, ReportId, ReportStatus};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

const SELECT_COLUMNS: &str = "SELECT id, title, content, tags, latitude, longitude, created_at, \
     updated_at, status, sync_version, remote_version FROM reports";

/// Trait for report storage operations
pub trait ReportRepository {
    /// Insert or fully replace the report with the same id
    fn put(&self, report: &Report) -> Result<()>;

    /// Get a report by ID; `None` when absent
    fn get(&self, id: &ReportId) -> Result<Option<Report>>;

    /// Every stored report, in no particular order
    fn get_all(&self) -> Result<Vec<Report>>;

    /// Every report whose status equals `status`
    fn get_by_status(&self, status: ReportStatus) -> Result<Vec<Report>>;

    /// Remove a report; removing an absent id is not an error
    fn delete(&self, id: &ReportId) -> Result<()>;
}

/// `SQLite` implementation of `ReportRepository`
pub struct SqliteReportRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteReportRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a report from a database row
    fn parse_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<Report> {
        let id: String = row.get(0)?;
        let tags: String = row.get(3)?;
        let latitude: Option<f64> = row.get(4)?;
        let longitude: Option<f64> = row.get(5)?;
        let status: String = row.get(8)?;
        let remote_version: Option<String> = row.get(10)?;

        let location = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoLocation {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Ok(Report {
            id: id.into(),
            title: row.get(1)?,
            content: row.get(2)?,
            tags: decode_json(3, &tags)?,
            location,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            status: status
                .parse()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?,
            sync_version: row.get(9)?,
            remote_version: remote_version
                .as_deref()
                .map(|json| decode_json::<Report>(10, json))
                .transpose()?
                .map(|remote| Box::new(remote.into_snapshot())),
        })
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(column: usize, json: &str) -> rusqlite::Result<T> {
    serde_json::from_str(json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn put(&self, report: &Report) -> Result<()> {
        let tags = serde_json::to_string(&report.tags)?;
        let remote_version = report
            .remote_version
            .as_deref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO reports (id, title, content, tags, latitude, longitude, created_at, updated_at, status, sync_version, remote_version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                tags = excluded.tags,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                status = excluded.status,
                sync_version = excluded.sync_version,
                remote_version = excluded.remote_version",
            params![
                report.id.as_str(),
                report.title,
                report.content,
                tags,
                report.location.map(|l| l.latitude),
                report.location.map(|l| l.longitude),
                report.created_at,
                report.updated_at,
                report.status.as_str(),
                report.sync_version,
                remote_version,
            ],
        )?;

        Ok(())
    }

    fn get(&self, id: &ReportId) -> Result<Option<Report>> {
        let report = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?"),
                params![id.as_str()],
                Self::parse_report,
            )
            .optional()?;

        Ok(report)
    }

    fn get_all(&self) -> Result<Vec<Report>> {
        let mut stmt = self.conn.prepare(SELECT_COLUMNS)?;

        let reports = stmt
            .query_map([], Self::parse_report)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(reports)
    }

    fn get_by_status(&self, status: ReportStatus) -> Result<Vec<Report>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE status = ?"))?;

        let reports = stmt
            .query_map(params![status.as_str()], Self::parse_report)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(reports)
    }

    fn delete(&self, id: &ReportId) -> Result<()> {
        self.conn
            .execute("DELETE FROM reports WHERE id = ?", params![id.as_str()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn sample(title: &str) -> Report {
        let mut report = Report::new(title, format!("{title} body"));
        report.tags = vec!["field".into(), "field".into()];
        report
    }

    #[test]
    fn test_put_and_get_roundtrip() {
        let db = setup();
        let repo = SqliteReportRepository::new(db.connection());

        let mut report = sample("Bridge");
        report.location = Some(GeoLocation::new(47.6062, -122.3321).unwrap());
        report.sync_version = Some(4);
        repo.put(&report).unwrap();

        let fetched = repo.get(&report.id).unwrap().unwrap();
        assert_eq!(fetched, report);
    }

    #[test]
    fn test_put_and_get_roundtrip_with_remote_version() {
        let db = setup();
        let repo = SqliteReportRepository::new(db.connection());

        let mut report = sample("Levee");
        let mut remote = report.clone();
        remote.title = "Levee (Remote Edit)".into();
        remote.sync_version = Some(1);
        report.mark_conflict(remote);
        repo.put(&report).unwrap();

        let fetched = repo.get(&report.id).unwrap().unwrap();
        assert_eq!(fetched, report);
        assert!(fetched.is_consistent());
    }

    #[test]
    fn test_put_replaces_existing() {
        let db = setup();
        let repo = SqliteReportRepository::new(db.connection());

        let mut report = sample("Original");
        repo.put(&report).unwrap();
        report.title = "Replaced".into();
        report.status = ReportStatus::Synced;
        repo.put(&report).unwrap();
        repo.put(&report).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Replaced");
        assert_eq!(all[0].status, ReportStatus::Synced);
    }

    #[test]
    fn test_get_missing_is_none() {
        let db = setup();
        let repo = SqliteReportRepository::new(db.connection());

        assert!(repo.get(&ReportId::from("missing")).unwrap().is_none());
    }

    #[test]
    fn test_get_by_status() {
        let db = setup();
        let repo = SqliteReportRepository::new(db.connection());

        let offline = sample("offline");
        let mut synced = sample("synced");
        synced.status = ReportStatus::Synced;
        repo.put(&offline).unwrap();
        repo.put(&synced).unwrap();

        let found = repo.get_by_status(ReportStatus::Offline).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, offline.id);
        assert!(repo.get_by_status(ReportStatus::Conflict).unwrap().is_empty());
    }

    #[test]
    fn test_delete_is_idempotent_and_isolated() {
        let db = setup();
        let repo = SqliteReportRepository::new(db.connection());

        let keep = sample("keep");
        let drop_me = sample("drop");
        repo.put(&keep).unwrap();
        repo.put(&drop_me).unwrap();

        repo.delete(&drop_me.id).unwrap();
        repo.delete(&drop_me.id).unwrap();
        repo.delete(&ReportId::from("never-existed")).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all, vec![keep]);
    }

    #[test]
    fn test_corrupted_row_is_storage_unavailable() {
        let db = setup();
        let repo = SqliteReportRepository::new(db.connection());

        let report = sample("corrupt");
        repo.put(&report).unwrap();
        db.connection()
            .execute("UPDATE reports SET tags = 'not json'", [])
            .unwrap();

        let err = repo.get(&report.id).unwrap_err();
        assert!(err.is_storage_unavailable());
    }
}
