//! Data models for SignalDrop

mod draft;
mod report;

pub use draft::{ReportDraft, ReportPatch};
pub use report::{parse_tags, sort_by_recent, GeoLocation, Report, ReportId, ReportStatus};
