//! Services layer: the report store and the report workflow built on it.

mod ids;
mod reports;
mod store;

pub use ids::{IdGenerator, SequentialIds, UuidV7Generator};
pub use reports::{sample_reports, ReportService, StatusCounts};
pub use store::{ReportStore, StoreLocation};
