//! Identifier generation for new reports.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::ReportId;

/// Supplies globally unique ids for new reports.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> ReportId;
}

/// UUID v7 ids (time-sortable)
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_id(&self) -> ReportId {
        ReportId::new()
    }
}

/// Predictable `<prefix>-<n>` ids, for scripted runs and tests.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> ReportId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ReportId::from(format!("{}-{n}", self.prefix))
    }
}
