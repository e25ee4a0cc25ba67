use async_trait::async_trait;
use board_shared::types::{NewReport, Report, ReportStatus, TargetRef};

use crate::errors::RepositoryError;

/// Trait for interacting with the report queue.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert_report(&self, report: NewReport) -> Result<Report, RepositoryError>;

    /// Counts all reports, or only those with the given status.
    async fn count_reports(&self, status: Option<ReportStatus>) -> Result<u64, RepositoryError>;

    async fn count_pending_reports_for(&self, target: TargetRef) -> Result<u64, RepositoryError>;

    /// Most recent reports, newest first.
    async fn recent_reports(&self, limit: usize) -> Result<Vec<Report>, RepositoryError>;
}
