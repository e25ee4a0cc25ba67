use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::types::{ReportId, TargetKind, TargetRef};

/// Moderation state of a report.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Reviewed,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Resolved => "resolved",
        }
    }
}

/// An abuse report filed against a post or comment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub target_id: Uuid,
    pub target_type: TargetKind,
    pub reason: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn target(&self) -> TargetRef {
        TargetRef {
            kind: self.target_type,
            id: self.target_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewReport {
    pub target: TargetRef,
    pub reason: String,
}
