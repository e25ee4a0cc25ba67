use serde::Serialize;

use crate::types::Report;

/// Headline counters for the moderation dashboard.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOverview {
    pub total_posts: u64,
    pub total_comments: u64,
    pub total_reports: u64,
    pub pending_reports: u64,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub overview: PlatformOverview,
    /// Most recent reports, newest first.
    pub recent_reports: Vec<Report>,
}
