// Request bodies and query strings accepted by the HTTP handlers
use board_shared::types::{Category, PostFilter, TargetKind, TargetRef, VoteKind};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(rename = "type")]
    pub kind: VoteKind,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub content: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub alias: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
    pub alias: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCommentRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub edit_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub target_id: Uuid,
    pub target_type: TargetKind,
    #[serde(default)]
    pub reason: String,
}

impl CreateReportRequest {
    pub fn target(&self) -> TargetRef {
        TargetRef {
            kind: self.target_type,
            id: self.target_id,
        }
    }
}

/// `?category=&search=` on the post feed. "All" and blank values mean no filter.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl TryFrom<ListPostsQuery> for PostFilter {
    type Error = ApiError;

    fn try_from(query: ListPostsQuery) -> Result<Self, Self::Error> {
        let category = match query.category.as_deref().map(str::trim) {
            None | Some("") | Some("All") => None,
            Some(label) => Some(
                label
                    .parse::<Category>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            ),
        };
        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(PostFilter { category, search })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_request_wire_names() {
        let request: VoteRequest =
            serde_json::from_str(r#"{"type":"downvote","userId":"abc"}"#).unwrap();
        assert_eq!(request.kind, VoteKind::Downvote);
        assert_eq!(request.user_id, "abc");

        let missing: VoteRequest = serde_json::from_str(r#"{"type":"upvote"}"#).unwrap();
        assert!(missing.user_id.is_empty());

        assert!(serde_json::from_str::<VoteRequest>(r#"{"type":"sideways","userId":"a"}"#).is_err());
    }

    #[test]
    fn test_list_query_to_filter() {
        let filter = PostFilter::try_from(ListPostsQuery {
            category: Some("All".into()),
            search: Some("  ".into()),
        })
        .unwrap();
        assert_eq!(filter, PostFilter::default());

        let filter = PostFilter::try_from(ListPostsQuery {
            category: Some("Work Stress".into()),
            search: Some(" boss ".into()),
        })
        .unwrap();
        assert_eq!(filter.category, Some(Category::WorkStress));
        assert_eq!(filter.search.as_deref(), Some("boss"));

        let err = PostFilter::try_from(ListPostsQuery {
            category: Some("Sports".into()),
            search: None,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_report_request_target() {
        let id = Uuid::new_v4();
        let request: CreateReportRequest = serde_json::from_str(&format!(
            r#"{{"targetId":"{id}","targetType":"Comment","reason":"spam"}}"#
        ))
        .unwrap();
        assert_eq!(request.target(), TargetRef::comment(id));
    }
}
