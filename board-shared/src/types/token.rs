use std::fmt;

use serde::{Deserialize, Serialize};

/// Secret issued once when a comment is created.
///
/// Whoever holds it may edit the comment. It is stored alongside the content,
/// returned in the creation response only, and never regenerated.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditToken(String);

impl EditToken {
    /// Number of hex characters in a freshly issued token (128 bits).
    pub const LENGTH: usize = 32;

    /// Wraps a token that was issued earlier, e.g. when reading it back from storage.
    pub fn from_issued(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for EditToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EditToken(<redacted>)")
    }
}
