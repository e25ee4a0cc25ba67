//! Ownership guard: mints and checks the bearer token that lets an anonymous
//! author edit their own comment.
//!
//! There is no account behind a token. If the author loses it, the comment
//! can no longer be edited.
use board_shared::types::{EditToken, OwnedContent};
use rand::{RngCore, rngs::OsRng};
use subtle::ConstantTimeEq;

use crate::errors::OwnershipError;

const TOKEN_BYTES: usize = EditToken::LENGTH / 2;

#[derive(Clone, Copy, Debug, Default)]
pub struct OwnershipGuard;

impl OwnershipGuard {
    pub fn new() -> Self {
        Self
    }

    /// Returns a fresh 128-bit token rendered as 32 lowercase hex characters.
    pub fn issue_token(&self) -> EditToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        EditToken::from_issued(hex::encode(bytes))
    }

    /// Checks `supplied` against the token stored with the content.
    ///
    /// Denies when nothing is stored, when either side is empty, or when the
    /// values differ. The comparison does not short-circuit on content.
    pub fn authorize(&self, stored: Option<&EditToken>, supplied: &str) -> Result<(), OwnershipError> {
        let Some(stored) = stored else {
            return Err(OwnershipError::Unauthorized);
        };
        if stored.is_empty() || supplied.is_empty() {
            return Err(OwnershipError::Unauthorized);
        }

        if bool::from(stored.as_str().as_bytes().ct_eq(supplied.as_bytes())) {
            Ok(())
        } else {
            Err(OwnershipError::Unauthorized)
        }
    }

    /// Returns `content` with its text replaced, if `supplied` proves ownership.
    ///
    /// Token, counters, alias and timestamps are carried over untouched. On
    /// failure nothing is produced and the caller must not write anything.
    pub fn apply_edit(
        &self,
        content: &OwnedContent,
        new_text: &str,
        supplied: &str,
    ) -> Result<OwnedContent, OwnershipError> {
        self.authorize(content.edit_token.as_ref(), supplied)?;

        let mut updated = content.clone();
        updated.content = new_text.to_string();
        Ok(updated)
    }
}
