//! Post text validation and the record sent to the PDS.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PostError;

/// Maximum post length, in Unicode scalar values.
pub const MAX_POST_CHARS: usize = 300;

/// Collection (and `$type`) of a Bluesky post record.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

/// Post text that is known to fit within [`MAX_POST_CHARS`].
///
/// Length is counted in `char`s, so a post of 300 emoji is accepted even
/// though it is far more than 300 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostText(String);

impl PostText {
    /// Validate post text.
    ///
    /// # Errors
    ///
    /// [`PostError::TooLong`] with the number of characters over the limit.
    pub fn new(text: impl Into<String>) -> Result<Self, PostError> {
        let text = text.into();
        let count = text.chars().count();
        if count > MAX_POST_CHARS {
            return Err(PostError::TooLong {
                excess: count - MAX_POST_CHARS,
            });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters left before the limit.
    pub fn remaining(&self) -> usize {
        MAX_POST_CHARS - self.0.chars().count()
    }
}

/// The `app.bsky.feed.post` record body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(rename = "$type")]
    record_type: &'static str,
    text: String,
    created_at: String,
}

impl PostRecord {
    /// Build a record stamped with `created_at` in RFC 3339 (UTC).
    pub fn new(text: &PostText, created_at: DateTime<Utc>) -> Self {
        Self {
            record_type: POST_COLLECTION,
            text: text.as_str().to_string(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// Confirmation of a created post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReceipt {
    /// AT URI of the new record.
    pub uri: String,
    /// Content identifier of the new record.
    pub cid: String,
}
