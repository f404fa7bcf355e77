//! Song request data models and API request/response types.
//!
//! This module defines:
//! - `SongRequest`: Stored entity representing one queued song
//! - `CreateSongRequest`: Request body for submitting a song
//! - `NewSongRequest`: Fully populated document handed to the store for insertion

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience recorded when the client does not name one.
pub const DEFAULT_AUDIENCE: &str = "系統";

/// Format of the `key` field (`YYYY-MM-DD`).
pub const KEY_FORMAT: &str = "%Y-%m-%d";

/// Represents a song request record from the store.
///
/// # Database Table
///
/// Maps to the `song_requests` table. Each request:
/// - Is grouped by the day it was submitted (`key`)
/// - Only ever changes through the atomic toggle of `done`
///
/// # JSON Example
///
/// ```json
/// {
///   "_id": "550e8400-e29b-41d4-a716-446655440000",
///   "key": "2025-12-20",
///   "name": "Test Song",
///   "audience": "Alice",
///   "done": false,
///   "createdAt": "2025-12-20T10:00:00Z",
///   "updatedAt": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    /// Unique identifier assigned by the store
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Submission date (`YYYY-MM-DD`), used for grouping and not unique
    pub key: String,

    /// Song name as typed by the requester
    pub name: String,

    /// Who the song is for
    pub audience: String,

    /// Whether the operator has played the song
    pub done: bool,

    /// Timestamp when the request was submitted
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last toggle
    ///
    /// Never earlier than `created_at` and strictly increasing on each toggle.
    pub updated_at: DateTime<Utc>,
}

/// Request body for submitting a song.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Test Song",
///   "audience": "Alice"
/// }
/// ```
///
/// # Validation
///
/// - `name`: Required, must not be empty; stored exactly as sent
/// - `audience`: Optional, defaults to [`DEFAULT_AUDIENCE`] when omitted or empty
#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    /// Song name
    #[serde(default)]
    pub name: String,

    /// Optional audience
    #[serde(default)]
    pub audience: Option<String>,
}

impl CreateSongRequest {
    /// Audience to persist, falling back to the placeholder.
    pub fn audience_or_default(&self) -> String {
        match self.audience.as_deref() {
            Some(audience) if !audience.is_empty() => audience.to_string(),
            _ => DEFAULT_AUDIENCE.to_string(),
        }
    }
}

/// A validated song request ready for insertion.
///
/// The store assigns the identity; everything else is decided by the service.
#[derive(Debug, Clone)]
pub struct NewSongRequest {
    pub key: String,
    pub name: String,
    pub audience: String,
    pub created_at: DateTime<Utc>,
}

impl NewSongRequest {
    /// Build a new request submitted at `now`, keyed by the local `date`.
    pub fn new(name: String, audience: String, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            key: date.format(KEY_FORMAT).to_string(),
            name,
            audience,
            created_at: now,
        }
    }

    /// Materialise the stored document with the identity chosen by the store.
    pub fn into_song_request(self, id: Uuid) -> SongRequest {
        SongRequest {
            id,
            key: self.key,
            name: self.name,
            audience: self.audience,
            done: false,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Next `updated_at` for a toggle.
///
/// Uses the current time unless the clock has not moved past the previous
/// value, in which case it advances by one microsecond.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + chrono::Duration::microseconds(1);
    if now > floor { now } else { floor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_audience_falls_back_to_placeholder() {
        let body = CreateSongRequest {
            name: "Song".to_string(),
            audience: Some(String::new()),
        };
        assert_eq!(body.audience_or_default(), DEFAULT_AUDIENCE);

        let body = CreateSongRequest {
            name: "Song".to_string(),
            audience: None,
        };
        assert_eq!(body.audience_or_default(), DEFAULT_AUDIENCE);
    }

    #[test]
    fn audience_is_kept_verbatim() {
        let body = CreateSongRequest {
            name: "Song".to_string(),
            audience: Some(" Bob ".to_string()),
        };
        assert_eq!(body.audience_or_default(), " Bob ");

        let body = CreateSongRequest {
            name: "Song".to_string(),
            audience: Some("   ".to_string()),
        };
        assert_eq!(body.audience_or_default(), "   ");
    }

    #[test]
    fn new_request_starts_not_done_with_equal_timestamps() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 23, 30, 0).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let request = NewSongRequest::new("Song".into(), "Bob".into(), date, now)
            .into_song_request(Uuid::new_v4());

        assert_eq!(request.key, "2025-03-10");
        assert!(!request.done);
        assert_eq!(request.created_at, request.updated_at);
    }

    #[test]
    fn updated_at_is_strictly_increasing() {
        let previous = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        assert!(next_updated_at(previous, previous) > previous);
        assert!(next_updated_at(previous, previous - chrono::Duration::seconds(5)) > previous);

        let later = previous + chrono::Duration::seconds(1);
        assert_eq!(next_updated_at(previous, later), later);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let request = NewSongRequest::new(
            "Song".into(),
            "Bob".into(),
            now.date_naive(),
            now,
        )
        .into_song_request(Uuid::nil());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["_id"], Uuid::nil().to_string());
        assert_eq!(json["done"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
