//! Core data types for events, ideas, and attractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An outdoor event as exposed to MCP clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "events_id")]
    pub id: String,
    #[serde(rename = "events_name")]
    pub name: String,
    /// RFC 3339 start time.
    #[serde(rename = "events_date")]
    pub date: String,
    /// RFC 3339 end time.
    #[serde(rename = "events_date_end")]
    pub date_end: String,
    #[serde(rename = "events_deadline")]
    pub deadline: String,
    #[serde(rename = "events_place")]
    pub place: String,
    #[serde(rename = "events_lat")]
    pub lat: f64,
    #[serde(rename = "events_lng")]
    pub lng: f64,
    #[serde(rename = "events_meeting_point_name")]
    pub meeting_point_name: String,
    #[serde(rename = "events_meeting_point_lat")]
    pub meeting_point_lat: f64,
    #[serde(rename = "events_meeting_point_lng")]
    pub meeting_point_lng: f64,
    #[serde(rename = "events_participant_limit")]
    pub participant_limit: u32,
    /// Serialized as `0` or `1`.
    #[serde(rename = "events_payment_required", with = "int_flag")]
    pub payment_required: bool,
    #[serde(rename = "events_payment_fee")]
    pub payment_fee: f64,
    #[serde(rename = "events_photo")]
    pub photo: String,
    #[serde(rename = "events_type")]
    pub kind: String,
    #[serde(
        rename = "events_created_by_user",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_by: Option<UserSummary>,
    #[serde(
        rename = "events_participants",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub participants: Option<Participants>,
    #[serde(
        rename = "events_created_at",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

impl Event {
    /// Parsed start time.
    pub fn starts_at(&self) -> OosaResult<DateTime<Utc>> {
        parse_timestamp(&self.date)
    }

    /// Parsed end time.
    pub fn ends_at(&self) -> OosaResult<DateTime<Utc>> {
        parse_timestamp(&self.date_end)
    }
}

/// A user reference embedded in events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "user_id")]
    pub id: String,
    #[serde(rename = "user_name")]
    pub name: String,
    #[serde(rename = "user_email")]
    pub email: String,
    #[serde(rename = "user_avatar")]
    pub avatar: String,
}

/// Participant preview for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participants {
    #[serde(rename = "latest_tree_user")]
    pub latest_three: Vec<UserSummary>,
    #[serde(rename = "remain_number")]
    pub remaining: u32,
}

mod int_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(i64::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(i64::deserialize(deserializer)? != 0)
    }
}

/// A free-form activity idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A tourist attraction in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attraction {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub rating: f64,
    pub visit_hours: String,
    pub tickets: Tickets,
    #[serde(default)]
    pub images: Vec<String>,
    pub coordinates: Coordinates,
}

/// Ticket prices in TWD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tickets {
    pub adult: f64,
    pub child: f64,
    pub senior: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Errors from the OOSA domain layer.
#[derive(thiserror::Error, Debug)]
pub enum OosaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Attraction not found: {0}")]
    AttractionNotFound(String),
}

pub type OosaResult<T> = Result<T, OosaError>;

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> OosaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| OosaError::InvalidInput(format!("invalid timestamp '{value}': {e}")))
}
