use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Local mirror of an identity managed by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One persisted analysis result. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub user_id: String,
    pub player_number: Option<String>,
    pub team: Option<String>,
    pub jersey_color: Option<String>,
    pub analysis_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload. `id` is always generated by the store; `created_at`
/// falls back to the database default when omitted.
///
/// `user_id` is optional here only so a missing owner reaches the engine and
/// is rejected there as a not-null violation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAnalysis {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub player_number: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub jersey_color: Option<String>,
    #[serde(default)]
    pub analysis_text: Option<String>,
    /// Stored with millisecond precision; set it through
    /// [`NewAnalysis::created_at`] to get the value the store will return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewAnalysis {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Sets an explicit creation time, truncated to the stored precision.
    #[must_use]
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(at));
        self
    }
}
