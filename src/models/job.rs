use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    /// Plain identifier, no referential integrity at the store level.
    /// A job whose client is gone renders as "Unknown Client" and is
    /// excluded from income sums.
    pub client_id: String,
    pub scheduled_date: DateTime<Utc>,
    pub completed: bool,
    /// Present iff `completed` is true; set and cleared together.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    pub paid: bool,
    /// Present iff `paid` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
