//! Daily standups and project-level status reports

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateKind {
    Daily,
    Project,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamUpdate {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    pub project_id: String,
    #[serde(default)]
    pub project_name: Option<String>,
    pub author_id: String,
    #[serde(default)]
    pub author_name: Option<String>,
    pub content: String,
    #[serde(default)]
    pub blockers: Option<String>,
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamUpdate {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    pub project_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockers: Option<String>,
}
