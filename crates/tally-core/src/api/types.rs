//! Wire types for the voting backend's JSON API.
//!
//! Fields are lenient: anything missing falls back to its default so a
//! backend that omits optional data still decodes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: Option<String>,
}

/// One team's line in `/api/results`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamResult {
    pub team_id: String,
    pub team_name: String,
    pub votes: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultsResponse {
    pub results: Vec<TeamResult>,
    pub total_votes: i64,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoteStatus {
    pub has_voted: bool,
    pub identifier: String,
}

/// Body of `POST /api/vote`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSubmission {
    pub user_team: String,
    pub voted_for: String,
    pub user_identifier: String,
}

/// A vote as the backend reports it; team fields carry display names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendVote {
    pub id: String,
    pub user_team: String,
    pub voted_for: String,
    pub timestamp: Option<String>,
    pub ip_address: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitVoteResponse {
    pub success: bool,
    pub message: Option<String>,
    pub vote: Option<BackendVote>,
    pub total_votes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminVotesResponse {
    pub votes: Vec<BackendVote>,
    pub total_votes: i64,
    pub unique_voters: i64,
}

/// Reply to either admin reset endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetResponse {
    pub success: bool,
    pub message: Option<String>,
    pub previous_voter_count: Option<i64>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceStats {
    pub total_unique_devices: i64,
    pub total_votes: i64,
    pub devices_with_votes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Set when the stats could not be fetched and this is a placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeviceStats {
    /// Zeroed stats carrying the reason they are empty
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
