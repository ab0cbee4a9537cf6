//! Vote mirror model

use serde::{Deserialize, Serialize};

use super::Team;

/// A locally mirrored vote, as last fetched from the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Backend-issued identifier (unique)
    pub vote_id: String,
    /// Code of the voter's own team
    pub user_team: String,
    /// Code of the team voted for
    pub voted_for: String,
    /// When the vote was cast (Unix ms)
    pub timestamp: i64,
    /// Source address the backend recorded, if any
    pub ip_address: Option<String>,
    /// Free-text voter identifier
    pub user_identifier: String,
    /// Voter's self-reported name, if the backend exposes one
    pub voter_name: Option<String>,
    /// Whether this row came from a backend sync
    pub synced_with_backend: bool,
    /// Row creation timestamp (Unix ms)
    pub created_at: i64,
    /// Row update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Vote {
    /// Display name of the voter's own team
    pub fn team_display_name(&self) -> String {
        Team::display_name_for_code(&self.user_team)
    }

    /// Display name of the team voted for
    pub fn voted_for_display_name(&self) -> String {
        Team::display_name_for_code(&self.voted_for)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_follow_team_codes() {
        let vote = Vote {
            vote_id: "v1".to_string(),
            user_team: "team-a".to_string(),
            voted_for: "mystery-team".to_string(),
            timestamp: 0,
            ip_address: None,
            user_identifier: "backend-v1".to_string(),
            voter_name: None,
            synced_with_backend: true,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(vote.team_display_name(), "Team 01");
        assert_eq!(vote.voted_for_display_name(), "mystery-team");
    }
}
