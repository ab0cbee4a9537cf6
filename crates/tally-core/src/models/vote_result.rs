//! Aggregated result mirror model

use serde::{Deserialize, Serialize};

/// Per-team tally copied from the backend's results endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    /// Team code (unique)
    pub team_id: String,
    /// Team display name
    pub team_name: String,
    /// Votes received
    pub vote_count: i64,
    /// Backend-computed share of all votes, copied verbatim
    pub percentage: f64,
    /// Grand total at sync time, stamped on every row
    pub total_votes: i64,
    /// When this row was written (Unix ms)
    pub last_updated: i64,
}
