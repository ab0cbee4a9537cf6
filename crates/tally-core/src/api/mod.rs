//! Client for the external voting backend.
//!
//! Every call is bracketed by audit entries in the store: one `INFO` entry
//! before the request goes out and one `SUCCESS` or `ERROR` entry once the
//! outcome is known. All failure modes (network, HTTP status, body) collapse
//! into [`crate::Error::Backend`].

pub(crate) mod client;
mod transport;
mod types;

pub use client::{
    ApiConfig, VotingApiClient, DEFAULT_TIMEOUT, RESET_DEVICES_CONFIRMATION,
    RESET_VOTES_CONFIRMATION,
};
pub use transport::{HttpMethod, HttpTransport, Transport, TransportRequest, TransportResponse};
pub use types::{
    AdminVotesResponse, BackendVote, DeviceStats, HealthStatus, ResetResponse, ResultsResponse,
    SubmitVoteResponse, TeamResult, VoteStatus, VoteSubmission,
};
