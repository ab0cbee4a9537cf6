//! Keeps the local mirrors in step with the voting backend and wraps the
//! backend's admin operations with audit entries.

use chrono::DateTime;
use serde::Serialize;
use serde_json::json;

use crate::api::{
    BackendVote, DeviceStats, HealthStatus, HttpTransport, SubmitVoteResponse, TeamResult,
    Transport, VoteStatus, VoteSubmission, VotingApiClient, RESET_DEVICES_CONFIRMATION,
    RESET_VOTES_CONFIRMATION,
};
use crate::models::{team_code_for_name, ActionType, Actor, LogLevel, NewLogEntry, Vote, VoteResult};
use crate::services::Store;
use crate::util::now_millis;
use crate::{Error, Result};

/// Headline numbers for the dashboard, live or from the local mirrors
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_votes: i64,
    pub unique_voters: i64,
    pub results: Vec<TeamResult>,
    pub votes: Vec<VoteSummary>,
    /// Unix ms
    pub last_updated: Option<i64>,
    pub backend_connected: bool,
}

/// One vote as the dashboard shows it, whichever side it came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteSummary {
    pub vote_id: String,
    pub voter_name: Option<String>,
    pub team_display_name: String,
    pub voted_for_display_name: String,
    /// Unix ms; `None` when the backend sent no usable timestamp
    pub timestamp: Option<i64>,
    pub ip_address: Option<String>,
}

impl VoteSummary {
    fn from_backend(vote: &BackendVote) -> Self {
        Self {
            vote_id: vote.id.clone(),
            voter_name: vote.name.clone(),
            team_display_name: vote.user_team.clone(),
            voted_for_display_name: vote.voted_for.clone(),
            timestamp: vote.timestamp.as_deref().and_then(parse_timestamp),
            ip_address: vote.ip_address.clone(),
        }
    }

    fn from_mirror(vote: &Vote) -> Self {
        Self {
            vote_id: vote.vote_id.clone(),
            voter_name: vote.voter_name.clone(),
            team_display_name: vote.team_display_name(),
            voted_for_display_name: vote.voted_for_display_name(),
            timestamp: Some(vote.timestamp),
            ip_address: vote.ip_address.clone(),
        }
    }
}

/// Map a backend vote into a mirror row stamped at `now` (Unix ms).
pub fn vote_from_backend(vote: &BackendVote, now: i64) -> Vote {
    let prefix: String = vote.id.chars().take(8).collect();
    Vote {
        vote_id: vote.id.clone(),
        user_team: team_code_for_name(&vote.user_team),
        voted_for: team_code_for_name(&vote.voted_for),
        timestamp: vote
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(now),
        ip_address: vote.ip_address.clone(),
        user_identifier: format!("backend-{prefix}"),
        voter_name: vote.name.clone(),
        synced_with_backend: true,
        created_at: now,
        updated_at: now,
    }
}

fn parse_timestamp(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.timestamp_millis())
}

fn result_from_backend(result: &TeamResult, total_votes: i64, now: i64) -> VoteResult {
    VoteResult {
        team_id: result.team_id.clone(),
        team_name: result.team_name.clone(),
        vote_count: result.votes,
        percentage: result.percentage,
        total_votes,
        last_updated: now,
    }
}

fn team_result_from_mirror(result: &VoteResult) -> TeamResult {
    TeamResult {
        team_id: result.team_id.clone(),
        team_name: result.team_name.clone(),
        votes: result.vote_count,
        percentage: result.percentage,
    }
}

/// Sync and admin operations over a backend client and the local store
pub struct SyncService<T = HttpTransport> {
    api: VotingApiClient<T>,
    store: Store,
}

impl<T: Transport> SyncService<T> {
    pub const fn new(api: VotingApiClient<T>, store: Store) -> Self {
        Self { api, store }
    }

    pub const fn store(&self) -> &Store {
        &self.store
    }

    pub const fn api(&self) -> &VotingApiClient<T> {
        &self.api
    }

    /// Replace the vote mirror with the backend's current votes.
    pub async fn sync_votes(&self, actor: &Actor) -> Result<usize> {
        let outcome = self.try_sync_votes(actor).await;
        match &outcome {
            Ok((synced, total_backend)) => {
                let message = format!("Successfully synced {synced} votes from backend");
                tracing::info!("{message}");
                self.audit(
                    NewLogEntry::new(LogLevel::Success, ActionType::VoteSync, message).with_details(
                        json!({ "synced_count": synced, "total_backend_votes": total_backend }),
                    ),
                    actor,
                )
                .await;
            }
            Err(error) => {
                self.failure(
                    ActionType::VoteSync,
                    "Failed to sync votes from backend",
                    error,
                    actor,
                    None,
                )
                .await;
            }
        }
        outcome.map(|(synced, _)| synced)
    }

    async fn try_sync_votes(&self, actor: &Actor) -> Result<(usize, i64)> {
        let response = self.api.get_all_votes(actor).await?;
        let now = now_millis();
        let votes: Vec<Vote> = response
            .votes
            .iter()
            .map(|vote| vote_from_backend(vote, now))
            .collect();
        let synced = self.store.replace_votes(&votes).await?;
        Ok((synced, response.total_votes))
    }

    /// Replace the result mirror with the backend's current tallies.
    pub async fn sync_results(&self, actor: &Actor) -> Result<usize> {
        let outcome = self.try_sync_results(actor).await;
        match &outcome {
            Ok((synced, total_votes)) => {
                let message = format!("Successfully synced results for {synced} teams");
                tracing::info!("{message}");
                self.audit(
                    NewLogEntry::new(LogLevel::Success, ActionType::ResultsSync, message)
                        .with_details(json!({
                            "synced_count": synced,
                            "total_votes": total_votes,
                        })),
                    actor,
                )
                .await;
            }
            Err(error) => {
                self.failure(
                    ActionType::ResultsSync,
                    "Failed to sync results from backend",
                    error,
                    actor,
                    None,
                )
                .await;
            }
        }
        outcome.map(|(synced, _)| synced)
    }

    async fn try_sync_results(&self, actor: &Actor) -> Result<(usize, i64)> {
        let response = self.api.get_results(actor).await?;
        let now = now_millis();
        let results: Vec<VoteResult> = response
            .results
            .iter()
            .map(|result| result_from_backend(result, response.total_votes, now))
            .collect();
        let synced = self.store.replace_results(&results).await?;
        Ok((synced, response.total_votes))
    }

    /// Live statistics, falling back to the mirrors when the backend is unreachable.
    ///
    /// Only local storage failures are returned as errors.
    pub async fn dashboard_stats(&self, actor: &Actor) -> Result<DashboardStats> {
        match self.live_stats(actor).await {
            Ok(stats) => {
                self.audit(
                    NewLogEntry::new(
                        LogLevel::Success,
                        ActionType::ResultsSync,
                        "Retrieved live dashboard statistics",
                    )
                    .with_details(json!({
                        "total_votes": stats.total_votes,
                        "unique_voters": stats.unique_voters,
                    })),
                    actor,
                )
                .await;
                Ok(stats)
            }
            Err(error) => {
                tracing::warn!("Backend unavailable, using local data: {error}");
                self.audit(
                    NewLogEntry::new(
                        LogLevel::Error,
                        ActionType::ResultsSync,
                        format!("Failed to get dashboard stats, using local data: {error}"),
                    )
                    .with_details(json!({ "error": error.to_string() })),
                    actor,
                )
                .await;
                self.local_stats().await
            }
        }
    }

    async fn live_stats(&self, actor: &Actor) -> Result<DashboardStats> {
        let results = self.api.get_results(actor).await?;
        let votes = self.api.get_all_votes(actor).await?;

        Ok(DashboardStats {
            total_votes: results.total_votes,
            unique_voters: votes.unique_voters,
            votes: votes.votes.iter().map(VoteSummary::from_backend).collect(),
            results: results.results,
            last_updated: Some(now_millis()),
            backend_connected: true,
        })
    }

    async fn local_stats(&self) -> Result<DashboardStats> {
        let results = self.store.list_results().await?;
        let votes = self.store.all_votes().await?;
        let unique_voters = self.store.count_distinct_voters().await?;
        let first = results.first();

        Ok(DashboardStats {
            total_votes: first.map_or(0, |result| result.total_votes),
            unique_voters: i64::try_from(unique_voters).unwrap_or(i64::MAX),
            results: results.iter().map(team_result_from_mirror).collect(),
            votes: votes.iter().map(VoteSummary::from_mirror).collect(),
            last_updated: first.map(|result| result.last_updated),
            backend_connected: false,
        })
    }

    /// Wipe all backend votes, then both local mirrors.
    ///
    /// The mirrors are only cleared once the backend confirmed the reset.
    pub async fn reset_all_data(&self, actor: &Actor) -> Result<()> {
        let outcome = self.try_reset_all_data(actor).await;
        match &outcome {
            Ok(()) => {
                tracing::info!("All voting data has been reset");
                self.audit(
                    NewLogEntry::new(
                        LogLevel::Success,
                        ActionType::AdminAction,
                        "All voting data has been reset",
                    )
                    .with_details(json!({ "action": "reset_all_data" })),
                    actor,
                )
                .await;
            }
            Err(error) => {
                self.failure(
                    ActionType::AdminAction,
                    "Failed to reset voting data",
                    error,
                    actor,
                    Some("reset_all_data"),
                )
                .await;
            }
        }
        outcome
    }

    async fn try_reset_all_data(&self, actor: &Actor) -> Result<()> {
        self.api.reset_votes(RESET_VOTES_CONFIRMATION, actor).await?;
        self.store.clear_mirrors().await
    }

    /// Let every device vote again. Returns how many voters the backend forgot.
    pub async fn reset_device_ids(&self, actor: &Actor) -> Result<i64> {
        match self.api.reset_devices(RESET_DEVICES_CONFIRMATION, actor).await {
            Ok(response) => {
                let previous = response.previous_voter_count.unwrap_or(0);
                let message = format!(
                    "All device IDs have been reset. {previous} users can now vote again."
                );
                tracing::info!("{message}");
                self.audit(
                    NewLogEntry::new(LogLevel::Success, ActionType::AdminAction, message)
                        .with_details(json!({
                            "action": "reset_device_ids",
                            "response": response,
                            "previous_voter_count": previous,
                        })),
                    actor,
                )
                .await;
                Ok(previous)
            }
            Err(error) => {
                self.failure(
                    ActionType::AdminAction,
                    "Failed to reset device IDs",
                    &error,
                    actor,
                    Some("reset_device_ids"),
                )
                .await;
                Err(error)
            }
        }
    }

    /// Backend device statistics; failures yield zeroed stats with `error` set.
    pub async fn device_statistics(&self, actor: &Actor) -> DeviceStats {
        match self.api.get_device_stats(actor).await {
            Ok(stats) => {
                self.audit(
                    NewLogEntry::new(
                        LogLevel::Success,
                        ActionType::AdminAction,
                        "Retrieved device statistics",
                    )
                    .with_details(json!({
                        "total_unique_devices": stats.total_unique_devices,
                        "total_votes": stats.total_votes,
                    })),
                    actor,
                )
                .await;
                stats
            }
            Err(error) => {
                self.failure(
                    ActionType::AdminAction,
                    "Failed to get device statistics",
                    &error,
                    actor,
                    Some("get_device_statistics"),
                )
                .await;
                DeviceStats::unavailable(error.to_string())
            }
        }
    }

    pub async fn health_check(&self, actor: &Actor) -> Result<HealthStatus> {
        self.api.health_check(actor).await
    }

    pub async fn vote_status(&self, identifier: &str, actor: &Actor) -> Result<VoteStatus> {
        self.api.get_vote_status(identifier, actor).await
    }

    pub async fn submit_vote(
        &self,
        submission: &VoteSubmission,
        actor: &Actor,
    ) -> Result<SubmitVoteResponse> {
        self.api.submit_vote(submission, actor).await
    }

    async fn audit(&self, entry: NewLogEntry, actor: &Actor) {
        self.store.record(entry.with_actor(actor)).await;
    }

    /// Record a terminal ERROR entry; `operation` tags admin actions in the details.
    async fn failure(
        &self,
        action: ActionType,
        context: &str,
        error: &Error,
        actor: &Actor,
        operation: Option<&str>,
    ) {
        let message = format!("{context}: {error}");
        tracing::error!("{message}");
        let mut details = json!({ "error": error.to_string() });
        if let Some(operation) = operation {
            details["action"] = json!(operation);
        }
        self.audit(
            NewLogEntry::new(LogLevel::Error, action, message).with_details(details),
            actor,
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::{client_with, logs_oldest_first, FakeTransport};
    use crate::db::VoteFilter;
    use crate::models::SystemLogEntry;
    use pretty_assertions::assert_eq;

    async fn service_with(transport: FakeTransport) -> SyncService<FakeTransport> {
        let (client, store) = client_with(transport).await;
        SyncService::new(client, store)
    }

    fn terminal(logs: &[SystemLogEntry], action: ActionType) -> Vec<&SystemLogEntry> {
        logs.iter().filter(|entry| entry.action_type == action).collect()
    }

    fn backend_votes() -> serde_json::Value {
        json!({
            "votes": [
                {
                    "id": "0123456789abcdef",
                    "userTeam": "Team 01",
                    "votedFor": "Team 02",
                    "timestamp": "2024-05-01T10:00:00Z",
                    "ipAddress": "10.0.0.1",
                    "name": "Ada"
                },
                {
                    "id": "fedcba98",
                    "userTeam": "Team 03",
                    "votedFor": "Team 04",
                    "timestamp": "not a date"
                }
            ],
            "totalVotes": 2,
            "uniqueVoters": 2
        })
    }

    fn backend_results() -> serde_json::Value {
        json!({
            "results": [
                { "teamId": "team-b", "teamName": "Team 02", "votes": 3, "percentage": 75 },
                { "teamId": "team-a", "teamName": "Team 01", "votes": 1, "percentage": 25 }
            ],
            "totalVotes": 4,
            "timestamp": "2024-05-01T10:00:00Z"
        })
    }

    #[test]
    fn backend_vote_maps_to_mirror_row() {
        let vote: BackendVote =
            serde_json::from_value(backend_votes()["votes"][0].clone()).unwrap();
        let row = vote_from_backend(&vote, 42);

        assert_eq!(row.vote_id, "0123456789abcdef");
        assert_eq!(row.user_team, "team-a");
        assert_eq!(row.voted_for, "team-b");
        assert_eq!(row.timestamp, 1_714_557_600_000);
        assert_eq!(row.user_identifier, "backend-01234567");
        assert_eq!(row.voter_name.as_deref(), Some("Ada"));
        assert!(row.synced_with_backend);
        assert_eq!(row.created_at, 42);
    }

    #[test]
    fn unparseable_timestamp_defaults_to_now() {
        let vote: BackendVote =
            serde_json::from_value(backend_votes()["votes"][1].clone()).unwrap();
        let row = vote_from_backend(&vote, 42);
        assert_eq!(row.timestamp, 42);
        assert_eq!(row.user_identifier, "backend-fedcba98");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sync_votes_mirrors_backend_and_logs_once() {
        let transport = FakeTransport::default();
        transport.reply("/api/admin/votes", 200, backend_votes());
        let service = service_with(transport).await;

        let synced = service.sync_votes(&Actor::system()).await.unwrap();
        assert_eq!(synced, 2);

        let store = service.store();
        let mut ids: Vec<String> = store
            .all_votes()
            .await
            .unwrap()
            .into_iter()
            .map(|vote| vote.vote_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["0123456789abcdef".to_string(), "fedcba98".to_string()]);

        let logs = logs_oldest_first(store).await;
        let sync_logs = terminal(&logs, ActionType::VoteSync);
        assert_eq!(sync_logs.len(), 1);
        assert_eq!(sync_logs[0].level, LogLevel::Success);
        assert_eq!(sync_logs[0].message, "Successfully synced 2 votes from backend");
        assert_eq!(
            sync_logs[0].details,
            Some(json!({ "synced_count": 2, "total_backend_votes": 2 }))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_vote_sync_keeps_existing_rows() {
        let transport = FakeTransport::default();
        transport.reply("/api/admin/votes", 200, backend_votes());
        transport.reply("/api/admin/votes", 500, json!({ "error": "boom" }));
        let service = service_with(transport).await;

        service.sync_votes(&Actor::system()).await.unwrap();
        let err = service.sync_votes(&Actor::system()).await.unwrap_err();
        assert!(err.is_backend());
        assert_eq!(
            service.store().count_votes(&VoteFilter::default()).await.unwrap(),
            2
        );

        let logs = logs_oldest_first(service.store()).await;
        let sync_logs = terminal(&logs, ActionType::VoteSync);
        assert_eq!(sync_logs.len(), 2);
        assert_eq!(sync_logs[1].level, LogLevel::Error);
        assert!(sync_logs[1]
            .message
            .starts_with("Failed to sync votes from backend: API request failed"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sync_results_stamps_grand_total() {
        let transport = FakeTransport::default();
        transport.reply("/api/results", 200, backend_results());
        let service = service_with(transport).await;

        assert_eq!(service.sync_results(&Actor::system()).await.unwrap(), 2);

        let results = service.store().list_results().await.unwrap();
        assert_eq!(results[0].team_id, "team-b");
        assert!(results.iter().all(|result| result.total_votes == 4));
        assert!((results[0].percentage - 75.0).abs() < f64::EPSILON);

        let logs = logs_oldest_first(service.store()).await;
        let sync_logs = terminal(&logs, ActionType::ResultsSync);
        assert_eq!(sync_logs.len(), 1);
        assert_eq!(sync_logs[0].message, "Successfully synced results for 2 teams");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dashboard_stats_live_when_both_calls_succeed() {
        let transport = FakeTransport::default();
        transport.reply("/api/results", 200, backend_results());
        transport.reply("/api/admin/votes", 200, backend_votes());
        let service = service_with(transport.clone()).await;

        let stats = service.dashboard_stats(&Actor::system()).await.unwrap();
        assert!(stats.backend_connected);
        assert_eq!(stats.total_votes, 4);
        assert_eq!(stats.unique_voters, 2);
        assert_eq!(stats.votes.len(), 2);
        assert_eq!(stats.votes[0].team_display_name, "Team 01");
        assert_eq!(stats.votes[1].timestamp, None);

        let paths: Vec<String> = transport.sent().into_iter().map(|request| request.url).collect();
        assert_eq!(
            paths,
            vec![
                "http://backend.test/api/results".to_string(),
                "http://backend.test/api/admin/votes".to_string(),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dashboard_stats_fall_back_to_mirrors() {
        let transport = FakeTransport::default();
        transport.reply("/api/results", 200, backend_results());
        transport.reply("/api/admin/votes", 200, backend_votes());
        // Second round: results succeed, votes fail.
        transport.reply("/api/results", 200, backend_results());
        let service = service_with(transport).await;

        service.sync_results(&Actor::system()).await.unwrap();
        service.sync_votes(&Actor::system()).await.unwrap();

        let stats = service.dashboard_stats(&Actor::system()).await.unwrap();
        assert!(!stats.backend_connected);
        assert_eq!(stats.total_votes, 4);
        assert_eq!(stats.unique_voters, 2);
        assert_eq!(stats.results.len(), 2);
        assert_eq!(stats.votes.len(), 2);
        assert!(stats.last_updated.is_some());

        let logs = logs_oldest_first(service.store()).await;
        let last = logs
            .iter()
            .rev()
            .find(|entry| entry.action_type == ActionType::ResultsSync)
            .unwrap();
        assert_eq!(last.level, LogLevel::Error);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dashboard_stats_with_empty_mirrors() {
        let service = service_with(FakeTransport::default()).await;

        let stats = service.dashboard_stats(&Actor::system()).await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                backend_connected: false,
                ..DashboardStats::default()
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reset_all_data_failure_leaves_mirrors() {
        let transport = FakeTransport::default();
        transport.reply("/api/admin/votes", 200, backend_votes());
        transport.reply("/api/admin/reset", 403, json!({ "error": "forbidden" }));
        let service = service_with(transport.clone()).await;
        service.sync_votes(&Actor::system()).await.unwrap();

        let err = service.reset_all_data(&Actor::system()).await.unwrap_err();
        assert!(err.is_backend());
        assert_eq!(service.store().all_votes().await.unwrap().len(), 2);

        let logs = logs_oldest_first(service.store()).await;
        let admin = terminal(&logs, ActionType::AdminAction);
        assert_eq!(admin.len(), 1);
        assert!(admin[0].message.starts_with("Failed to reset voting data: "));
        assert_eq!(admin[0].details.as_ref().unwrap()["action"], "reset_all_data");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reset_all_data_clears_mirrors() {
        let transport = FakeTransport::default();
        transport.reply("/api/admin/votes", 200, backend_votes());
        transport.reply("/api/results", 200, backend_results());
        transport.reply("/api/admin/reset", 200, json!({ "success": true }));
        let service = service_with(transport.clone()).await;
        service.sync_votes(&Actor::system()).await.unwrap();
        service.sync_results(&Actor::system()).await.unwrap();

        service.reset_all_data(&Actor::new("admin", None)).await.unwrap();
        assert!(service.store().all_votes().await.unwrap().is_empty());
        assert!(service.store().list_results().await.unwrap().is_empty());

        let reset = transport
            .sent()
            .into_iter()
            .find(|request| request.url.ends_with("/api/admin/reset"))
            .unwrap();
        assert_eq!(reset.body, Some(json!({ "confirm": "RESET_ALL_VOTES" })));

        let logs = logs_oldest_first(service.store()).await;
        let admin = terminal(&logs, ActionType::AdminAction);
        assert_eq!(admin[0].message, "All voting data has been reset");
        assert_eq!(admin[0].details, Some(json!({ "action": "reset_all_data" })));
        assert_eq!(admin[0].user.as_deref(), Some("admin"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reset_device_ids_reports_previous_count() {
        let transport = FakeTransport::default();
        transport.reply(
            "/api/admin/reset-devices",
            200,
            json!({ "success": true, "previousVoterCount": 7 }),
        );
        let service = service_with(transport).await;

        assert_eq!(service.reset_device_ids(&Actor::system()).await.unwrap(), 7);

        let logs = logs_oldest_first(service.store()).await;
        let admin = terminal(&logs, ActionType::AdminAction);
        assert_eq!(
            admin[0].message,
            "All device IDs have been reset. 7 users can now vote again."
        );
        let details = admin[0].details.as_ref().unwrap();
        assert_eq!(details["action"], "reset_device_ids");
        assert_eq!(details["response"]["previousVoterCount"], 7);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reset_device_ids_keeps_mirrors() {
        let transport = FakeTransport::default();
        transport.reply("/api/admin/votes", 200, backend_votes());
        transport.reply("/api/results", 200, backend_results());
        transport.reply(
            "/api/admin/reset-devices",
            200,
            json!({ "success": true, "previousVoterCount": 2 }),
        );
        let service = service_with(transport).await;
        service.sync_votes(&Actor::system()).await.unwrap();
        service.sync_results(&Actor::system()).await.unwrap();
        let votes_before = service.store().all_votes().await.unwrap();
        let results_before = service.store().list_results().await.unwrap();

        service.reset_device_ids(&Actor::system()).await.unwrap();

        assert_eq!(votes_before.len(), 2);
        assert_eq!(results_before.len(), 2);
        assert_eq!(service.store().all_votes().await.unwrap(), votes_before);
        assert_eq!(service.store().list_results().await.unwrap(), results_before);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_device_reset_is_tagged() {
        let service = service_with(FakeTransport::default()).await;

        let err = service.reset_device_ids(&Actor::system()).await.unwrap_err();
        assert!(err.is_backend());

        let logs = logs_oldest_first(service.store()).await;
        let admin = terminal(&logs, ActionType::AdminAction);
        assert_eq!(admin.len(), 1);
        assert!(admin[0].message.starts_with("Failed to reset device IDs: "));
        assert_eq!(admin[0].details.as_ref().unwrap()["action"], "reset_device_ids");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn device_statistics_degrade_to_zeroes() {
        let service = service_with(FakeTransport::default()).await;

        let stats = service.device_statistics(&Actor::system()).await;
        assert_eq!(stats.total_unique_devices, 0);
        assert!(stats.devices_with_votes.is_empty());
        assert!(stats.error.unwrap().contains("connection refused"));

        let logs = logs_oldest_first(service.store()).await;
        let admin = terminal(&logs, ActionType::AdminAction);
        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0].level, LogLevel::Error);
    }
}
