//! View contexts for the page routes.
//!
//! Everything here is pure: handlers gather data from the store and the
//! sync service, then shape it with these helpers.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde_json::Value;
use tally_core::api::TeamResult;
use tally_core::models::ActionType;
use tally_core::services::{DashboardStats, VoteSummary};
use tally_core::{LogLevel, SystemLogEntry, Team, Vote, VoteResult};

pub const VOTES_PER_PAGE: usize = 25;
pub const LOGS_PER_PAGE: usize = 50;
pub const RECENT_LIMIT: usize = 10;

const ANONYMOUS_VOTER: &str = "Anonymous";

/// Position within a paginated listing. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub num_pages: usize,
    pub per_page: usize,
    pub total: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pagination {
    /// Clamp a requested page into range. Non-numeric or zero pages become
    /// the first page; pages past the end become the last one.
    pub fn new(total: usize, per_page: usize, requested: Option<&str>) -> Self {
        let per_page = per_page.max(1);
        let num_pages = total.div_ceil(per_page).max(1);
        let page = requested
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|page| *page >= 1)
            .map_or(1, |page| page.min(num_pages));

        Self {
            page,
            num_pages,
            per_page,
            total,
            has_previous: page > 1,
            has_next: page < num_pages,
        }
    }

    pub const fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }
}

/// A voter's votes folded into one dashboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoterActivity {
    pub name: String,
    pub team_display_name: String,
    /// Every team this voter voted for, sorted and joined with `", "`
    pub voted_for_display_name: String,
    pub timestamp: Option<i64>,
    pub ip_address: Option<String>,
}

impl VoterActivity {
    pub fn is_anonymous(&self) -> bool {
        self.name == ANONYMOUS_VOTER
    }
}

/// Group votes by voter name and keep the `limit` most recently active voters.
pub fn recent_voters(votes: &[VoteSummary], limit: usize) -> Vec<VoterActivity> {
    struct Accumulator {
        name: String,
        team_display_name: String,
        voted_for: BTreeSet<String>,
        timestamp: Option<i64>,
        ip_address: Option<String>,
    }

    let mut order: Vec<Accumulator> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for vote in votes {
        let name = vote
            .voter_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS_VOTER)
            .to_string();

        let slot = *index.entry(name.clone()).or_insert_with(|| {
            order.push(Accumulator {
                name,
                team_display_name: vote.team_display_name.clone(),
                voted_for: BTreeSet::new(),
                timestamp: vote.timestamp,
                ip_address: vote.ip_address.clone(),
            });
            order.len() - 1
        });
        let entry = &mut order[slot];

        if !vote.voted_for_display_name.is_empty() {
            entry.voted_for.insert(vote.voted_for_display_name.clone());
        }
        if entry.team_display_name.is_empty() && !vote.team_display_name.is_empty() {
            entry.team_display_name.clone_from(&vote.team_display_name);
        }
        if let Some(timestamp) = vote.timestamp {
            if entry.timestamp.is_none_or(|latest| timestamp > latest) {
                entry.timestamp = Some(timestamp);
                entry.ip_address.clone_from(&vote.ip_address);
            }
        }
    }

    let mut voters: Vec<VoterActivity> = order
        .into_iter()
        .map(|entry| VoterActivity {
            name: entry.name,
            team_display_name: entry.team_display_name,
            voted_for_display_name: entry.voted_for.into_iter().collect::<Vec<_>>().join(", "),
            timestamp: entry.timestamp,
            ip_address: entry.ip_address,
        })
        .collect();

    // `None` sorts below every timestamp, so undated voters end up last.
    voters.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    voters.truncate(limit);
    voters
}

/// One bar of the team performance chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPerformance {
    pub name: String,
    pub votes: i64,
    pub percentage: f64,
}

/// Every configured team with its tally, leader first.
pub fn team_performance(results: &[TeamResult]) -> Vec<TeamPerformance> {
    let mut performance: Vec<TeamPerformance> = Team::ALL
        .into_iter()
        .map(|team| {
            let matched = results
                .iter()
                .find(|result| result.team_name == team.display_name());
            TeamPerformance {
                name: team.display_name().to_string(),
                votes: matched.map_or(0, |result| result.votes),
                percentage: matched.map_or(0.0, |result| result.percentage),
            }
        })
        .collect();
    performance.sort_by(|a, b| b.votes.cmp(&a.votes));
    performance
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub votes: Vec<i64>,
    pub percentages: Vec<f64>,
}

impl ChartData {
    pub fn from_results(results: &[VoteResult]) -> Self {
        Self {
            labels: results.iter().map(|result| result.team_name.clone()).collect(),
            votes: results.iter().map(|result| result.vote_count).collect(),
            percentages: results.iter().map(|result| result.percentage).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analytics {
    pub total_votes: i64,
    pub unique_voters: i64,
    pub backend_connected: bool,
    pub last_updated: Option<i64>,
}

impl From<&DashboardStats> for Analytics {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            total_votes: stats.total_votes,
            unique_voters: stats.unique_voters,
            backend_connected: stats.backend_connected,
            last_updated: stats.last_updated,
        }
    }
}

/// Value/label pair for a filter drop-down
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn team_choices() -> Vec<Choice> {
    Team::ALL
        .into_iter()
        .map(|team| Choice {
            value: team.code(),
            label: team.display_name(),
        })
        .collect()
}

pub fn level_choices() -> Vec<Choice> {
    LogLevel::ALL
        .into_iter()
        .map(|level| Choice {
            value: level.as_str(),
            label: level.label(),
        })
        .collect()
}

pub fn action_choices() -> Vec<Choice> {
    ActionType::ALL
        .into_iter()
        .map(|action| Choice {
            value: action.as_str(),
            label: action.label(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardContext {
    pub page_title: &'static str,
    pub stats: DashboardStats,
    pub recent_votes: Vec<VoterActivity>,
    pub recent_logs: Vec<SystemLogEntry>,
    pub team_performance: Vec<TeamPerformance>,
    pub named_voters_count: usize,
    pub anonymous_voters_count: usize,
    pub messages: Vec<String>,
}

impl DashboardContext {
    pub fn build(stats: DashboardStats, recent_logs: Vec<SystemLogEntry>) -> Self {
        let recent_votes = recent_voters(&stats.votes, RECENT_LIMIT);
        let anonymous_voters_count = recent_votes
            .iter()
            .filter(|voter| voter.is_anonymous())
            .count();
        let named_voters_count = recent_votes.len() - anonymous_voters_count;
        let team_performance = team_performance(&stats.results);

        Self {
            page_title: "Dashboard",
            stats,
            recent_votes,
            recent_logs,
            team_performance,
            named_voters_count,
            anonymous_voters_count,
            messages: Vec::new(),
        }
    }

    pub fn fallback(message: String) -> Self {
        Self {
            page_title: "Dashboard",
            stats: DashboardStats::default(),
            recent_votes: Vec::new(),
            recent_logs: Vec::new(),
            team_performance: Vec::new(),
            named_voters_count: 0,
            anonymous_voters_count: 0,
            messages: vec![message],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VotesContext {
    pub page_title: &'static str,
    pub votes: Vec<Vote>,
    pub pagination: Pagination,
    pub search: String,
    pub team_filter: String,
    pub team_choices: Vec<Choice>,
    pub messages: Vec<String>,
}

impl VotesContext {
    pub fn fallback(message: String) -> Self {
        Self {
            page_title: "All Votes",
            votes: Vec::new(),
            pagination: Pagination::new(0, VOTES_PER_PAGE, None),
            search: String::new(),
            team_filter: String::new(),
            team_choices: team_choices(),
            messages: vec![message],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsContext {
    pub page_title: &'static str,
    pub results: Vec<VoteResult>,
    pub analytics: Analytics,
    pub chart_data: ChartData,
    pub messages: Vec<String>,
}

impl ResultsContext {
    pub fn build(results: Vec<VoteResult>, stats: &DashboardStats) -> Self {
        Self {
            page_title: "Voting Results",
            chart_data: ChartData::from_results(&results),
            analytics: Analytics::from(stats),
            results,
            messages: Vec::new(),
        }
    }

    pub fn fallback(message: String) -> Self {
        Self {
            page_title: "Voting Results",
            results: Vec::new(),
            analytics: Analytics::default(),
            chart_data: ChartData::from_results(&[]),
            messages: vec![message],
        }
    }
}

/// One audit entry as the logs listing shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
    #[serde(flatten)]
    pub entry: SystemLogEntry,
    pub message_short: String,
}

impl From<SystemLogEntry> for LogRow {
    fn from(entry: SystemLogEntry) -> Self {
        Self {
            message_short: entry.message_short(),
            entry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogsContext {
    pub page_title: &'static str,
    pub logs: Vec<LogRow>,
    pub pagination: Pagination,
    pub level_filter: String,
    pub action_filter: String,
    pub search: String,
    pub level_choices: Vec<Choice>,
    pub action_choices: Vec<Choice>,
    pub messages: Vec<String>,
}

impl LogsContext {
    pub fn fallback(message: String) -> Self {
        Self {
            page_title: "System Logs",
            logs: Vec::new(),
            pagination: Pagination::new(0, LOGS_PER_PAGE, None),
            level_filter: String::new(),
            action_filter: String::new(),
            search: String::new(),
            level_choices: level_choices(),
            action_choices: action_choices(),
            messages: vec![message],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminActionsContext {
    pub page_title: &'static str,
    /// `healthy` or `error`
    pub backend_status: &'static str,
    pub backend_info: Value,
    pub messages: Vec<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn summary(
        name: Option<&str>,
        voted_for: &str,
        timestamp: Option<i64>,
        ip: &str,
    ) -> VoteSummary {
        VoteSummary {
            vote_id: format!("{voted_for}-{timestamp:?}"),
            voter_name: name.map(ToString::to_string),
            team_display_name: "Team 01".to_string(),
            voted_for_display_name: voted_for.to_string(),
            timestamp,
            ip_address: Some(ip.to_string()),
        }
    }

    #[test]
    fn pagination_clamps_requested_page() {
        let page = Pagination::new(60, 25, Some("2"));
        assert_eq!((page.page, page.num_pages, page.offset()), (2, 3, 25));
        assert!(page.has_previous && page.has_next);

        assert_eq!(Pagination::new(60, 25, Some("abc")).page, 1);
        assert_eq!(Pagination::new(60, 25, Some("0")).page, 1);
        assert_eq!(Pagination::new(60, 25, Some("-4")).page, 1);
        assert_eq!(Pagination::new(60, 25, Some("99")).page, 3);
        assert_eq!(Pagination::new(60, 25, None).page, 1);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let page = Pagination::new(0, 50, Some("7"));
        assert_eq!((page.page, page.num_pages, page.offset()), (1, 1, 0));
        assert!(!page.has_previous && !page.has_next);
    }

    #[test]
    fn voters_are_merged_by_name() {
        let votes = vec![
            summary(Some("Ada"), "Team 03", Some(100), "10.0.0.1"),
            summary(Some(" Ada "), "Team 02", Some(300), "10.0.0.2"),
            summary(None, "Team 04", Some(200), "10.0.0.3"),
            summary(Some(""), "Team 02", None, "10.0.0.4"),
            summary(Some("Bob"), "Team 01", None, "10.0.0.5"),
        ];

        let voters = recent_voters(&votes, 10);
        assert_eq!(
            voters,
            vec![
                VoterActivity {
                    name: "Ada".to_string(),
                    team_display_name: "Team 01".to_string(),
                    voted_for_display_name: "Team 02, Team 03".to_string(),
                    timestamp: Some(300),
                    ip_address: Some("10.0.0.2".to_string()),
                },
                VoterActivity {
                    name: "Anonymous".to_string(),
                    team_display_name: "Team 01".to_string(),
                    voted_for_display_name: "Team 02, Team 04".to_string(),
                    timestamp: Some(200),
                    ip_address: Some("10.0.0.3".to_string()),
                },
                VoterActivity {
                    name: "Bob".to_string(),
                    team_display_name: "Team 01".to_string(),
                    voted_for_display_name: "Team 01".to_string(),
                    timestamp: None,
                    ip_address: Some("10.0.0.5".to_string()),
                },
            ]
        );
    }

    #[test]
    fn recent_voters_respects_limit() {
        let votes: Vec<VoteSummary> = (0..15)
            .map(|i| summary(Some(&format!("voter-{i}")), "Team 01", Some(i), "10.0.0.1"))
            .collect();
        let voters = recent_voters(&votes, RECENT_LIMIT);
        assert_eq!(voters.len(), 10);
        assert_eq!(voters[0].name, "voter-14");
    }

    #[test]
    fn team_performance_lists_every_team() {
        let performance = team_performance(&[]);
        let names: Vec<&str> = performance.iter().map(|team| team.name.as_str()).collect();
        assert_eq!(names, vec!["Team 01", "Team 02", "Team 03", "Team 04"]);
        assert!(performance
            .iter()
            .all(|team| team.votes == 0 && team.percentage.abs() < f64::EPSILON));
    }

    #[test]
    fn team_performance_sorts_leader_first() {
        let results = vec![
            TeamResult {
                team_id: "team-c".to_string(),
                team_name: "Team 03".to_string(),
                votes: 5,
                percentage: 62.5,
            },
            TeamResult {
                team_id: "team-b".to_string(),
                team_name: "Team 02".to_string(),
                votes: 3,
                percentage: 37.5,
            },
        ];
        let names: Vec<String> = team_performance(&results)
            .into_iter()
            .map(|team| team.name)
            .collect();
        assert_eq!(names, vec!["Team 03", "Team 02", "Team 01", "Team 04"]);
    }

    #[test]
    fn dashboard_counts_cover_displayed_voters() {
        let stats = DashboardStats {
            votes: vec![
                summary(Some("Ada"), "Team 02", Some(1), "10.0.0.1"),
                summary(None, "Team 03", Some(2), "10.0.0.2"),
            ],
            ..DashboardStats::default()
        };
        let context = DashboardContext::build(stats, Vec::new());
        assert_eq!(context.named_voters_count, 1);
        assert_eq!(context.anonymous_voters_count, 1);
        assert_eq!(context.team_performance.len(), 4);
    }

    #[test]
    fn log_row_shows_short_message() {
        let entry = SystemLogEntry {
            id: 7,
            timestamp: 1,
            level: LogLevel::Info,
            action_type: ActionType::ApiCall,
            message: "x".repeat(60),
            details: None,
            user: Some("admin".to_string()),
            ip_address: None,
        };
        let row = serde_json::to_value(LogRow::from(entry)).unwrap();
        assert_eq!(row["message"], "x".repeat(60));
        assert_eq!(row["message_short"], format!("{}...", "x".repeat(50)));
        assert_eq!(row["user"], "admin");
        assert_eq!(row["id"], 7);
    }
}
