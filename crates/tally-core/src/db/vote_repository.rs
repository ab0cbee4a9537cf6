//! Vote mirror repository

use crate::error::Result;
use crate::models::Vote;
use crate::util::escape_like;
use libsql::{params, Connection, Row};

/// Filters for the paginated vote list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteFilter {
    /// Case-insensitive substring matched against identifier, vote id and IP
    pub search: Option<String>,
    /// Exact team code matched against the voter's own team
    pub team: Option<String>,
}

/// Trait for vote mirror operations (async)
#[allow(async_fn_in_trait)]
pub trait VoteRepository {
    /// Delete every mirrored vote and insert `votes` in its place
    async fn replace_all(&self, votes: &[Vote]) -> Result<usize>;

    /// List votes newest first
    async fn list(&self, filter: &VoteFilter, limit: usize, offset: usize) -> Result<Vec<Vote>>;

    /// Count votes matching a filter
    async fn count(&self, filter: &VoteFilter) -> Result<usize>;

    /// Count distinct voter identifiers
    async fn count_distinct_voters(&self) -> Result<usize>;

    /// Remove every mirrored vote
    async fn clear(&self) -> Result<()>;
}

/// libSQL implementation of `VoteRepository`
pub struct LibSqlVoteRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlVoteRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    async fn insert(&self, vote: &Vote) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO votes (
                    vote_id, user_team, voted_for, timestamp, ip_address,
                    user_identifier, voter_name, synced_with_backend, created_at, updated_at
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    vote.vote_id.as_str(),
                    vote.user_team.as_str(),
                    vote.voted_for.as_str(),
                    vote.timestamp,
                    vote.ip_address.clone(),
                    vote.user_identifier.as_str(),
                    vote.voter_name.clone(),
                    i64::from(vote.synced_with_backend),
                    vote.created_at,
                    vote.updated_at
                ],
            )
            .await?;
        Ok(())
    }

    fn parse_vote(row: &Row) -> Result<Vote> {
        Ok(Vote {
            vote_id: row.get(0)?,
            user_team: row.get(1)?,
            voted_for: row.get(2)?,
            timestamp: row.get(3)?,
            ip_address: row.get(4)?,
            user_identifier: row.get(5)?,
            voter_name: row.get(6)?,
            synced_with_backend: row.get::<i64>(7)? != 0,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

const FILTER_CLAUSE: &str = r"(?1 = '' OR user_identifier LIKE '%' || ?1 || '%' ESCAPE '\'
        OR vote_id LIKE '%' || ?1 || '%' ESCAPE '\'
        OR ip_address LIKE '%' || ?1 || '%' ESCAPE '\')
    AND (?2 = '' OR user_team = ?2)";

fn filter_params(filter: &VoteFilter) -> (String, String) {
    (
        filter.search.as_deref().map(escape_like).unwrap_or_default(),
        filter.team.clone().unwrap_or_default(),
    )
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl VoteRepository for LibSqlVoteRepository<'_> {
    async fn replace_all(&self, votes: &[Vote]) -> Result<usize> {
        self.clear().await?;
        for vote in votes {
            self.insert(vote).await?;
        }
        Ok(votes.len())
    }

    async fn list(&self, filter: &VoteFilter, limit: usize, offset: usize) -> Result<Vec<Vote>> {
        let (search, team) = filter_params(filter);
        let sql = format!(
            "SELECT vote_id, user_team, voted_for, timestamp, ip_address,
                    user_identifier, voter_name, synced_with_backend, created_at, updated_at
             FROM votes
             WHERE {FILTER_CLAUSE}
             ORDER BY timestamp DESC, vote_id ASC
             LIMIT ?3 OFFSET ?4"
        );

        let mut rows = self
            .conn
            .query(
                &sql,
                params![search, team, to_sql_int(limit), to_sql_int(offset)],
            )
            .await?;

        let mut votes = Vec::new();
        while let Some(row) = rows.next().await? {
            votes.push(Self::parse_vote(&row)?);
        }
        Ok(votes)
    }

    async fn count(&self, filter: &VoteFilter) -> Result<usize> {
        let (search, team) = filter_params(filter);
        let sql = format!("SELECT COUNT(*) FROM votes WHERE {FILTER_CLAUSE}");
        let mut rows = self.conn.query(&sql, params![search, team]).await?;

        let count: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn count_distinct_voters(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(DISTINCT user_identifier) FROM votes", ())
            .await?;

        let count: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM votes", ()).await?;
        Ok(())
    }
}
