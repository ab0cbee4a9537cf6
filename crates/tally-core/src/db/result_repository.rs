//! Vote result mirror repository

use crate::error::Result;
use crate::models::VoteResult;
use libsql::{params, Connection};

/// Trait for result mirror operations (async)
#[allow(async_fn_in_trait)]
pub trait ResultRepository {
    /// Delete every mirrored result and insert `results` in its place
    async fn replace_all(&self, results: &[VoteResult]) -> Result<usize>;

    /// List results, most votes first
    async fn list(&self) -> Result<Vec<VoteResult>>;

    /// Remove every mirrored result
    async fn clear(&self) -> Result<()>;
}

/// libSQL implementation of `ResultRepository`
pub struct LibSqlResultRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlResultRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ResultRepository for LibSqlResultRepository<'_> {
    async fn replace_all(&self, results: &[VoteResult]) -> Result<usize> {
        self.clear().await?;
        for result in results {
            self.conn
                .execute(
                    "INSERT INTO vote_results (team_id, team_name, vote_count, percentage, total_votes, last_updated)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    params![
                        result.team_id.as_str(),
                        result.team_name.as_str(),
                        result.vote_count,
                        result.percentage,
                        result.total_votes,
                        result.last_updated
                    ],
                )
                .await?;
        }
        Ok(results.len())
    }

    async fn list(&self) -> Result<Vec<VoteResult>> {
        let mut rows = self
            .conn
            .query(
                "SELECT team_id, team_name, vote_count, percentage, total_votes, last_updated
                 FROM vote_results
                 ORDER BY vote_count DESC, team_id ASC",
                (),
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(VoteResult {
                team_id: row.get(0)?,
                team_name: row.get(1)?,
                vote_count: row.get(2)?,
                percentage: row.get(3)?,
                total_votes: row.get(4)?,
                last_updated: row.get(5)?,
            });
        }
        Ok(results)
    }

    async fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM vote_results", ()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn result(team_id: &str, votes: i64, percentage: f64) -> VoteResult {
        VoteResult {
            team_id: team_id.to_string(),
            team_name: team_id.to_uppercase(),
            vote_count: votes,
            percentage,
            total_votes: 7,
            last_updated: 42,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_replace_and_list_ordering() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlResultRepository::new(db.connection());

        repo.replace_all(&[result("team-a", 2, 29.0), result("team-b", 5, 71.0)])
            .await
            .unwrap();

        let results = repo.list().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].team_id, "team-b");
        assert!((results[0].percentage - 71.0).abs() < f64::EPSILON);
        assert!(results.iter().all(|r| r.total_votes == 7));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_replace_drops_previous_rows() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlResultRepository::new(db.connection());

        repo.replace_all(&[result("team-a", 1, 100.0)]).await.unwrap();
        repo.replace_all(&[result("team-c", 3, 100.0)]).await.unwrap();

        let results = repo.list().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].team_id, "team-c");
    }
}
