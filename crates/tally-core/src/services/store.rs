//! Thread-safe handle over the mirror tables and the audit log.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{
    in_transaction, Database, LibSqlLogRepository, LibSqlResultRepository, LibSqlVoteRepository,
    LogFilter, LogRepository, ResultRepository, VoteFilter, VoteRepository,
};
use crate::models::{NewLogEntry, SystemLogEntry, Vote, VoteResult};
use crate::Result;

/// Cloneable store shared by the API client, the sync service and the views.
#[derive(Clone)]
pub struct Store {
    db: Arc<Mutex<Database>>,
}

impl Store {
    /// Open a store backed by a database file, creating parent directories.
    ///
    /// `:memory:` opens a throwaway in-memory database.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if db_path.as_os_str() == ":memory:" {
            return Self::open_in_memory().await;
        }

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!("Opening mirror database at {}", db_path.display());
        let db = Database::open(&db_path).await?;
        Ok(Self::from_database(db))
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::from_database(db))
    }

    fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Append an audit entry.
    pub async fn append_log(&self, entry: &NewLogEntry) -> Result<SystemLogEntry> {
        let db = self.db.lock().await;
        LibSqlLogRepository::new(db.connection()).append(entry).await
    }

    /// Append an audit entry, reporting storage failures to the process log
    /// instead of the caller.
    pub async fn record(&self, entry: NewLogEntry) {
        if let Err(error) = self.append_log(&entry).await {
            tracing::warn!(
                action = entry.action_type.as_str(),
                level = entry.level.as_str(),
                "Failed to persist audit entry: {error}"
            );
        }
    }

    /// List audit entries newest first.
    pub async fn list_logs(
        &self,
        filter: &LogFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SystemLogEntry>> {
        let db = self.db.lock().await;
        LibSqlLogRepository::new(db.connection())
            .list(filter, limit, offset)
            .await
    }

    /// Count audit entries matching a filter.
    pub async fn count_logs(&self, filter: &LogFilter) -> Result<usize> {
        let db = self.db.lock().await;
        LibSqlLogRepository::new(db.connection()).count(filter).await
    }

    /// The `limit` most recent audit entries.
    pub async fn recent_logs(&self, limit: usize) -> Result<Vec<SystemLogEntry>> {
        self.list_logs(&LogFilter::default(), limit, 0).await
    }

    /// Swap the vote mirror for `votes` in a single transaction.
    pub async fn replace_votes(&self, votes: &[Vote]) -> Result<usize> {
        let db = self.db.lock().await;
        in_transaction(db.connection(), |conn| async move {
            LibSqlVoteRepository::new(conn).replace_all(votes).await
        })
        .await
    }

    /// Swap the result mirror for `results` in a single transaction.
    pub async fn replace_results(&self, results: &[VoteResult]) -> Result<usize> {
        let db = self.db.lock().await;
        in_transaction(db.connection(), |conn| async move {
            LibSqlResultRepository::new(conn).replace_all(results).await
        })
        .await
    }

    /// Empty both mirror tables together.
    pub async fn clear_mirrors(&self) -> Result<()> {
        let db = self.db.lock().await;
        in_transaction(db.connection(), |conn| async move {
            LibSqlVoteRepository::new(conn).clear().await?;
            LibSqlResultRepository::new(conn).clear().await
        })
        .await
    }

    /// List mirrored votes newest first.
    pub async fn list_votes(
        &self,
        filter: &VoteFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Vote>> {
        let db = self.db.lock().await;
        LibSqlVoteRepository::new(db.connection())
            .list(filter, limit, offset)
            .await
    }

    /// Every mirrored vote, newest first.
    pub async fn all_votes(&self) -> Result<Vec<Vote>> {
        self.list_votes(&VoteFilter::default(), usize::MAX, 0).await
    }

    /// Count mirrored votes matching a filter.
    pub async fn count_votes(&self, filter: &VoteFilter) -> Result<usize> {
        let db = self.db.lock().await;
        LibSqlVoteRepository::new(db.connection()).count(filter).await
    }

    /// Count distinct voter identifiers in the vote mirror.
    pub async fn count_distinct_voters(&self) -> Result<usize> {
        let db = self.db.lock().await;
        LibSqlVoteRepository::new(db.connection())
            .count_distinct_voters()
            .await
    }

    /// Mirrored results, most votes first.
    pub async fn list_results(&self) -> Result<Vec<VoteResult>> {
        let db = self.db.lock().await;
        LibSqlResultRepository::new(db.connection()).list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionType, LogLevel};

    fn sample_vote(id: &str) -> Vote {
        Vote {
            vote_id: id.to_string(),
            user_team: "team-a".to_string(),
            voted_for: "team-b".to_string(),
            timestamp: 10,
            ip_address: None,
            user_identifier: format!("backend-{id}"),
            voter_name: None,
            synced_with_backend: true,
            created_at: 10,
            updated_at: 10,
        }
    }

    fn sample_result() -> VoteResult {
        VoteResult {
            team_id: "team-b".to_string(),
            team_name: "Team 02".to_string(),
            vote_count: 1,
            percentage: 100.0,
            total_votes: 1,
            last_updated: 10,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn in_memory_replace_and_clear() {
        let store = Store::open_in_memory().await.unwrap();

        store
            .replace_votes(&[sample_vote("a"), sample_vote("b")])
            .await
            .unwrap();
        store.replace_results(&[sample_result()]).await.unwrap();
        assert_eq!(store.all_votes().await.unwrap().len(), 2);
        assert_eq!(store.count_distinct_voters().await.unwrap(), 2);
        assert_eq!(store.list_results().await.unwrap().len(), 1);

        store.clear_mirrors().await.unwrap();
        assert!(store.all_votes().await.unwrap().is_empty());
        assert!(store.list_results().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn duplicate_vote_ids_leave_mirror_untouched() {
        let store = Store::open_in_memory().await.unwrap();
        store.replace_votes(&[sample_vote("keep")]).await.unwrap();

        let err = store
            .replace_votes(&[sample_vote("dup"), sample_vote("dup")])
            .await;
        assert!(err.is_err());

        let votes = store.all_votes().await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].vote_id, "keep");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn record_appends_log_entries() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .record(NewLogEntry::new(LogLevel::Warning, ActionType::AdminAction, "careful"))
            .await;

        let logs = store.recent_logs(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, LogLevel::Warning);
        assert_eq!(store.count_logs(&LogFilter::default()).await.unwrap(), 1);
    }
}
