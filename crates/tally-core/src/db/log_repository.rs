//! Audit log repository

use crate::error::Result;
use crate::models::{ActionType, LogLevel, NewLogEntry, SystemLogEntry};
use crate::util::{escape_like, now_millis};
use libsql::{params, Connection, Row};

/// Filters for the paginated log list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub level: Option<LogLevel>,
    pub action_type: Option<ActionType>,
    /// Case-insensitive substring matched against message and user
    pub search: Option<String>,
}

/// Trait for audit log operations (async)
///
/// There is deliberately no update or delete: entries are append-only.
#[allow(async_fn_in_trait)]
pub trait LogRepository {
    /// Append an entry, stamping its creation time
    async fn append(&self, entry: &NewLogEntry) -> Result<SystemLogEntry>;

    /// List entries newest first
    async fn list(&self, filter: &LogFilter, limit: usize, offset: usize)
        -> Result<Vec<SystemLogEntry>>;

    /// Count entries matching a filter
    async fn count(&self, filter: &LogFilter) -> Result<usize>;
}

/// libSQL implementation of `LogRepository`
pub struct LibSqlLogRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlLogRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_entry(row: &Row) -> Result<SystemLogEntry> {
        let level: String = row.get(2)?;
        let action_type: String = row.get(3)?;
        let details: Option<String> = row.get(5)?;

        Ok(SystemLogEntry {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            level: level.parse().unwrap_or(LogLevel::Info),
            action_type: action_type.parse().unwrap_or(ActionType::Error),
            message: row.get(4)?,
            details: details.and_then(|raw| serde_json::from_str(&raw).ok()),
            user: row.get(6)?,
            ip_address: row.get(7)?,
        })
    }
}

const FILTER_CLAUSE: &str = r"(?1 = '' OR level = ?1)
    AND (?2 = '' OR action_type = ?2)
    AND (?3 = ''
        OR message LIKE '%' || ?3 || '%' ESCAPE '\'
        OR user LIKE '%' || ?3 || '%' ESCAPE '\')";

fn filter_params(filter: &LogFilter) -> (String, String, String) {
    (
        filter.level.map(|level| level.as_str().to_string()).unwrap_or_default(),
        filter
            .action_type
            .map(|action| action.as_str().to_string())
            .unwrap_or_default(),
        filter.search.as_deref().map(escape_like).unwrap_or_default(),
    )
}

impl LogRepository for LibSqlLogRepository<'_> {
    async fn append(&self, entry: &NewLogEntry) -> Result<SystemLogEntry> {
        let timestamp = now_millis();
        let details = entry
            .details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn
            .execute(
                "INSERT INTO system_logs (timestamp, level, action_type, message, details, user, ip_address)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    timestamp,
                    entry.level.as_str(),
                    entry.action_type.as_str(),
                    entry.message.as_str(),
                    details,
                    entry.actor.user.clone(),
                    entry.actor.ip_address.clone()
                ],
            )
            .await?;

        Ok(SystemLogEntry {
            id: self.conn.last_insert_rowid(),
            timestamp,
            level: entry.level,
            action_type: entry.action_type,
            message: entry.message.clone(),
            details: entry.details.clone(),
            user: entry.actor.user.clone(),
            ip_address: entry.actor.ip_address.clone(),
        })
    }

    async fn list(
        &self,
        filter: &LogFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SystemLogEntry>> {
        let (level, action_type, search) = filter_params(filter);
        let sql = format!(
            "SELECT id, timestamp, level, action_type, message, details, user, ip_address
             FROM system_logs
             WHERE {FILTER_CLAUSE}
             ORDER BY timestamp DESC, id DESC
             LIMIT ?4 OFFSET ?5"
        );

        let mut rows = self
            .conn
            .query(
                &sql,
                params![
                    level,
                    action_type,
                    search,
                    i64::try_from(limit).unwrap_or(i64::MAX),
                    i64::try_from(offset).unwrap_or(i64::MAX)
                ],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::parse_entry(&row)?);
        }
        Ok(entries)
    }

    async fn count(&self, filter: &LogFilter) -> Result<usize> {
        let (level, action_type, search) = filter_params(filter);
        let sql = format!("SELECT COUNT(*) FROM system_logs WHERE {FILTER_CLAUSE}");
        let mut rows = self
            .conn
            .query(&sql, params![level, action_type, search])
            .await?;

        let count: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
