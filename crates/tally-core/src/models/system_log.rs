//! Audit log model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Severity of an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    pub const ALL: [Self; 4] = [Self::Info, Self::Warning, Self::Error, Self::Success];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Success => "SUCCESS",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Success => "Success",
        }
    }
}

/// Category of an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    ApiCall,
    VoteSync,
    ResultsSync,
    AdminAction,
    Error,
}

impl ActionType {
    pub const ALL: [Self; 5] = [
        Self::ApiCall,
        Self::VoteSync,
        Self::ResultsSync,
        Self::AdminAction,
        Self::Error,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiCall => "API_CALL",
            Self::VoteSync => "VOTE_SYNC",
            Self::ResultsSync => "RESULTS_SYNC",
            Self::AdminAction => "ADMIN_ACTION",
            Self::Error => "ERROR",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ApiCall => "API Call",
            Self::VoteSync => "Vote Sync",
            Self::ResultsSync => "Results Sync",
            Self::AdminAction => "Admin Action",
            Self::Error => "Error",
        }
    }
}

macro_rules! impl_code_parsing {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|value| value.as_str() == s)
                    .ok_or_else(|| format!(concat!("unknown ", $what, ": {}"), s))
            }
        }
    };
}

impl_code_parsing!(LogLevel, "log level");
impl_code_parsing!(ActionType, "action type");

/// Who triggered an action, for audit attribution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user: Option<String>,
    pub ip_address: Option<String>,
}

impl Actor {
    pub fn new(user: impl Into<String>, ip_address: Option<String>) -> Self {
        Self {
            user: Some(user.into()),
            ip_address,
        }
    }

    /// Actions initiated by the dashboard itself (e.g. page loads)
    pub fn system() -> Self {
        Self::default()
    }
}

/// A persisted audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemLogEntry {
    pub id: i64,
    /// Creation timestamp (Unix ms), never updated
    pub timestamp: i64,
    pub level: LogLevel,
    pub action_type: ActionType,
    pub message: String,
    pub details: Option<Value>,
    pub user: Option<String>,
    pub ip_address: Option<String>,
}

impl SystemLogEntry {
    /// Message truncated to 50 characters for list displays
    #[must_use]
    pub fn message_short(&self) -> String {
        if self.message.chars().count() > 50 {
            let head: String = self.message.chars().take(50).collect();
            format!("{head}...")
        } else {
            self.message.clone()
        }
    }
}

/// An audit entry about to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub level: LogLevel,
    pub action_type: ActionType,
    pub message: String,
    pub details: Option<Value>,
    pub actor: Actor,
}

impl NewLogEntry {
    pub fn new(level: LogLevel, action_type: ActionType, message: impl Into<String>) -> Self {
        Self {
            level,
            action_type,
            message: message.into(),
            details: None,
            actor: Actor::system(),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn with_actor(mut self, actor: &Actor) -> Self {
        self.actor = actor.clone();
        self
    }
}
