//! Data models for Tally

mod system_log;
mod team;
mod vote;
mod vote_result;

pub use system_log::{ActionType, Actor, LogLevel, NewLogEntry, SystemLogEntry};
pub use team::{team_code_for_name, Team};
pub use vote::Vote;
pub use vote_result::VoteResult;
