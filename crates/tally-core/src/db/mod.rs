//! Database layer for Tally

mod connection;
mod log_repository;
mod migrations;
mod result_repository;
mod vote_repository;

pub use connection::Database;
pub use log_repository::{LibSqlLogRepository, LogFilter, LogRepository};
pub use result_repository::{LibSqlResultRepository, ResultRepository};
pub use vote_repository::{LibSqlVoteRepository, VoteFilter, VoteRepository};

pub(crate) use connection::in_transaction;
