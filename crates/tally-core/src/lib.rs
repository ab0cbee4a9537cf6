//! tally-core - Core library for Tally
//!
//! This crate contains the mirror models, the libSQL-backed store, the client
//! for the external voting backend, and the synchronization service that ties
//! them together. The dashboard server is a thin layer on top of it.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod util;

pub use error::{Error, Result};
pub use models::{Actor, LogLevel, SystemLogEntry, Team, Vote, VoteResult};
