//! Services shared by every Tally front end

mod store;
mod sync;

pub use store::Store;
pub use sync::{vote_from_backend, DashboardStats, SyncService, VoteSummary};
