pub mod scheduler;
pub use scheduler::Scheduler;

pub mod update_checker;
pub use update_checker::{UpdateChecker, UpdateSummary};

pub mod watchlist;
pub use watchlist::{AddShowRequest, WatchlistError, WatchlistService};
