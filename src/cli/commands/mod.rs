mod add;
mod check;
mod list;
mod notifications;
mod progress;
mod rank;
mod remove;
mod resolve;
mod search;

pub use add::cmd_add_show;
pub use check::cmd_check_updates;
pub use list::cmd_list_shows;
pub use notifications::cmd_notifications;
pub use progress::{ProgressArgs, cmd_update_progress};
pub use rank::cmd_rank_show;
pub use remove::cmd_remove_entry;
pub use resolve::cmd_resolve_seasons;
pub use search::cmd_search_anime;
