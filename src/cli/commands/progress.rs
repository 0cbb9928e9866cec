use crate::models::watchlist::{TrackedAnimeUpdate, WatchStatus};
use crate::state::SharedState;

pub struct ProgressArgs {
    pub watched: Option<i32>,
    pub status: Option<String>,
    pub rating: Option<i32>,
    pub total: Option<i32>,
    pub notes: Option<String>,
}

impl ProgressArgs {
    fn into_update(self) -> anyhow::Result<TrackedAnimeUpdate> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<WatchStatus>)
            .transpose()
            .map_err(anyhow::Error::msg)?;

        Ok(TrackedAnimeUpdate {
            episodes_watched: self.watched,
            total_episodes: self.total,
            status,
            rating: self.rating,
            notes: self.notes,
        })
    }
}

pub async fn cmd_update_progress(
    state: &SharedState,
    user_id: &str,
    id: &str,
    args: ProgressArgs,
) -> anyhow::Result<()> {
    let update = args.into_update()?;

    if update.is_empty() {
        println!("Nothing to update. Use --watched, --status, --rating, --total or --notes.");
        return Ok(());
    }

    let entry = state.watchlist.update_entry(user_id, id, update).await?;

    let total = entry
        .total_episodes
        .map_or_else(|| "?".to_string(), |e| e.to_string());
    println!(
        "✓ {} Season {}: {}/{} episodes, {}",
        entry.title, entry.season_number, entry.episodes_watched, total, entry.status
    );

    Ok(())
}
