//! List tracked shows command handler

use crate::models::watchlist::WatchStatus;
use crate::state::SharedState;

pub async fn cmd_list_shows(state: &SharedState, user_id: &str) -> anyhow::Result<()> {
    let shows = state.watchlist.list_shows(user_id).await?;

    if shows.is_empty() {
        println!("Your watchlist is empty.");
        println!();
        println!("Add anime with: animelog add \"anime name\"");
        return Ok(());
    }

    let unread = state.watchlist.unread_notifications(user_id).await?;

    println!("Watchlist ({} shows)", shows.len());
    println!("{:-<70}", "");

    for show in shows {
        match show.ranking() {
            Some(rank) => println!("#{rank} {}", show.title),
            None => println!("{}", show.title),
        }

        for season in &show.seasons {
            let total = season
                .total_episodes
                .map_or_else(|| "?".to_string(), |e| e.to_string());

            let status_indicator = match season.status {
                WatchStatus::Watching => "▶",
                WatchStatus::Completed => "✓",
                WatchStatus::OnHold => "⏸",
                WatchStatus::Dropped => "✗",
                WatchStatus::PlanToWatch => "📅",
            };

            let rating = season
                .rating
                .map_or_else(String::new, |r| format!(" | Rating: {r}/10"));

            println!(
                "  {} Season {} [{}/{}] {}{}",
                status_indicator, season.season_number, season.episodes_watched, total, season.status, rating
            );
            println!("    ID: {}", season.id);
        }
    }

    println!();
    println!("Legend: ▶ Watching | ✓ Completed | ⏸ On hold | ✗ Dropped | 📅 Planned");
    if unread > 0 {
        println!("{unread} unread notification(s). Run 'animelog notifications'.");
    }

    Ok(())
}
