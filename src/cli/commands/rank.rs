//! Show ranking command handler

use crate::models::watchlist::ShowGroup;
use crate::state::SharedState;

fn print_ranking(shows: &[ShowGroup]) {
    let ranked: Vec<&ShowGroup> = shows.iter().filter(|s| s.ranking().is_some()).collect();
    if ranked.is_empty() {
        println!("No ranked shows. Rank one with: animelog rank \"title\" --to 1");
        return;
    }

    println!("Ranking");
    println!("{:-<40}", "");
    for show in ranked {
        if let Some(rank) = show.ranking() {
            println!("{rank:>3}. {}", show.title);
        }
    }
}

/// Lists the ranking, or moves `title` to `to`, or takes it out with `remove`.
pub async fn cmd_rank_show(
    state: &SharedState,
    user_id: &str,
    title: &str,
    to: Option<i32>,
    remove: bool,
) -> anyhow::Result<()> {
    let shows = state.watchlist.ranked_shows(user_id).await?;
    let title = title.trim();

    if title.is_empty() {
        print_ranking(&shows);
        return Ok(());
    }

    // Titles are stored as entered; match them case-insensitively here.
    let Some(show) = shows.iter().find(|s| s.title.eq_ignore_ascii_case(title)) else {
        println!("No tracked show titled \"{title}\"");
        return Ok(());
    };

    let shows = match (to, remove) {
        (_, true) => {
            let shows = state.watchlist.unrank_show(user_id, &show.title).await?;
            println!("✓ Removed {} from the ranking", show.title);
            shows
        }
        (Some(rank), false) => {
            let shows = state.watchlist.rank_show(user_id, &show.title, rank).await?;
            println!("✓ Moved {} to #{rank}", show.title);
            shows
        }
        (None, false) => {
            match show.ranking() {
                Some(rank) => println!("{} is ranked #{rank}", show.title),
                None => println!("{} is not ranked", show.title),
            }
            return Ok(());
        }
    };

    println!();
    print_ranking(&shows);
    Ok(())
}
