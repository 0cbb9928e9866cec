use std::collections::HashSet;
use std::io::Write;

use crate::models::watchlist::WatchStatus;
use crate::resolver::ResolveError;
use crate::services::AddShowRequest;
use crate::state::SharedState;

use super::resolve::{print_resolution, resolve_interruptible};
use super::search::print_result_line;

fn read_line() -> anyhow::Result<String> {
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Parses "2, 4" into season numbers; anything unparsable is ignored.
fn parse_season_list(input: &str) -> HashSet<i32> {
    input
        .split([',', ' '])
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

pub async fn cmd_add_show(
    state: &SharedState,
    user_id: &str,
    query: &str,
    status: &str,
    keep_all: bool,
) -> anyhow::Result<()> {
    let status: WatchStatus = status.parse().map_err(anyhow::Error::msg)?;

    println!("Searching for: {query}");

    let results = state.jikan.search(query).await?;

    if results.is_empty() {
        println!("No anime found matching '{query}'");
        return Ok(());
    }

    println!();
    println!("Search Results:");
    println!("{:-<60}", "");

    for (i, anime) in results.iter().enumerate().take(10) {
        print_result_line(&format!("[{}]", i + 1), anime);
        println!();
    }

    println!(
        "Enter number to add (1-{}), or 'q' to cancel:",
        results.len().min(10)
    );

    let input = read_line()?;

    if input.eq_ignore_ascii_case("q") || input.is_empty() {
        println!("Cancelled.");
        return Ok(());
    }

    let index: usize = match input.parse::<usize>() {
        Ok(n) if (1..=results.len().min(10)).contains(&n) => n - 1,
        _ => {
            println!("Invalid selection.");
            return Ok(());
        }
    };

    let seed = results[index].to_seed();

    let mut resolution = match resolve_interruptible(state, &seed).await {
        Ok(resolution) => resolution,
        Err(ResolveError::Cancelled) => {
            println!("Cancelled. Nothing was saved.");
            return Ok(());
        }
    };

    let request = if resolution.seasons.is_empty() {
        println!(
            "{} has no TV seasons; adding it as a single entry.",
            resolution.base_title
        );
        AddShowRequest {
            title: resolution.base_title.clone(),
            status,
            rating: resolution.rating,
            cover_image: resolution.cover_image.clone(),
            mal_id: Some(resolution.mal_id),
            episodes_watched: seed.episodes.unwrap_or(0),
            total_episodes: seed.episodes,
            number_of_seasons: 1,
            ..Default::default()
        }
    } else {
        print_resolution(&resolution);

        if !keep_all {
            println!();
            print!("Season numbers to skip (e.g. 2,3), or Enter to keep all: ");
            let skip = parse_season_list(&read_line()?);
            for season in &mut resolution.seasons {
                if skip.contains(&season.season_number) {
                    season.selected = false;
                }
            }
        }

        AddShowRequest::from_resolution(&resolution, status)
    };

    let created = state.watchlist.add_show(user_id, request).await?;

    println!();
    println!(
        "✓ Added: {} ({} season{})",
        resolution.base_title,
        created.len(),
        if created.len() == 1 { "" } else { "s" }
    );
    for entry in &created {
        println!("  Season {} | ID: {}", entry.season_number, entry.id);
    }

    println!();
    println!("Run 'animelog check' to look for new episodes and seasons.");

    Ok(())
}
