use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::season::{Resolution, ResolutionOutcome, SeedSelection};
use crate::resolver::ResolveError;
use crate::state::SharedState;

/// A token that fires on Ctrl-C. Abort the watcher once the run is over.
fn cancel_on_ctrl_c() -> (CancellationToken, JoinHandle<()>) {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });
    (cancel, watcher)
}

/// Resolves seasons for `seed`, cancelling the run on Ctrl-C.
pub(super) async fn resolve_interruptible(
    state: &SharedState,
    seed: &SeedSelection,
) -> Result<Resolution, ResolveError> {
    let (cancel, watcher) = cancel_on_ctrl_c();

    println!("Resolving seasons for {} (Ctrl-C to abort)...", seed.display_title());
    let result = state.resolver.resolve(seed, &cancel).await;
    watcher.abort();
    result
}

pub(super) fn print_resolution(resolution: &Resolution) {
    if resolution.outcome == ResolutionOutcome::Fallback {
        println!("Related entries could not be fetched; using the search result only.");
    }

    println!();
    println!("{} ({} seasons)", resolution.base_title, resolution.seasons.len());
    println!("{:-<60}", "");

    for season in &resolution.seasons {
        let eps = season
            .episodes
            .map_or_else(|| "?".to_string(), |e| e.to_string());
        let mark = if season.selected { "x" } else { " " };
        println!(
            "[{mark}] Season {:<3} {eps:>4} eps   MAL ID: {}",
            season.season_number, season.mal_id
        );
    }
}

pub async fn cmd_resolve_seasons(state: &SharedState, mal_id: i32) -> anyhow::Result<()> {
    let (cancel, watcher) = cancel_on_ctrl_c();
    println!("Resolving seasons for MAL ID {mal_id} (Ctrl-C to abort)...");
    let result = state.resolver.resolve_id(mal_id, &cancel).await;
    watcher.abort();

    let resolution = match result {
        Ok(Some(resolution)) => resolution,
        Ok(None) => {
            println!("No anime found with MAL ID {mal_id}, or it could not be fetched.");
            return Ok(());
        }
        Err(ResolveError::Cancelled) => {
            println!("Cancelled.");
            return Ok(());
        }
    };

    if resolution.seasons.is_empty() {
        println!("{} has no TV seasons (movie or special).", resolution.base_title);
        return Ok(());
    }

    print_resolution(&resolution);
    Ok(())
}
