use tokio_util::sync::CancellationToken;

use crate::state::SharedState;

pub async fn cmd_check_updates(state: &SharedState, user_id: &str, all: bool) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    println!("Checking for new episodes and seasons...");
    let result = if all {
        state.update_checker.check_all(&cancel).await
    } else {
        state.update_checker.check_user(user_id, &cancel).await
    };
    watcher.abort();

    let summary = result?;
    if summary.is_empty() {
        println!("Everything is up to date.");
    } else {
        println!(
            "✓ {} episode update(s), {} new season(s).",
            summary.episode_updates, summary.new_seasons
        );
        println!("Run 'animelog notifications' for details.");
    }

    Ok(())
}
