use crate::state::SharedState;

pub async fn cmd_remove_entry(state: &SharedState, user_id: &str, id: &str) -> anyhow::Result<()> {
    state.watchlist.remove_entry(user_id, id).await?;
    println!("✓ Removed entry {id}");
    Ok(())
}
