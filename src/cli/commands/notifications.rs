use crate::state::SharedState;

pub async fn cmd_notifications(
    state: &SharedState,
    user_id: &str,
    mark_all: bool,
    mark_one: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(id) = mark_one {
        state.watchlist.mark_notification_read(user_id, id).await?;
        println!("✓ Marked {id} as read");
        return Ok(());
    }

    let notifications = state.watchlist.notifications(user_id).await?;

    if notifications.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    println!("Notifications ({} total)", notifications.len());
    println!("{:-<70}", "");

    for n in &notifications {
        let marker = if n.read { " " } else { "●" };
        println!("{marker} {}", n.message);
        println!("    {} | {} | ID: {}", n.kind, n.created_at, n.id);
    }

    if mark_all {
        let marked = state.watchlist.mark_all_notifications_read(user_id).await?;
        println!();
        println!("✓ Marked {marked} notification(s) as read");
    }

    Ok(())
}
