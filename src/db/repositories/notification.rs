use crate::entities::{notifications, prelude::*};
use crate::models::notification::{NewNotification, Notification, NotificationKind};
use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

pub struct NotificationRepository {
    conn: DatabaseConnection,
}

impl NotificationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: notifications::Model) -> Result<Notification> {
        let kind: NotificationKind = model.kind.parse().map_err(anyhow::Error::msg)?;

        Ok(Notification {
            id: model.id,
            user_id: model.user_id,
            anime_id: model.anime_id,
            anime_title: model.anime_title,
            season_number: model.season_number,
            episode_number: model.episode_number,
            kind,
            message: model.message,
            read: model.read,
            created_at: model.created_at,
        })
    }

    pub async fn create(&self, notification: &NewNotification) -> Result<Notification> {
        let active_model = notifications::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(notification.user_id.clone()),
            anime_id: Set(notification.anime_id.clone()),
            anime_title: Set(notification.anime_title.clone()),
            season_number: Set(Some(notification.season_number)),
            episode_number: Set(Some(notification.episode_number)),
            kind: Set(notification.kind.as_str().to_string()),
            message: Set(notification.message.clone()),
            read: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let model = active_model.insert(&self.conn).await?;
        Self::map_model(model)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Notification>> {
        Notifications::find_by_id(id.to_string())
            .one(&self.conn)
            .await?
            .map(Self::map_model)
            .transpose()
    }

    /// Newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        Notifications::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(Self::map_model)
            .collect()
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<u64> {
        let count = Notifications::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Read.eq(false))
            .count(&self.conn)
            .await?;

        Ok(count)
    }

    pub async fn mark_read(&self, id: &str) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(notifications::Column::Read, Expr::value(true))
            .filter(notifications::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result = Notifications::update_many()
            .col_expr(notifications::Column::Read, Expr::value(true))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Read.eq(false))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
