use crate::entities::{prelude::*, tracked_anime};
use crate::models::watchlist::{NewTrackedAnime, TrackedAnime as TrackedRow, TrackedAnimeUpdate};
use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::warn;

pub struct TrackedAnimeRepository {
    conn: DatabaseConnection,
}

impl TrackedAnimeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: tracked_anime::Model) -> TrackedRow {
        let status = model.status.parse().unwrap_or_else(|e| {
            warn!(id = %model.id, error = %e, "Unknown watch status in database");
            Default::default()
        });

        TrackedRow {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            episodes_watched: model.episodes_watched,
            total_episodes: model.total_episodes,
            status,
            rating: model.rating,
            notes: model.notes,
            cover_image: model.cover_image,
            season_number: model.season_number,
            mal_id: model.mal_id,
            ranking: model.ranking,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    /// Inserts all rows in one transaction; either every row lands or none.
    pub async fn create_many(&self, entries: &[NewTrackedAnime]) -> Result<Vec<TrackedRow>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let now = chrono::Utc::now().to_rfc3339();
        let models: Vec<tracked_anime::Model> = entries
            .iter()
            .map(|e| tracked_anime::Model {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: e.user_id.clone(),
                title: e.title.clone(),
                episodes_watched: e.episodes_watched,
                total_episodes: e.total_episodes,
                status: e.status.as_str().to_string(),
                rating: e.rating,
                notes: e.notes.clone(),
                cover_image: e.cover_image.clone(),
                season_number: e.season_number,
                mal_id: e.mal_id,
                ranking: e.ranking,
                created_at: now.clone(),
                updated_at: now.clone(),
            })
            .collect();

        let active_models: Vec<tracked_anime::ActiveModel> = models
            .iter()
            .map(|m| tracked_anime::ActiveModel {
                id: Set(m.id.clone()),
                user_id: Set(m.user_id.clone()),
                title: Set(m.title.clone()),
                episodes_watched: Set(m.episodes_watched),
                total_episodes: Set(m.total_episodes),
                status: Set(m.status.clone()),
                rating: Set(m.rating),
                notes: Set(m.notes.clone()),
                cover_image: Set(m.cover_image.clone()),
                season_number: Set(m.season_number),
                mal_id: Set(m.mal_id),
                ranking: Set(m.ranking),
                created_at: Set(m.created_at.clone()),
                updated_at: Set(m.updated_at.clone()),
            })
            .collect();

        let txn = self.conn.begin().await?;
        TrackedAnime::insert_many(active_models)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;

        Ok(models.into_iter().map(Self::map_model).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<TrackedRow>> {
        let model = TrackedAnime::find_by_id(id.to_string())
            .one(&self.conn)
            .await?;

        Ok(model.map(Self::map_model))
    }

    /// All rows of one user, ordered by show title then season.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<TrackedRow>> {
        let rows = TrackedAnime::find()
            .filter(tracked_anime::Column::UserId.eq(user_id))
            .order_by_asc(tracked_anime::Column::Title)
            .order_by_asc(tracked_anime::Column::SeasonNumber)
            .order_by_asc(tracked_anime::Column::CreatedAt)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn update(&self, id: &str, update: &TrackedAnimeUpdate) -> Result<Option<TrackedRow>> {
        let Some(model) = TrackedAnime::find_by_id(id.to_string())
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active: tracked_anime::ActiveModel = model.into();

        if let Some(watched) = update.episodes_watched {
            active.episodes_watched = Set(watched);
        }
        if let Some(total) = update.total_episodes {
            active.total_episodes = Set(Some(total));
        }
        if let Some(status) = update.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(rating) = update.rating {
            active.rating = Set(Some(rating));
        }
        if let Some(notes) = &update.notes {
            active.notes = Set(Some(notes.clone()));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active.update(&self.conn).await?;
        Ok(Some(Self::map_model(updated)))
    }

    /// Writes the ranking of every listed show title in one transaction.
    /// All season rows of a title receive the same value.
    pub async fn set_show_rankings(
        &self,
        user_id: &str,
        rankings: &[(String, Option<i32>)],
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        for (title, ranking) in rankings {
            TrackedAnime::update_many()
                .col_expr(tracked_anime::Column::Ranking, Expr::value(*ranking))
                .col_expr(tracked_anime::Column::UpdatedAt, Expr::value(now.clone()))
                .filter(tracked_anime::Column::UserId.eq(user_id))
                .filter(tracked_anime::Column::Title.eq(title.as_str()))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = TrackedAnime::delete_by_id(id.to_string())
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Users with at least one row linked to a MAL id.
    pub async fn list_user_ids(&self) -> Result<Vec<String>> {
        let ids: Vec<String> = TrackedAnime::find()
            .select_only()
            .column(tracked_anime::Column::UserId)
            .filter(tracked_anime::Column::MalId.is_not_null())
            .distinct()
            .order_by_asc(tracked_anime::Column::UserId)
            .into_tuple::<String>()
            .all(&self.conn)
            .await?;

        Ok(ids)
    }
}
