use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub anime_id: Option<String>,
    pub anime_title: String,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    /// `episode_release` or `season_release`.
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tracked_anime::Entity",
        from = "Column::AnimeId",
        to = "super::tracked_anime::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    TrackedAnime,
}

impl Related<super::tracked_anime::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackedAnime.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
