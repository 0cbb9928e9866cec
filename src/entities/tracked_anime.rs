use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tracked_anime")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    /// Show title shared by every season row of one show.
    pub title: String,
    pub episodes_watched: i32,
    pub total_episodes: Option<i32>,
    pub status: String,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub cover_image: Option<String>,
    pub season_number: i32,
    pub mal_id: Option<i32>,
    /// Position in the user's ranking; shared by every season row of a show.
    pub ranking: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notifications::Entity")]
    Notifications,
}

impl Related<super::notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
