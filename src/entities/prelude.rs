pub use super::notifications::Entity as Notifications;
pub use super::tracked_anime::Entity as TrackedAnime;
