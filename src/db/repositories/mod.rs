pub mod notification;
pub mod tracked_anime;
