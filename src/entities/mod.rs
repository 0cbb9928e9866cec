pub mod prelude;

pub mod notifications;
pub mod tracked_anime;
