pub mod anime;
pub mod notification;
pub mod season;
pub mod watchlist;
