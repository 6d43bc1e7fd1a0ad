pub mod index;
pub mod podcasts;
pub mod sermons;
pub mod users;
