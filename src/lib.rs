pub mod api {
    pub mod errors;
    pub mod perks;
    pub mod posts;
    pub mod users;
}
pub mod app;
pub mod auth;
pub mod config;
pub mod db {
    #[cfg(test)]
    pub(crate) mod memory;
    pub mod models;
    pub mod perk_repository;
    pub mod post_repository;
    pub mod user_repository;
}
pub mod error;
pub mod perks {
    pub mod definitions;
}
pub mod search {
    pub mod fuzzy;
    pub mod posts;
}
