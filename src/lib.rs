pub mod app;
pub mod config;
pub mod error;
pub mod seed;
pub mod slug;
pub mod state;
pub mod validation;
pub mod db {
    pub mod admin_repository;
    pub mod content_repository;
    pub mod memory;
    pub mod models;
    pub mod mongo;
    pub mod page_repository;
    pub mod query;
}
pub mod auth {
    pub mod api_key;
    pub mod middleware;
    pub mod models;
    pub mod password;
    pub mod token;
}
pub mod storage {
    pub mod client;
}
pub mod api {
    pub mod admins;
    pub mod content;
    pub mod errors;
    pub mod extract;
    pub mod health;
    pub mod pages;
    pub mod response;
    pub mod upload;
    pub mod website;
}
