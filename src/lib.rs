pub mod api;
pub mod apps;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod models;
pub mod search;
pub mod server;
pub mod state;
