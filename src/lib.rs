pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod meals;
pub mod state;
pub mod storage;
