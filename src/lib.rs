pub mod config;
pub mod global_session_manager;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
