pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod models;
pub mod state;
