pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod redact;
pub mod routes;
pub mod state;
pub mod supervisor;
