//! Retrospace backend library.
//!
//! A small Y2K-styled social space: accounts, posts with visibility levels,
//! comments, likes, friend requests, blocking, and direct messages with
//! per-conversation settings.
//!
//! The pure decision logic (presence, relationships, visibility,
//! conversation policy) lives in [`services`] and is consumed by every
//! handler; [`db`] holds the sqlx repositories and [`handlers`] the JSON
//! API surface.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
