//! Events directory API for airsoft games: event CRUD with thumbnail
//! uploads, token-based accounts and per-user saved events.

pub mod auth;
pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod uploads;
pub mod utils;
