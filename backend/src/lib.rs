//! Transition executor for municipal civil-registry requests.
//!
//! Exposes the request lifecycle over a REST API backed by PostgreSQL.

pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;
