//! Staff console for the civil registry: a REST client for the registry API
//! and the request-board view model the staff pages are built on.

pub mod api;
pub mod config;
pub mod pages;

pub use api::{ApiClient, ApiError};
pub use config::{ActorIdentity, ConsoleConfig};
pub use pages::requests::{RequestBoardViewModel, RequestRow, RequestsRepository};
