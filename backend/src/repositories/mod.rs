pub mod common;
pub mod service_request;
pub mod transaction;

pub use service_request::{PgServiceRequestRepository, ServiceRequestRepository};
