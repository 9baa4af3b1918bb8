pub mod actor;
pub mod service_request;
pub mod status_history;
