pub mod repository;
pub mod utils;
pub mod view_model;

pub use repository::RequestsRepository;
pub use utils::MessageState;
pub use view_model::{RequestBoardViewModel, RequestRow};
