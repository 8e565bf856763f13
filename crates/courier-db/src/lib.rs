mod error;
mod models;
mod repository;

pub use error::DbError;
pub use models::*;
pub use repository::MessageStore;
