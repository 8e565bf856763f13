use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Validation error: {0}")]
    Validation(#[from] courier_core::ValidationError),

    #[error("Gateway answered {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Gateway error: {0}")]
    Gateway(#[from] courier_gateway::GatewayError),

    #[error("Store error: {0}")]
    Store(#[from] courier_db::DbError),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
