mod config;
mod error;
mod events;
mod worker;

pub use config::{ConfigError, CourierConfig, DEFAULT_PORT};
pub use error::WorkerError;
pub use events::WorkerEvent;
pub use worker::{CourierWorker, SendOutcome};

pub use courier_core::{
    DiagnosticsReport, SendMessageRequest, StatusReply, ValidationError, WebhookBatch,
    WebhookUrlRequest,
};
pub use courier_db::{Direction, MessageLog, MessageRecord, MessageStore};
pub use courier_gateway::{GatewayClient, GatewayConfig, GatewayError, GatewayReply};
