mod client;
mod config;
mod error;
mod urls;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{GatewayClient, GatewayReply};
pub use config::GatewayConfig;
pub use error::GatewayError;
