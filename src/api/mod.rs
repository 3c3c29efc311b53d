pub mod client;
pub mod models;

use async_trait::async_trait;

use crate::api::models::{Ack, ContactFields};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("delivery task ended without a result")]
    Dropped,
}

/// Delivers one set of form fields to wherever contact messages go.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    async fn send(&self, fields: ContactFields) -> Result<Ack, DeliveryError>;
}
