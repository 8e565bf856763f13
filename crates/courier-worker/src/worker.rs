use std::sync::Arc;
use tokio::sync::mpsc;

use courier_core::{
    DiagnosticsReport, SendMessageRequest, SendTextResponse, WebhookBatch, WebhookUrlRequest,
};
use courier_db::{MessageLog, MessageRecord, MessageStore};
use courier_gateway::{GatewayClient, GatewayReply};

use crate::config::CourierConfig;
use crate::error::{Result, WorkerError};
use crate::events::WorkerEvent;

/// Outcome of a send the gateway accepted.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub reply: GatewayReply,
    pub record: MessageRecord,
    /// `false` when the message went out but could not be written to the log.
    pub stored: bool,
}

pub struct CourierWorker {
    store: Arc<MessageStore>,
    gateway: Arc<GatewayClient>,
    event_tx: mpsc::Sender<WorkerEvent>,
    event_rx: Option<mpsc::Receiver<WorkerEvent>>,
}

impl CourierWorker {
    pub fn new(config: &CourierConfig) -> Result<Self> {
        let gateway = GatewayClient::new(config.gateway.clone())?;
        let store = match &config.messages_file {
            Some(path) => MessageStore::new(path),
            None => MessageStore::open_default()?,
        };
        Ok(Self::with_parts(store, gateway))
    }

    pub fn with_parts(store: MessageStore, gateway: GatewayClient) -> Self {
        let (event_tx, event_rx) = mpsc::channel(1000);
        Self {
            store: Arc::new(store),
            gateway: Arc::new(gateway),
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    pub fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<WorkerEvent>> {
        self.event_rx.take()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Sends a text message and records it as outgoing once the gateway
    /// accepts it. Failed sends are never recorded.
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<SendOutcome> {
        let outgoing = request.validate()?;
        tracing::info!(to = %outgoing.to, len = outgoing.body.len(), "Sending text message");

        let reply = self.gateway.send_text(&outgoing.to, &outgoing.body).await?;
        if !reply.is_success() {
            tracing::warn!(status = reply.status, to = %outgoing.to, "Gateway rejected message");
            return Err(WorkerError::Upstream {
                status: reply.status,
                message: format!("message could not be sent: {}", reply.body_text()),
            });
        }

        let accepted: SendTextResponse =
            serde_json::from_value(reply.body.clone()).unwrap_or_default();
        let record = MessageRecord::outgoing(accepted.first_id(), &outgoing.to, &outgoing.body);

        let stored = match self.store.append(vec![record.clone()]).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, id = %record.id(), "Message sent but not logged");
                self.emit(WorkerEvent::StoreFailed {
                    error: e.to_string(),
                });
                false
            }
        };

        tracing::info!(id = %record.id(), to = %outgoing.to, stored, "Message sent");
        self.emit(WorkerEvent::MessageSent {
            id: record.id().to_string(),
            to: outgoing.to,
            stored,
        });

        Ok(SendOutcome {
            reply,
            record,
            stored,
        })
    }

    /// Stores every inbound entry of a webhook batch, in batch order, and
    /// returns how many were stored.
    pub async fn ingest_webhook(&self, batch: WebhookBatch) -> Result<usize> {
        if batch.is_empty() {
            tracing::debug!("Webhook carried no messages");
            return Ok(0);
        }

        let records: Vec<MessageRecord> = batch
            .messages
            .iter()
            .map(|msg| {
                let record = MessageRecord::incoming(
                    msg.id.as_deref().unwrap_or_default(),
                    msg.from.as_deref().unwrap_or_default(),
                    msg.body(),
                );
                tracing::debug!(id = %record.id(), from = %record.counterpart(), text = %record.text(), "  ← inbound");
                record
            })
            .collect();
        let count = records.len();

        let total = self.store.append(records).await.inspect_err(|e| {
            tracing::error!(error = %e, count, "Failed to store inbound messages");
            self.emit(WorkerEvent::StoreFailed {
                error: e.to_string(),
            });
        })?;

        tracing::info!(count, total, "Stored inbound messages");
        self.emit(WorkerEvent::MessagesReceived { count, total });
        Ok(count)
    }

    pub async fn list_messages(&self) -> Result<MessageLog> {
        Ok(self.store.load().await?)
    }

    pub async fn webhook(&self) -> Result<GatewayReply> {
        Ok(self.gateway.webhook().await?)
    }

    /// Replaces the webhook URL and relays the gateway's answer as is.
    pub async fn update_webhook(&self, request: &WebhookUrlRequest) -> Result<GatewayReply> {
        let url = request.validate()?;
        tracing::info!(url = %url, "Updating webhook URL");
        Ok(self.gateway.set_webhook(&url, false).await?)
    }

    /// Sets and enables the webhook; a non-success answer is an error.
    pub async fn setup_webhook(&self, request: &WebhookUrlRequest) -> Result<GatewayReply> {
        let url = request.validate()?;
        tracing::info!(url = %url, "Configuring webhook");

        let reply = self.gateway.set_webhook(&url, true).await?;
        if !reply.is_success() {
            return Err(WorkerError::Upstream {
                status: reply.status,
                message: format!("webhook could not be configured: {}", reply.body_text()),
            });
        }
        Ok(reply)
    }

    pub async fn probe_api(&self) -> Result<GatewayReply> {
        let reply = self.gateway.probe_messages().await?;
        tracing::info!(status = reply.status, "Gateway messages probe");
        if !reply.is_success() {
            return Err(WorkerError::Upstream {
                status: reply.status,
                message: format!(
                    "API error: status {}, response: {}",
                    reply.status,
                    reply.body_text()
                ),
            });
        }
        Ok(reply)
    }

    pub async fn diagnostics(&self) -> Result<DiagnosticsReport> {
        let report = self.gateway.probe_resources().await?;
        tracing::info!(
            channels = report.channels_status,
            contacts = report.contacts_status,
            messages = report.messages_status,
            "Gateway diagnostics"
        );
        Ok(report)
    }

    fn emit(&self, event: WorkerEvent) {
        // Nobody may be listening; events are best effort.
        let _ = self.event_tx.try_send(event);
    }
}
