use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::Response;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use courier_core::{API_KEY_HEADER, DiagnosticsReport, SendTextPayload, WebhookConfigPayload};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::urls;

/// Upstream status code and body, exactly as the gateway answered.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    pub status: u16,
    pub body: Value,
}

impl GatewayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body rendered as text, for relaying upstream errors.
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Body when the gateway answered exactly 200, else `None`.
    pub fn ok_body(&self) -> Option<Value> {
        (self.status == 200).then(|| self.body.clone())
    }
}

/// Authenticated client for the WhatsApp Business gateway.
///
/// No retries and no explicit timeout; callers see the transport defaults.
pub struct GatewayClient {
    base_url: String,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        if cfg.api_key.trim().is_empty() {
            return Err(GatewayError::InvalidInput("api_key"));
        }
        let base_url = urls::validated_base(&cfg.base_url)?;

        let mut api_key = HeaderValue::from_str(cfg.api_key.trim())
            .map_err(|_| GatewayError::InvalidInput("api_key"))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let header = HeaderName::from_bytes(API_KEY_HEADER.as_bytes())
            .map_err(|_| GatewayError::InvalidInput("api_key header"))?;
        headers.insert(header, api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent)
            .default_headers(headers)
            .build()?;

        debug!(base_url = %base_url, "Gateway client ready");
        Ok(Self { base_url, http })
    }

    pub async fn send_text(&self, to: &str, body: &str) -> Result<GatewayReply> {
        let payload = SendTextPayload::text(to, body);
        self.post(urls::messages(&self.base_url), &payload).await
    }

    pub async fn webhook(&self) -> Result<GatewayReply> {
        self.get(urls::webhook_config(&self.base_url)).await
    }

    /// Points the gateway's callbacks at `url`. With `enable` the request also
    /// switches delivery on.
    pub async fn set_webhook(&self, url: &str, enable: bool) -> Result<GatewayReply> {
        let payload = WebhookConfigPayload {
            url: url.to_string(),
            enabled: enable.then_some(true),
        };
        self.post(urls::webhook_config(&self.base_url), &payload).await
    }

    pub async fn probe_messages(&self) -> Result<GatewayReply> {
        self.get(urls::messages(&self.base_url)).await
    }

    pub async fn probe_resources(&self) -> Result<DiagnosticsReport> {
        info!("Probing gateway resources");
        let channels = self.get(urls::channels(&self.base_url)).await?;
        let contacts = self.get(urls::contacts(&self.base_url)).await?;
        let messages = self.probe_messages().await?;

        Ok(DiagnosticsReport {
            channels_status: channels.status,
            channels_data: channels.ok_body(),
            contacts_status: contacts.status,
            contacts_data: contacts.ok_body(),
            messages_status: messages.status,
            messages_data: messages.ok_body(),
        })
    }

    async fn get(&self, url: String) -> Result<GatewayReply> {
        debug!(method = "GET", url = %url, "Calling gateway");
        let resp = self.http.get(url).send().await?;
        read_reply(resp).await
    }

    async fn post<T: Serialize>(&self, url: String, payload: &T) -> Result<GatewayReply> {
        debug!(method = "POST", url = %url, "Calling gateway");
        let resp = self.http.post(url).json(payload).send().await?;
        read_reply(resp).await
    }
}

async fn read_reply(resp: Response) -> Result<GatewayReply> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    debug!(status, len = text.len(), "Gateway replied");

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Ok(GatewayReply { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubGateway, unreachable_base_url};
    use serde_json::json;

    fn client_for(base_url: &str) -> GatewayClient {
        GatewayClient::new(GatewayConfig::new(base_url, "test-key")).expect("client")
    }

    #[test]
    fn rejects_blank_api_key() {
        let result = GatewayClient::new(GatewayConfig::new("https://waba.example.com", " "));
        assert!(matches!(result, Err(GatewayError::InvalidInput("api_key"))));
    }

    #[tokio::test]
    async fn send_text_posts_whatsapp_payload_with_api_key() {
        let stub = StubGateway::spawn(vec![(
            "POST",
            "/v1/messages",
            200,
            json!({"messages": [{"id": "wamid.ABC"}]}),
        )])
        .await;
        let client = client_for(&stub.base_url);

        let reply = client.send_text("15551234567", "hello").await.unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.body["messages"][0]["id"], "wamid.ABC");

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].api_key.as_deref(), Some("test-key"));
        assert_eq!(requests[0].body["to"], "15551234567");
        assert_eq!(requests[0].body["type"], "text");
        assert_eq!(requests[0].body["text"]["body"], "hello");
        stub.stop().await;
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_as_text() {
        let stub = StubGateway::spawn(vec![(
            "POST",
            "/v1/messages",
            401,
            json!("invalid api key"),
        )])
        .await;
        let client = client_for(&stub.base_url);

        let reply = client.send_text("1555", "hi").await.unwrap();
        assert_eq!(reply.status, 401);
        assert!(!reply.is_success());
        assert_eq!(reply.body_text(), "invalid api key");
        stub.stop().await;
    }

    #[tokio::test]
    async fn webhook_setup_sends_enabled_flag_only_when_asked() {
        let stub = StubGateway::spawn(vec![
            ("POST", "/v1/configs/webhook", 200, json!({"url": "https://hook"})),
            ("GET", "/v1/configs/webhook", 200, json!({"url": "https://hook"})),
        ])
        .await;
        let client = client_for(&stub.base_url);

        client.set_webhook("https://hook", false).await.unwrap();
        client.set_webhook("https://hook", true).await.unwrap();
        let current = client.webhook().await.unwrap();
        assert_eq!(current.body["url"], "https://hook");

        let requests = stub.requests();
        assert_eq!(requests[0].body, json!({"url": "https://hook"}));
        assert_eq!(requests[1].body, json!({"url": "https://hook", "enabled": true}));
        assert_eq!(requests[2].method, "GET");
        stub.stop().await;
    }

    #[tokio::test]
    async fn probe_resources_keeps_data_only_for_200() {
        let stub = StubGateway::spawn(vec![
            ("GET", "/v1/channels", 200, json!({"channels": []})),
            ("GET", "/v1/contacts", 403, json!({"error": "forbidden"})),
            ("GET", "/v1/messages", 200, json!({"messages": []})),
        ])
        .await;
        let client = client_for(&stub.base_url);

        let report = client.probe_resources().await.unwrap();
        assert_eq!(report.channels_status, 200);
        assert_eq!(report.channels_data, Some(json!({"channels": []})));
        assert_eq!(report.contacts_status, 403);
        assert_eq!(report.contacts_data, None);
        assert_eq!(report.messages_data, Some(json!({"messages": []})));

        let paths: Vec<_> = stub.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, ["/v1/channels", "/v1/contacts", "/v1/messages"]);
        stub.stop().await;
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_transport_error() {
        let client = client_for(&unreachable_base_url().await);
        let err = client.webhook().await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
