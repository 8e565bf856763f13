use serde::{Deserialize, Serialize};

/// Header carrying the gateway credential on every upstream request.
pub const API_KEY_HEADER: &str = "D360-API-KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTextPayload {
    pub messaging_product: String,
    pub recipient_type: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: TextBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

impl SendTextPayload {
    pub fn text(to: &str, body: &str) -> Self {
        Self {
            messaging_product: "whatsapp".to_string(),
            recipient_type: "individual".to_string(),
            to: to.to_string(),
            kind: "text".to_string(),
            text: TextBody {
                body: body.to_string(),
            },
        }
    }
}

/// Successful reply to a send. Everything but the message ids is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendTextResponse {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageRef {
    #[serde(default)]
    pub id: String,
}

impl SendTextResponse {
    pub fn first_id(&self) -> &str {
        self.messages.first().map(|m| m.id.as_str()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfigPayload {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}
