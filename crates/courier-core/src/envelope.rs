use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("phone number and message are required")]
    MissingSendFields,
    #[error("webhook url is required")]
    MissingWebhookUrl,
    #[error("request body is not a valid webhook payload")]
    MalformedWebhook,
}

const PHONE_KEYS: [&str; 3] = ["phone", "phone_number", "phoneNumber"];
const MESSAGE_KEYS: [&str; 2] = ["message", "messageText"];

/// Client request for `/send-message`.
///
/// Each field may arrive under any of its aliases; the first non-blank one
/// wins. Numbers are read as their decimal text. Anything that is not a JSON
/// object reads as an empty request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendMessageRequest {
    pub phone: Option<String>,
    pub message: Option<String>,
}

impl<'de> Deserialize<'de> for SendMessageRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Self::from_value(&v))
    }
}

/// A send request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingText {
    pub to: String,
    pub body: String,
}

impl SendMessageRequest {
    pub fn from_value(value: &Value) -> Self {
        Self {
            phone: first_present(value, &PHONE_KEYS),
            message: first_present(value, &MESSAGE_KEYS),
        }
    }

    pub fn validate(&self) -> Result<OutgoingText, ValidationError> {
        let to = non_blank(self.phone.as_deref()).ok_or(ValidationError::MissingSendFields)?;
        let body = self
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or(ValidationError::MissingSendFields)?;
        Ok(OutgoingText {
            to: to.to_string(),
            body: body.to_string(),
        })
    }
}

/// Client request for `/update-webhook` and `/setup-webhook`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookUrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl WebhookUrlRequest {
    pub fn validate(&self) -> Result<String, ValidationError> {
        non_blank(self.url.as_deref())
            .map(str::to_string)
            .ok_or(ValidationError::MissingWebhookUrl)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn first_present(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(scalar_text))
        .find(|text| !text.trim().is_empty())
}

/// Reads a JSON string or number as text. Other values yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// JSON envelope returned to clients: `{"status": ..., "message"?, "data"?, "stored"?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReply {
    pub status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored: Option<bool>,
}

impl StatusReply {
    pub fn success() -> Self {
        Self {
            status: ReplyStatus::Success,
            message: None,
            data: None,
            stored: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            message: Some(message.into()),
            data: None,
            stored: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_stored(mut self, stored: bool) -> Self {
        self.stored = Some(stored);
        self
    }
}

/// Result of probing the gateway's channel, contact and message resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub channels_status: u16,
    pub channels_data: Option<Value>,
    pub contacts_status: u16,
    pub contacts_data: Option<Value>,
    pub messages_status: u16,
    pub messages_data: Option<Value>,
}
