use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::envelope::scalar_text;

/// Callback body the gateway posts to `/webhook`.
///
/// Only the `messages` list is consumed. Other callback kinds (delivery
/// statuses, contacts) arrive without it and deserialize to an empty batch.
/// The body must be a JSON object; inside it every `messages` entry is kept,
/// whatever its shape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WebhookBatch {
    pub messages: Vec<InboundMessage>,
}

impl<'de> Deserialize<'de> for WebhookBatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let object = value
            .as_object()
            .ok_or_else(|| D::Error::custom("webhook body must be a JSON object"))?;

        let messages = match object.get("messages") {
            Some(Value::Array(entries)) => entries.iter().map(InboundMessage::from_value).collect(),
            _ => Vec::new(),
        };
        Ok(Self { messages })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: Option<String>,
    pub from: Option<String>,
    pub text: Option<InboundText>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundText {
    pub body: Option<String>,
}

impl InboundMessage {
    /// Reads one batch entry. Scalar `id` and `from` become text; anything
    /// else is treated as absent.
    pub fn from_value(entry: &Value) -> Self {
        let field = |key: &str| entry.get(key).and_then(scalar_text);
        Self {
            id: field("id"),
            from: field("from"),
            text: entry.get("text").map(|text| InboundText {
                body: text.get("body").and_then(scalar_text),
            }),
        }
    }

    /// Text body, empty when the entry carries no text object or no body.
    pub fn body(&self) -> &str {
        self.text
            .as_ref()
            .and_then(|t| t.body.as_deref())
            .unwrap_or_default()
    }
}

impl WebhookBatch {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_without_messages_is_empty() {
        let batch: WebhookBatch =
            serde_json::from_str(r#"{"statuses":[{"id":"wamid.1","status":"read"}]}"#).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn missing_text_reads_as_empty_body() {
        let batch: WebhookBatch = serde_json::from_str(
            r#"{"messages":[{"id":"m1","from":"1555"},{"id":"m2","from":"1555","text":{}}]}"#,
        )
        .unwrap();
        assert_eq!(batch.messages.len(), 2);
        assert_eq!(batch.messages[0].body(), "");
        assert_eq!(batch.messages[1].body(), "");
    }

    #[test]
    fn odd_entries_stay_in_the_batch() {
        let batch: WebhookBatch = serde_json::from_str(
            r#"{"messages":[
                {"id":"m1","from":"15550001111","text":{"body":"hi"}},
                {"id":"m2","from":15550002222,"text":{"body":"yo"}},
                {"id":null,"from":{"wa_id":"1555"},"text":"plain"},
                "not an object"
            ]}"#,
        )
        .unwrap();
        assert_eq!(batch.messages.len(), 4);
        assert_eq!(batch.messages[1].from.as_deref(), Some("15550002222"));
        assert_eq!(batch.messages[1].body(), "yo");
        assert_eq!(batch.messages[2].id, None);
        assert_eq!(batch.messages[2].from, None);
        assert_eq!(batch.messages[2].body(), "");
        assert_eq!(batch.messages[3].body(), "");
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(serde_json::from_str::<WebhookBatch>("[]").is_err());
        assert!(serde_json::from_str::<WebhookBatch>("\"hi\"").is_err());
        assert!(serde_json::from_str::<WebhookBatch>("not json").is_err());
    }

    #[test]
    fn nested_body_is_extracted() {
        let batch: WebhookBatch = serde_json::from_str(
            r#"{"messages":[{"id":"m1","from":"15550001111","type":"text","text":{"body":"hi"}}]}"#,
        )
        .unwrap();
        let msg = &batch.messages[0];
        assert_eq!(msg.id.as_deref(), Some("m1"));
        assert_eq!(msg.from.as_deref(), Some("15550001111"));
        assert_eq!(msg.body(), "hi");
    }
}
