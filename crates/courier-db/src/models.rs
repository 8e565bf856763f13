use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// One stored message. The direction is written to the `type` field and
/// decides whether the counterpart is serialized as `to` or `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageRecord {
    Outgoing {
        #[serde(default, deserialize_with = "null_as_empty")]
        id: String,
        to: String,
        #[serde(default, deserialize_with = "null_as_empty")]
        text: String,
        timestamp: String,
    },
    Incoming {
        #[serde(default, deserialize_with = "null_as_empty")]
        id: String,
        #[serde(default, deserialize_with = "null_as_empty")]
        from: String,
        #[serde(default, deserialize_with = "null_as_empty")]
        text: String,
        timestamp: String,
    },
}

impl MessageRecord {
    pub fn outgoing(id: &str, to: &str, text: &str) -> Self {
        Self::Outgoing {
            id: id.to_string(),
            to: to.to_string(),
            text: text.to_string(),
            timestamp: local_timestamp(),
        }
    }

    pub fn incoming(id: &str, from: &str, text: &str) -> Self {
        Self::Incoming {
            id: id.to_string(),
            from: from.to_string(),
            text: text.to_string(),
            timestamp: local_timestamp(),
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Outgoing { .. } => Direction::Outgoing,
            Self::Incoming { .. } => Direction::Incoming,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Outgoing { id, .. } | Self::Incoming { id, .. } => id,
        }
    }

    /// Phone number on the other side of the conversation.
    pub fn counterpart(&self) -> &str {
        match self {
            Self::Outgoing { to, .. } => to,
            Self::Incoming { from, .. } => from,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Outgoing { text, .. } | Self::Incoming { text, .. } => text,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            Self::Outgoing { timestamp, .. } | Self::Incoming { timestamp, .. } => timestamp,
        }
    }
}

/// The whole persisted document: `{"messages": [...]}` in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

impl MessageLog {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// Early logs wrote `null` when the gateway omitted a field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// ISO-8601 local time with microseconds, taken when a record is created.
pub fn local_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outgoing_record_uses_to_field() {
        let record = MessageRecord::outgoing("wamid.ABC", "15551234567", "hello");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "outgoing");
        assert_eq!(value["to"], "15551234567");
        assert_eq!(value["id"], "wamid.ABC");
        assert!(value.get("from").is_none());
    }

    #[test]
    fn incoming_record_uses_from_field() {
        let record = MessageRecord::incoming("m1", "15550001111", "hi");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "incoming");
        assert_eq!(value["from"], "15550001111");
        assert!(value.get("to").is_none());
        assert_eq!(record.direction(), Direction::Incoming);
        assert_eq!(record.counterpart(), "15550001111");
    }

    #[test]
    fn parses_documents_written_by_older_deployments() {
        let log: MessageLog = serde_json::from_value(json!({
            "messages": [
                {"id": "wamid.1", "to": "1555", "text": "hey", "timestamp": "2024-05-01T10:00:00.000001", "type": "outgoing"},
                {"id": null, "from": "1666", "text": "", "timestamp": "2024-05-01T10:01:00", "type": "incoming"}
            ]
        }))
        .unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.messages[0].direction(), Direction::Outgoing);
        assert_eq!(log.messages[1].counterpart(), "1666");
        assert_eq!(log.messages[1].timestamp(), "2024-05-01T10:01:00");
    }

    #[test]
    fn timestamp_is_iso8601() {
        let ts = local_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok(), "{ts}");
    }
}
