use crate::error::{GatewayError, Result};

const MESSAGES: &str = "/v1/messages";
const WEBHOOK_CONFIG: &str = "/v1/configs/webhook";
const CHANNELS: &str = "/v1/channels";
const CONTACTS: &str = "/v1/contacts";

pub(crate) fn validated_base(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| GatewayError::InvalidBaseUrl(raw.to_string()))?;
    if host.is_empty() || host.starts_with('/') {
        return Err(GatewayError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn messages(base: &str) -> String {
    format!("{base}{MESSAGES}")
}

pub(crate) fn webhook_config(base: &str) -> String {
    format!("{base}{WEBHOOK_CONFIG}")
}

pub(crate) fn channels(base: &str) -> String {
    format!("{base}{CHANNELS}")
}

pub(crate) fn contacts(base: &str) -> String {
    format!("{base}{CONTACTS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        assert_eq!(
            validated_base("https://waba.example.com/").unwrap(),
            "https://waba.example.com"
        );
        assert_eq!(
            messages(&validated_base(" http://127.0.0.1:9000// ").unwrap()),
            "http://127.0.0.1:9000/v1/messages"
        );
    }

    #[test]
    fn rejects_non_http_bases() {
        for raw in ["", "waba.example.com", "ftp://waba.example.com", "https://", "https:///v1"] {
            assert!(
                matches!(validated_base(raw), Err(GatewayError::InvalidBaseUrl(_))),
                "{raw}"
            );
        }
    }
}
