//! FHIR DSTU2 `MessageHeader` resource.
//!
//! The header is the first entry of every message bundle. It names the event, the sender and the
//! receivers, and, for replies, the `response` element linking back to the request.

use crate::datatypes::{Coding, Reference};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Event that triggered the message, e.g. `DvaNotifR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Coding>,

    /// Present only when this message is a reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<MessageResponse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<MessageSource>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destination: Vec<MessageDestination>,

    /// The actual content of the message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Reference>,
}

impl MessageHeader {
    /// Returns the event code, if any.
    pub fn event_code(&self) -> Option<&str> {
        self.event.as_ref().and_then(|e| e.code.as_deref())
    }
}

/// Links a reply to the message it answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Id of the original message.
    pub identifier: String,
    pub code: ResponseCode,
}

/// Outcome of processing the original message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseCode {
    Ok,
    TransientError,
    FatalError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl MessageSource {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            endpoint: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDestination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl MessageDestination {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            endpoint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reply_header() {
        let input = r#"{
            "id": "50cce60c-00b6-499e-84f0-3ee085d6f75d",
            "timestamp": "2017-10-10T14:22:16+01:00",
            "event": {
                "system": "https://digitalhealthplatform.scot/fhir/messagetypes",
                "code": "DvaNotif_Response"
            },
            "response": { "identifier": "abc", "code": "ok" },
            "source": { "name": "DHP" },
            "destination": [ { "name": "NSS HUB" } ]
        }"#;

        let header: MessageHeader = serde_json::from_str(input).expect("parse header");
        assert_eq!(header.event_code(), Some("DvaNotif_Response"));
        let response = header.response.expect("response element");
        assert_eq!(response.identifier, "abc");
        assert_eq!(response.code, ResponseCode::Ok);
        assert_eq!(
            header.timestamp.map(|t| t.to_rfc3339()),
            Some("2017-10-10T13:22:16+00:00".to_string())
        );
        assert!(header.data.is_empty());
    }

    #[test]
    fn response_code_wire_names() {
        for (code, wire) in [
            (ResponseCode::Ok, "\"ok\""),
            (ResponseCode::TransientError, "\"transient-error\""),
            (ResponseCode::FatalError, "\"fatal-error\""),
        ] {
            assert_eq!(serde_json::to_string(&code).expect("serialize code"), wire);
            let parsed: ResponseCode = serde_json::from_str(wire).expect("parse code");
            assert_eq!(parsed, code);
        }
    }

    #[test]
    fn rejects_unknown_response_code() {
        let err = serde_json::from_str::<ResponseCode>("\"OK\"")
            .expect_err("codes are case sensitive");
        assert!(err.to_string().contains("unknown variant"));
    }
}
