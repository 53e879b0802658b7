//! FHIR DSTU2 `DocumentReference` resource.

use crate::datatypes::Attachment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Document creation time. A DSTU2 `dateTime`, which may be partial, so kept as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// When this reference was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexed: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentReferenceStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<DocumentContent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentReferenceStatus {
    Current,
    Superseded,
    EnteredInError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub attachment: Attachment,
}
