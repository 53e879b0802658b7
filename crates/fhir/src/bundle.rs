//! FHIR DSTU2 `Bundle` and the resource union carried in its entries.
//!
//! Responsibilities:
//! - Define the bundle container and its typed entries
//! - Parse inbound JSON with a field path on schema mismatches
//! - Render bundles as compact or pretty JSON
//!
//! Notes:
//! - Entries whose resource type is outside the modelled subset are kept as opaque JSON, so a
//!   partner may send richer bundles than this crate understands
//! - The top-level `resourceType` must be `Bundle`; anything else is rejected

use crate::appointment::Appointment;
use crate::datatypes::{strip_urn_uuid, urn_uuid};
use crate::document_reference::DocumentReference;
use crate::message_header::MessageHeader;
use crate::organization::Organization;
use crate::patient::Patient;
use crate::{FhirError, FhirResult};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Resources
// ============================================================================

/// The resources this crate understands, tagged by `resourceType` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    MessageHeader(MessageHeader),
    Patient(Patient),
    Organization(Organization),
    Appointment(Appointment),
    DocumentReference(DocumentReference),
}

impl Resource {
    /// Logical id of the resource.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::MessageHeader(r) => r.id.as_deref(),
            Self::Patient(r) => r.id.as_deref(),
            Self::Organization(r) => r.id.as_deref(),
            Self::Appointment(r) => r.id.as_deref(),
            Self::DocumentReference(r) => r.id.as_deref(),
        }
    }

    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::MessageHeader(_) => "MessageHeader",
            Self::Patient(_) => "Patient",
            Self::Organization(_) => "Organization",
            Self::Appointment(_) => "Appointment",
            Self::DocumentReference(_) => "DocumentReference",
        }
    }
}

macro_rules! impl_from_resource {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Resource {
                fn from(value: $ty) -> Self {
                    Self::$ty(value)
                }
            }
        )*
    };
}

impl_from_resource!(
    MessageHeader,
    Patient,
    Organization,
    Appointment,
    DocumentReference
);

/// Resource held by a bundle entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryResource {
    Known(Resource),
    /// Any resource outside the modelled subset, kept verbatim.
    Opaque(serde_json::Value),
}

impl EntryResource {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Known(r) => r.id(),
            Self::Opaque(v) => v.get("id").and_then(|id| id.as_str()),
        }
    }

    pub fn resource_type(&self) -> Option<&str> {
        match self {
            Self::Known(r) => Some(r.resource_type()),
            Self::Opaque(v) => v.get("resourceType").and_then(|t| t.as_str()),
        }
    }

    pub fn as_known(&self) -> Option<&Resource> {
        match self {
            Self::Known(r) => Some(r),
            Self::Opaque(_) => None,
        }
    }
}

impl From<Resource> for EntryResource {
    fn from(value: Resource) -> Self {
        Self::Known(value)
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// Purpose of a bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    Searchset,
    Collection,
}

/// Marker for the top-level `"resourceType": "Bundle"` member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct BundleResourceType;

impl Serialize for BundleResourceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("Bundle")
    }
}

impl<'de> Deserialize<'de> for BundleResourceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == "Bundle" {
            Ok(Self)
        } else {
            Err(de::Error::invalid_value(Unexpected::Str(&s), &"Bundle"))
        }
    }
}

/// A container for a collection of resources.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "resourceType")]
    resource_type: BundleResourceType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub type_: BundleType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// Bundle-local identity of the resource, usually `urn:uuid:<id>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<EntryResource>,
}

impl BundleEntry {
    /// Identity of the entry: the resource id, or the `fullUrl` without its `urn:uuid:` prefix.
    pub fn identity(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(EntryResource::id)
            .or_else(|| self.full_url.as_deref().map(strip_urn_uuid))
            .filter(|id| !id.trim().is_empty())
    }
}

impl Bundle {
    /// Creates an empty bundle of the given type.
    pub fn new(type_: BundleType) -> Self {
        Self {
            resource_type: BundleResourceType,
            id: None,
            type_,
            entry: Vec::new(),
        }
    }

    /// Creates an empty message bundle with the given id.
    pub fn message(id: impl Into<String>) -> Self {
        Self::new(BundleType::Message).with_id(id)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Appends an entry whose `fullUrl` is `urn:uuid:<resource id>`.
    ///
    /// Resources without an id get an entry without `fullUrl`.
    pub fn add_entry(&mut self, resource: impl Into<Resource>) -> &mut Self {
        let resource = resource.into();
        let full_url = resource.id().map(urn_uuid);
        self.entry.push(BundleEntry {
            full_url,
            resource: Some(EntryResource::Known(resource)),
        });
        self
    }

    pub fn first_entry(&self) -> Option<&BundleEntry> {
        self.entry.first()
    }

    /// Known resources in entry order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry
            .iter()
            .filter_map(|e| e.resource.as_ref())
            .filter_map(EntryResource::as_known)
    }

    /// Ids of all entry resources, in entry order, skipping resources without one.
    pub fn resource_ids(&self) -> Vec<&str> {
        self.entry
            .iter()
            .filter_map(|e| e.resource.as_ref())
            .filter_map(EntryResource::id)
            .collect()
    }

    /// The first `MessageHeader` among the entries.
    pub fn message_header(&self) -> Option<&MessageHeader> {
        self.resources().find_map(|r| match r {
            Resource::MessageHeader(h) => Some(h),
            _ => None,
        })
    }

    pub fn message_header_mut(&mut self) -> Option<&mut MessageHeader> {
        self.entry.iter_mut().find_map(|e| match e.resource.as_mut() {
            Some(EntryResource::Known(Resource::MessageHeader(h))) => Some(h),
            _ => None,
        })
    }

    /// Parse a bundle from JSON text.
    ///
    /// This uses `serde_path_to_error` so that schema mismatches name the failing field
    /// (e.g. `type`).
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not JSON,
    /// - the top-level `resourceType` is missing or is not `Bundle`,
    /// - a bundle-level field has an unexpected type or value.
    pub fn from_json(text: &str) -> FhirResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(text);
        let bundle = serde_path_to_error::deserialize::<_, Bundle>(&mut deserializer)
            .map_err(schema_mismatch)?;
        deserializer.end()?;
        Ok(bundle)
    }

    /// Parse a bundle from an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> FhirResult<Self> {
        serde_path_to_error::deserialize::<_, Bundle>(value).map_err(schema_mismatch)
    }

    /// Render as compact JSON.
    pub fn to_json(&self) -> FhirResult<String> {
        serde_json::to_string(self)
            .map_err(|e| FhirError::Translation(format!("Failed to serialize bundle: {e}")))
    }

    /// Render as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> FhirResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FhirError::Translation(format!("Failed to serialize bundle: {e}")))
    }
}

fn schema_mismatch(err: serde_path_to_error::Error<serde_json::Error>) -> FhirError {
    let path = err.path().to_string();
    let source = err.into_inner();
    if source.is_syntax() || source.is_eof() {
        return FhirError::InvalidJson(source);
    }
    let path = if path.is_empty() || path == "." {
        "<root>"
    } else {
        path.as_str()
    };
    FhirError::Translation(format!("Bundle schema mismatch at {path}: {source}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{Coding, Reference};
    use crate::message_header::{MessageResponse, ResponseCode};

    const INBOUND: &str = r#"{
        "resourceType": "Bundle",
        "id": "32e975e8-1002-4ece-9b50-48b62fac106a",
        "type": "message",
        "entry": [
            {
                "fullUrl": "urn:uuid:50cce60c-00b6-499e-84f0-3ee085d6f75d",
                "resource": {
                    "resourceType": "MessageHeader",
                    "id": "50cce60c-00b6-499e-84f0-3ee085d6f75d",
                    "event": { "system": "https://digitalhealthplatform.scot/fhir/messagetypes", "code": "DvaNotifR" },
                    "source": { "name": "DHP" },
                    "destination": [ { "name": "Lenus" } ],
                    "data": [ { "reference": "urn:uuid:5e4901f7-0439-4c02-8c1a-2a10f6182836" } ]
                }
            },
            {
                "fullUrl": "urn:uuid:5e4901f7-0439-4c02-8c1a-2a10f6182836",
                "resource": {
                    "resourceType": "Patient",
                    "id": "5e4901f7-0439-4c02-8c1a-2a10f6182836",
                    "name": [ { "family": ["User"], "given": ["Jane"] } ]
                }
            },
            {
                "fullUrl": "urn:uuid:0b3c1d0e-0000-4000-8000-000000000001",
                "resource": {
                    "resourceType": "Practitioner",
                    "id": "0b3c1d0e-0000-4000-8000-000000000001"
                }
            }
        ]
    }"#;

    #[test]
    fn parses_inbound_notification() {
        let bundle = Bundle::from_json(INBOUND).expect("parse bundle");
        assert_eq!(
            bundle.id.as_deref(),
            Some("32e975e8-1002-4ece-9b50-48b62fac106a")
        );
        assert_eq!(bundle.type_, BundleType::Message);
        assert_eq!(bundle.entry.len(), 3);
        assert_eq!(
            bundle.message_header().and_then(|h| h.event_code()),
            Some("DvaNotifR")
        );
    }

    #[test]
    fn keeps_unknown_resources_opaque() {
        let bundle = Bundle::from_json(INBOUND).expect("parse bundle");
        let practitioner = bundle.entry[2].resource.as_ref().expect("resource");
        assert!(practitioner.as_known().is_none());
        assert_eq!(practitioner.resource_type(), Some("Practitioner"));
        assert_eq!(
            bundle.resource_ids(),
            vec![
                "50cce60c-00b6-499e-84f0-3ee085d6f75d",
                "5e4901f7-0439-4c02-8c1a-2a10f6182836",
                "0b3c1d0e-0000-4000-8000-000000000001",
            ]
        );

        let rendered = bundle.to_json().expect("render");
        let reparsed = Bundle::from_json(&rendered).expect("reparse");
        assert_eq!(bundle, reparsed);
    }

    #[test]
    fn rejects_other_top_level_resource_types() {
        let err = Bundle::from_json(r#"{"resourceType":"Patient","type":"message"}"#)
            .expect_err("should reject non-bundle");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("resourceType")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn reports_path_of_bad_bundle_type() {
        let err = Bundle::from_json(r#"{"resourceType":"Bundle","type":"letter"}"#)
            .expect_err("should reject unknown bundle type");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("at type")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Bundle::from_json("{\"resourceType\": ").expect_err("should reject");
        assert!(matches!(err, FhirError::InvalidJson(_)));
    }

    #[test]
    fn entry_identity_falls_back_to_full_url() {
        let entry = BundleEntry {
            full_url: Some("urn:uuid:abc".into()),
            resource: Some(EntryResource::Known(Resource::Patient(Patient::default()))),
        };
        assert_eq!(entry.identity(), Some("abc"));

        let empty = BundleEntry::default();
        assert_eq!(empty.identity(), None);
    }

    #[test]
    fn add_entry_uses_urn_full_url_and_header_is_mutable() {
        let mut bundle = Bundle::message("b1");
        bundle.add_entry(MessageHeader {
            id: Some("h1".into()),
            event: Some(Coding::new("urn:test", "evt")),
            response: Some(MessageResponse {
                identifier: "placeholder".into(),
                code: ResponseCode::Ok,
            }),
            data: vec![Reference::to("urn:uuid:p1")],
            ..Default::default()
        });
        assert_eq!(bundle.entry[0].full_url.as_deref(), Some("urn:uuid:h1"));

        if let Some(response) = bundle
            .message_header_mut()
            .and_then(|h| h.response.as_mut())
        {
            response.identifier = "patched".into();
        }
        assert_eq!(
            bundle
                .message_header()
                .and_then(|h| h.response.as_ref())
                .map(|r| r.identifier.as_str()),
            Some("patched")
        );
    }
}
