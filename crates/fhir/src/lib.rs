//! FHIR DSTU2 wire support for the DVA notification provider.
//!
//! This crate provides **wire models** and **JSON helpers** for the small slice of FHIR the
//! DVA messaging exchange uses:
//! - `Bundle` with typed entries
//! - `MessageHeader`, `Patient`, `Organization`, `Appointment`, `DocumentReference`
//! - the complex datatypes those resources need
//!
//! This crate focuses on:
//! - structural (de)serialisation of FHIR JSON
//! - readable errors with field paths when an inbound payload does not match
//!
//! It does not validate clinical content, and it does not talk to the network.

pub mod appointment;
pub mod bundle;
pub mod datatypes;
pub mod document_reference;
pub mod message_header;
pub mod organization;
pub mod patient;

// Re-export resources
pub use appointment::{Appointment, AppointmentParticipant, AppointmentStatus};
pub use bundle::{Bundle, BundleEntry, BundleType, EntryResource, Resource};
pub use document_reference::{DocumentContent, DocumentReference, DocumentReferenceStatus};
pub use message_header::{
    MessageDestination, MessageHeader, MessageResponse, MessageSource, ResponseCode,
};
pub use organization::Organization;
pub use patient::{Patient, PatientContact};

// Re-export datatypes
pub use datatypes::{
    strip_urn_uuid, urn_uuid, Attachment, CodeableConcept, Coding, ContactPoint,
    ContactPointSystem, ContactPointUse, HumanName, Identifier, Reference,
};

/// MIME type for FHIR DSTU2 JSON.
pub const FHIR_JSON_MIME: &str = "application/json+fhir";

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
