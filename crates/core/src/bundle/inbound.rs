//! Sample inbound `DvaNotifR` notification.
//!
//! This is the message a partner sends to `POST /Bundle`. It is used by the CLI `inbound` and
//! `notify` commands and by tests that drive the receiver end to end.

use super::fixtures::*;
use super::literal::{dermatology_appointment, patient};
use chrono::{DateTime, Utc};
use fhir::{urn_uuid, Bundle, Coding, MessageDestination, MessageHeader, MessageSource, Reference};

/// Build the sample notification: header, appointment and patient.
///
/// The patient carries no identifier and no care provider. The header id doubles as the
/// correlation id of the delayed response.
pub fn inbound_notification(now: DateTime<Utc>) -> Bundle {
    let header = MessageHeader {
        id: Some(MESSAGE_HEADER_ID.into()),
        timestamp: Some(now),
        event: Some(Coding::new(MESSAGE_TYPES_SYSTEM, NOTIFICATION_EVENT)),
        response: None,
        source: Some(MessageSource::named(SOURCE_NAME)),
        destination: vec![MessageDestination::named(NOTIFICATION_DESTINATION_NAME)],
        data: vec![
            Reference::to(urn_uuid(APPOINTMENT_ID)),
            Reference::to(urn_uuid(PATIENT_ID)),
        ],
    };

    let mut bundle = Bundle::message(BUNDLE_ID);
    bundle
        .add_entry(header)
        .add_entry(dermatology_appointment(now))
        .add_entry(patient());
    bundle
}
