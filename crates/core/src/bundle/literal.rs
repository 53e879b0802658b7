//! Literal construction of the outbound notification bundle.
//!
//! Every resource is built field by field from [`super::fixtures`]. Only the response
//! identifier and the timestamps vary between calls.

use super::fixtures::*;
use chrono::{DateTime, Utc};
use fhir::{
    urn_uuid, Appointment, AppointmentParticipant, AppointmentStatus, Attachment, Bundle,
    CodeableConcept, Coding, ContactPoint, ContactPointSystem, ContactPointUse, DocumentContent,
    DocumentReference, DocumentReferenceStatus, HumanName, Identifier, MessageDestination,
    MessageHeader, MessageResponse, MessageSource, Organization, Patient, PatientContact,
    Reference, ResponseCode,
};

/// Build the five-entry outbound bundle.
///
/// Entries, in order: message header, document reference, appointment, patient, organization.
///
/// # Arguments
///
/// * `correlation_id` - Written to `MessageHeader.response.identifier`. Falls back to
///   [`DEFAULT_RESPONSE_IDENTIFIER`] when `None`.
/// * `now` - Build time, used for the header timestamp, the document index time and both
///   appointment times.
pub fn literal_bundle(correlation_id: Option<&str>, now: DateTime<Utc>) -> Bundle {
    let mut bundle = Bundle::message(BUNDLE_ID);
    bundle
        .add_entry(response_header(
            correlation_id.unwrap_or(DEFAULT_RESPONSE_IDENTIFIER),
            now,
        ))
        .add_entry(consultant_report(now))
        .add_entry(dermatology_appointment(now))
        .add_entry(patient_with_care_provider())
        .add_entry(organization());
    bundle
}

fn response_header(correlation_id: &str, now: DateTime<Utc>) -> MessageHeader {
    MessageHeader {
        id: Some(MESSAGE_HEADER_ID.into()),
        timestamp: Some(now),
        event: Some(Coding::new(MESSAGE_TYPES_SYSTEM, RESPONSE_EVENT)),
        response: Some(MessageResponse {
            identifier: correlation_id.to_string(),
            code: ResponseCode::Ok,
        }),
        source: Some(MessageSource::named(SOURCE_NAME)),
        destination: vec![MessageDestination::named(RESPONSE_DESTINATION_NAME)],
        data: vec![
            Reference::to(urn_uuid(APPOINTMENT_ID)),
            Reference::to(urn_uuid(PATIENT_ID)),
        ],
    }
}

fn consultant_report(now: DateTime<Utc>) -> DocumentReference {
    DocumentReference {
        id: Some(DOCUMENT_REFERENCE_ID.into()),
        created: None,
        indexed: Some(now),
        status: Some(DocumentReferenceStatus::Current),
        description: Some(REPORT_TITLE.into()),
        content: vec![DocumentContent {
            attachment: Attachment {
                content_type: Some(PDF_MIME.into()),
                data: Some(consultant_report_pdf().to_string()),
                title: Some(REPORT_TITLE.into()),
            },
        }],
    }
}

/// The dermatology appointment for the fixture patient.
///
/// Start and end are both `now`. Partner fixtures have always carried a zero-length
/// appointment, so this is kept rather than inventing a duration.
pub(crate) fn dermatology_appointment(now: DateTime<Utc>) -> Appointment {
    Appointment {
        id: Some(APPOINTMENT_ID.into()),
        status: Some(AppointmentStatus::Booked),
        type_: Some(CodeableConcept::text(APPOINTMENT_TYPE)),
        description: Some(APPOINTMENT_DESCRIPTION.into()),
        start: Some(now),
        end: Some(now),
        participant: vec![AppointmentParticipant::actor(urn_uuid(PATIENT_ID))],
    }
}

/// The fixture patient with name and e-mail contact only.
pub(crate) fn patient() -> Patient {
    Patient {
        id: Some(PATIENT_ID.into()),
        identifier: Vec::new(),
        name: vec![HumanName {
            text: None,
            family: vec![PATIENT_FAMILY_NAME.into()],
            given: vec![PATIENT_GIVEN_NAME.into()],
        }],
        contact: vec![PatientContact {
            name: None,
            telecom: vec![ContactPoint {
                system: Some(ContactPointSystem::Email),
                value: Some(PATIENT_EMAIL.into()),
                use_: Some(ContactPointUse::Home),
            }],
        }],
        care_provider: Vec::new(),
    }
}

fn patient_with_care_provider() -> Patient {
    Patient {
        identifier: vec![Identifier::new(CHI_NUMBER_SYSTEM, CHI_NUMBER)],
        care_provider: vec![Reference::to(urn_uuid(ORGANIZATION_ID))],
        ..patient()
    }
}

fn organization() -> Organization {
    Organization {
        id: Some(ORGANIZATION_ID.into()),
        identifier: vec![Identifier::new(ORGANISATION_ID_SYSTEM, ORGANISATION_CODE)],
        name: Some(ORGANISATION_NAME.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fhir::{BundleType, Resource};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 10, 10, 13, 22, 16)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn has_five_entries_with_fixed_urns() {
        let bundle = literal_bundle(None, fixed_now());

        assert_eq!(bundle.id.as_deref(), Some(BUNDLE_ID));
        assert_eq!(bundle.type_, BundleType::Message);

        let full_urls: Vec<&str> = bundle
            .entry
            .iter()
            .filter_map(|e| e.full_url.as_deref())
            .collect();
        assert_eq!(
            full_urls,
            vec![
                "urn:uuid:50cce60c-00b6-499e-84f0-3ee085d6f75d",
                "urn:uuid:c66ea949-b215-4631-970d-9d04626abb26",
                "urn:uuid:3953ad6d-07e5-4e79-9446-1eeadd150836",
                "urn:uuid:5e4901f7-0439-4c02-8c1a-2a10f6182836",
                "urn:uuid:016356f8-2ef2-4daa-bd01-a7410d841bb2",
            ]
        );

        let types: Vec<&str> = bundle.resources().map(Resource::resource_type).collect();
        assert_eq!(
            types,
            vec![
                "MessageHeader",
                "DocumentReference",
                "Appointment",
                "Patient",
                "Organization"
            ]
        );
    }

    #[test]
    fn response_identifier_defaults_and_overrides() {
        let default = literal_bundle(None, fixed_now());
        let response = default
            .message_header()
            .and_then(|h| h.response.clone())
            .expect("response element");
        assert_eq!(response.identifier, DEFAULT_RESPONSE_IDENTIFIER);
        assert_eq!(response.code, ResponseCode::Ok);

        let correlated = literal_bundle(Some("corr-42"), fixed_now());
        assert_eq!(
            correlated
                .message_header()
                .and_then(|h| h.response.as_ref())
                .map(|r| r.identifier.as_str()),
            Some("corr-42")
        );
    }

    #[test]
    fn appointment_start_equals_end() {
        let now = fixed_now();
        let bundle = literal_bundle(None, now);
        let appointment = bundle
            .resources()
            .find_map(|r| match r {
                Resource::Appointment(a) => Some(a),
                _ => None,
            })
            .expect("appointment entry");

        assert_eq!(appointment.start, Some(now));
        assert_eq!(appointment.end, appointment.start);
        assert_eq!(
            appointment.participant[0]
                .actor
                .as_ref()
                .and_then(|a| a.reference.as_deref()),
            Some("urn:uuid:5e4901f7-0439-4c02-8c1a-2a10f6182836")
        );
    }

    #[test]
    fn patient_points_at_organisation() {
        let bundle = literal_bundle(None, fixed_now());
        let patient = bundle
            .resources()
            .find_map(|r| match r {
                Resource::Patient(p) => Some(p),
                _ => None,
            })
            .expect("patient entry");

        assert_eq!(patient.identifier_value(CHI_NUMBER_SYSTEM), Some(CHI_NUMBER));
        assert_eq!(
            patient.care_provider[0].reference.as_deref(),
            Some("urn:uuid:016356f8-2ef2-4daa-bd01-a7410d841bb2")
        );
    }

    #[test]
    fn survives_json_round_trip() {
        let bundle = literal_bundle(Some("corr-1"), Utc::now());
        let json = bundle.to_json().expect("render bundle");
        let parsed = Bundle::from_json(&json).expect("parse bundle");

        assert_eq!(parsed.entry.len(), 5);
        assert_eq!(parsed.resource_ids(), bundle.resource_ids());
        assert_eq!(parsed, bundle);
    }
}
