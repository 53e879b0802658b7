//! Fixed identifiers and values carried by the DVA message bundles.
//!
//! These are the literal values partner systems have been tested against. Changing any of them
//! changes what the client endpoint sees.

/// Id of the outbound (and sample inbound) message bundle.
pub const BUNDLE_ID: &str = "32e975e8-1002-4ece-9b50-48b62fac106a";

pub const MESSAGE_HEADER_ID: &str = "50cce60c-00b6-499e-84f0-3ee085d6f75d";
pub const DOCUMENT_REFERENCE_ID: &str = "c66ea949-b215-4631-970d-9d04626abb26";
pub const APPOINTMENT_ID: &str = "3953ad6d-07e5-4e79-9446-1eeadd150836";
pub const PATIENT_ID: &str = "5e4901f7-0439-4c02-8c1a-2a10f6182836";
pub const ORGANIZATION_ID: &str = "016356f8-2ef2-4daa-bd01-a7410d841bb2";

/// Response identifier used by the literal bundle when no correlation id is supplied.
pub const DEFAULT_RESPONSE_IDENTIFIER: &str = "4f360965-1e11-4066-9e76-53aa38e1c00";

pub const MESSAGE_TYPES_SYSTEM: &str = "https://digitalhealthplatform.scot/fhir/messagetypes";
pub const NOTIFICATION_EVENT: &str = "DvaNotifR";
pub const RESPONSE_EVENT: &str = "DvaNotif_Response";

pub const SOURCE_NAME: &str = "DHP";
pub const RESPONSE_DESTINATION_NAME: &str = "NSS HUB";
pub const NOTIFICATION_DESTINATION_NAME: &str = "Lenus";

pub const CHI_NUMBER_SYSTEM: &str = "https://phfapi.digitalhealthplatform.net/fhir/chinumber";
pub const CHI_NUMBER: &str = "0805860000";
pub const PATIENT_FAMILY_NAME: &str = "User";
pub const PATIENT_GIVEN_NAME: &str = "Jane";
pub const PATIENT_EMAIL: &str = "HSCPortalTest1@gmail.com";

pub const ORGANISATION_ID_SYSTEM: &str =
    "http://fhir.scot.nhs.uk/DSTU2/Id/national/organisationId";
pub const ORGANISATION_CODE: &str = "99999";
pub const ORGANISATION_NAME: &str = "Alba House";

pub const APPOINTMENT_TYPE: &str = "Dermatology Virtual";
pub const APPOINTMENT_DESCRIPTION: &str =
    "A Dermatology virtual appointment has been scheduled for you.";

pub const REPORT_TITLE: &str = "Consultant Report";
pub const PDF_MIME: &str = "application/pdf";

const CONSULTANT_REPORT_PDF_B64: &str = include_str!("../../resources/consultant_report.pdf.b64");

/// Base64 encoded consultant report attached to the document reference.
///
/// This is the report partners already hold, kept byte for byte. It carries one stray `#` at
/// offset 1765, so strict base64 decoders reject it.
pub fn consultant_report_pdf() -> &'static str {
    CONSULTANT_REPORT_PDF_B64.trim()
}
