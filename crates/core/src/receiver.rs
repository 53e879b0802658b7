//! Inbound notification handling.
//!
//! The receiver is transport agnostic: the REST layer hands it the raw request body and gets back
//! a [`Receipt`] holding the synchronous acknowledgement. Scheduling the delayed response is a
//! side effect of [`MessageReceiver::accept`].

use crate::responder::{DeliveryHandle, Responder};
use fhir::{Bundle, FhirError, FhirResult};

/// Correlation id of an inbound bundle.
///
/// The first entry's resource id, or its `fullUrl` without the `urn:uuid:` prefix when the
/// resource has no id. `None` when the bundle has no entries or the first one has neither.
pub fn correlation_id(bundle: &Bundle) -> Option<&str> {
    bundle.first_entry().and_then(|entry| entry.identity())
}

/// The synchronous acknowledgement: a message bundle carrying only the inbound bundle's id.
pub fn acknowledgement(inbound: &Bundle) -> Bundle {
    let ack = Bundle::new(fhir::BundleType::Message);
    match &inbound.id {
        Some(id) => ack.with_id(id.clone()),
        None => ack,
    }
}

/// What the caller gets back for an accepted notification.
#[derive(Debug)]
pub struct Receipt {
    pub acknowledgement: Bundle,
    pub correlation_id: Option<String>,
    /// Present when a delayed response was scheduled.
    pub delivery: Option<DeliveryHandle>,
}

/// Accepts inbound notifications and schedules their delayed responses.
#[derive(Clone, Debug)]
pub struct MessageReceiver {
    responder: Responder,
}

impl MessageReceiver {
    pub fn new(responder: Responder) -> Self {
        Self { responder }
    }

    /// Parse, log and accept a raw notification body.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the body is not JSON or is not a FHIR `Bundle`. Nothing is
    /// scheduled in that case.
    pub fn receive(&self, body: &[u8]) -> FhirResult<Receipt> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        match serde_json::to_string_pretty(&value) {
            Ok(pretty) => tracing::info!("received notification:\n{}", pretty),
            Err(e) => tracing::warn!("cannot pretty-print notification: {}", e),
        }

        let bundle = Bundle::from_value(value).map_err(|e| {
            tracing::warn!("rejected notification: {}", e);
            e
        })?;
        Ok(self.accept(&bundle))
    }

    /// Acknowledge `bundle` and schedule its delayed response.
    ///
    /// When no correlation id can be extracted a warning is logged and nothing is scheduled; the
    /// acknowledgement is returned regardless.
    pub fn accept(&self, bundle: &Bundle) -> Receipt {
        let acknowledgement = acknowledgement(bundle);

        let Some(correlation_id) = correlation_id(bundle).map(str::to_string) else {
            tracing::warn!(
                bundle_id = ?bundle.id,
                "notification has no correlation id; no response will be sent"
            );
            return Receipt {
                acknowledgement,
                correlation_id: None,
                delivery: None,
            };
        };

        if let Some(event) = bundle.message_header().and_then(|h| h.event_code()) {
            tracing::info!(%correlation_id, event, "notification accepted");
        } else {
            tracing::info!(%correlation_id, "notification accepted without message header");
        }

        let delivery = self.responder.schedule(correlation_id.clone());
        Receipt {
            acknowledgement,
            correlation_id: Some(correlation_id),
            delivery: Some(delivery),
        }
    }
}

/// Maps a rejected body to a short client-facing reason.
pub fn rejection_reason(err: &FhirError) -> &'static str {
    match err {
        FhirError::InvalidJson(_) => "Request body is not valid JSON",
        FhirError::Translation(_) | FhirError::InvalidInput(_) => {
            "Request body is not a FHIR Bundle"
        }
    }
}
