//! Outbound bundle builders.
//!
//! Responsibilities:
//! - Build the delayed acknowledgement sent to the client endpoint.
//! - Provide the sample inbound notification used by the CLI and tests.
//!
//! Two builders exist. The literal builder assembles five resources from fixed values; the
//! template builder patches the correlation id into `DvaNotifR_Response.json`. Which one the
//! responder uses is chosen by [`crate::ResponseMode`].

pub mod fixtures;
mod inbound;
mod literal;
mod template;

pub use inbound::inbound_notification;
pub use literal::literal_bundle;
pub use template::ResponseTemplate;

use crate::{ProviderConfig, ResponseMode};
use chrono::Utc;
use fhir::Bundle;

/// Produces the response bundle for a correlation id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BundleBuilder {
    Literal,
    Template(ResponseTemplate),
}

impl BundleBuilder {
    pub fn from_config(config: &ProviderConfig) -> Self {
        match config.response_mode() {
            ResponseMode::Literal => Self::Literal,
            ResponseMode::Template => {
                Self::Template(ResponseTemplate::from_path(config.template_path()))
            }
        }
    }

    /// Build the response for `correlation_id`.
    ///
    /// `None` means no response can be sent for this message; the reason has already been logged.
    pub fn build(&self, correlation_id: &str) -> Option<Bundle> {
        match self {
            Self::Literal => Some(literal_bundle(Some(correlation_id), Utc::now())),
            Self::Template(template) => template.build(correlation_id),
        }
    }
}
