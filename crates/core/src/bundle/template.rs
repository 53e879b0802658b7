//! Templated construction of the outbound response bundle.
//!
//! The template is a complete `DvaNotifR_Response` message bundle. Building a response parses it
//! afresh and writes the correlation id into `MessageHeader.response.identifier`. Nothing else is
//! touched.

use crate::BuildError;
use fhir::Bundle;
use std::path::{Path, PathBuf};

const EMBEDDED_TEMPLATE: &str = include_str!("../../resources/DvaNotifR_Response.json");

/// Source of the response template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ResponseTemplate {
    /// `DvaNotifR_Response.json` compiled into the binary.
    #[default]
    Embedded,
    /// A template read from disk on every build.
    File(PathBuf),
}

impl ResponseTemplate {
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::Embedded,
        }
    }

    /// Build the response for `correlation_id`.
    ///
    /// Returns `None` when the template cannot be loaded or has no response element. The failure
    /// is logged; the caller skips the send.
    pub fn build(&self, correlation_id: &str) -> Option<Bundle> {
        match self.try_build(correlation_id) {
            Ok(bundle) => Some(bundle),
            Err(e) => {
                tracing::error!(
                    correlation_id,
                    template = %self.describe(),
                    "failed to build response from template: {}",
                    e
                );
                None
            }
        }
    }

    /// Build the response for `correlation_id`, reporting why it could not be built.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if:
    /// - the template file cannot be read,
    /// - the template is not a FHIR `Bundle`,
    /// - the template has no `MessageHeader` with a `response` element.
    pub fn try_build(&self, correlation_id: &str) -> Result<Bundle, BuildError> {
        let text = self.load()?;
        let mut bundle = Bundle::from_json(&text)?;

        let response = bundle
            .message_header_mut()
            .and_then(|h| h.response.as_mut())
            .ok_or(BuildError::MissingResponse)?;
        response.identifier = correlation_id.to_string();

        Ok(bundle)
    }

    fn load(&self) -> Result<String, BuildError> {
        match self {
            Self::Embedded => Ok(EMBEDDED_TEMPLATE.to_string()),
            Self::File(path) => {
                std::fs::read_to_string(path).map_err(|source| BuildError::TemplateRead {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Embedded => "embedded".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}
