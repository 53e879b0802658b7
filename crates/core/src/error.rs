use std::path::PathBuf;

/// Errors raised while resolving [`crate::ProviderConfig`] at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read properties file {path}: {source}", path = path.display())]
    PropertiesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse properties file {path}: {source}", path = path.display())]
    PropertiesFile {
        path: PathBuf,
        #[source]
        source: java_properties::PropertiesError,
    },
    #[error("cannot parse properties: {0}")]
    PropertiesParse(java_properties::PropertiesError),
    #[error("missing property: {0}")]
    MissingKey(&'static str),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building an outbound bundle from a template.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to read template {path}: {source}", path = path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse template: {0}")]
    TemplateParse(#[from] fhir::FhirError),
    #[error("template has no MessageHeader with a response element")]
    MissingResponse,
}

/// Errors raised while transmitting a bundle to the client endpoint.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("failed to send bundle: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to serialize bundle: {0}")]
    Serialization(fhir::FhirError),
    #[error("endpoint answered {status}: {body}")]
    Status { status: u16, body: String },
}
