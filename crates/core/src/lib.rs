//! # DVA Core
//!
//! Core logic of the DVA notification provider.
//!
//! This crate contains everything between "a notification body arrived" and "a response bundle
//! was sent":
//! - Provider configuration resolved once at startup (`config`)
//! - Outbound bundle builders, literal and templated (`bundle`)
//! - The delayed responder worker (`responder`)
//! - The HTTP transport to the client endpoint (`transport`)
//! - Inbound acknowledgement and correlation (`receiver`)
//!
//! **No API concerns**: HTTP routing and OpenAPI belong in `api-rest`.

pub mod bundle;
pub mod config;
pub mod constants;
pub mod error;
pub mod receiver;
pub mod responder;
pub mod transport;

pub use bundle::{BundleBuilder, ResponseTemplate};
pub use config::{ProviderConfig, ResponseMode};
pub use error::{BuildError, ConfigError, ConfigResult, TransportError};
pub use receiver::{MessageReceiver, Receipt};
pub use responder::{DeliveryHandle, DeliveryOutcome, Responder};
pub use transport::{BundleTransport, RestClient, TransactionReceipt};
