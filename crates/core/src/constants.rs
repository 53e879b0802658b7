//! Constants used throughout the provider core crate.
//!
//! Property keys, environment variable names and defaults live here so the configuration
//! loader, the binaries and the tests agree on them.

/// Default properties file, resolved relative to the working directory.
pub const PROPERTIES_FILENAME: &str = "server.properties";

/// Base URL of the client endpoint that receives the delayed response.
pub const CLIENT_URL_KEY: &str = "client.url";

/// Delay before the response is sent, in milliseconds.
pub const SERVER_DELAY_KEY: &str = "server.delay";

/// Which builder produces the response: `template` or `literal`.
pub const SERVER_RESPONSE_KEY: &str = "server.response";

/// Optional path to a response template replacing the embedded one.
pub const SERVER_TEMPLATE_KEY: &str = "server.template";

/// Overrides the location of the properties file.
pub const PROPERTIES_ENV: &str = "DVA_PROPERTIES";

pub const CLIENT_URL_ENV: &str = "DVA_CLIENT_URL";
pub const SERVER_DELAY_ENV: &str = "DVA_SERVER_DELAY_MS";
pub const RESPONSE_MODE_ENV: &str = "DVA_RESPONSE_MODE";
pub const TEMPLATE_PATH_ENV: &str = "DVA_TEMPLATE_PATH";

/// Listening address of the REST server.
pub const REST_ADDR_ENV: &str = "DVA_REST_ADDR";
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8080";

/// Timeout applied to each outbound transaction request, in seconds.
pub const TRANSPORT_TIMEOUT_SECS: u64 = 30;
