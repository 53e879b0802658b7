//! Provider runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the responder and the
//! transport. Nothing reads process-wide state during request handling.
//!
//! Sources, lowest precedence first:
//! - a Java properties file (`key=value` or `key: value`, `#` and `!` comments, no variable
//!   expansion)
//! - `DVA_*` environment variables
//!
//! The file named by `DVA_PROPERTIES` must exist. Without it, `server.properties` in the working
//! directory is optional and the environment alone may carry the settings. A missing key or an
//! unparsable value is a [`ConfigError`]; there are no silent defaults for the client URL or the
//! delay.

use crate::constants::{
    CLIENT_URL_ENV, CLIENT_URL_KEY, PROPERTIES_ENV, PROPERTIES_FILENAME, RESPONSE_MODE_ENV,
    SERVER_DELAY_ENV, SERVER_DELAY_KEY, SERVER_RESPONSE_KEY, SERVER_TEMPLATE_KEY,
    TEMPLATE_PATH_ENV,
};
use crate::{ConfigError, ConfigResult};
use reqwest::Url;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which bundle builder produces the delayed response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseMode {
    /// Patch the correlation id into the response template.
    #[default]
    Template,
    /// Build the five-entry literal bundle.
    Literal,
}

impl ResponseMode {
    pub fn parse(s: &str) -> ConfigResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "template" => Ok(Self::Template),
            "literal" => Ok(Self::Literal),
            other => Err(ConfigError::InvalidValue {
                key: SERVER_RESPONSE_KEY,
                reason: format!("expected `template` or `literal`, got `{other}`"),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Literal => "literal",
        }
    }
}

/// Provider configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    client_url: Url,
    delay: Duration,
    response_mode: ResponseMode,
    template_path: Option<PathBuf>,
}

impl ProviderConfig {
    /// Create a new `ProviderConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `client_url` is not an absolute `http(s)` URL.
    pub fn new(
        client_url: &str,
        delay: Duration,
        response_mode: ResponseMode,
        template_path: Option<PathBuf>,
    ) -> ConfigResult<Self> {
        let client_url = Url::parse(client_url.trim()).map_err(|e| ConfigError::InvalidValue {
            key: CLIENT_URL_KEY,
            reason: e.to_string(),
        })?;
        if !matches!(client_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: CLIENT_URL_KEY,
                reason: format!("unsupported scheme `{}`", client_url.scheme()),
            });
        }

        Ok(Self {
            client_url,
            delay,
            response_mode,
            template_path,
        })
    }

    pub fn client_url(&self) -> &Url {
        &self.client_url
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn response_mode(&self) -> ResponseMode {
        self.response_mode
    }

    pub fn template_path(&self) -> Option<&Path> {
        self.template_path.as_deref()
    }

    /// Resolve configuration from the properties file and the environment.
    ///
    /// `env` looks up environment variables; `main` passes `std::env::var`, tests pass a map.
    ///
    /// If `DVA_PROPERTIES` names a file, that file must exist. Otherwise `server.properties` in
    /// the working directory is read when present, and the environment alone is used when not.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - an explicitly named properties file cannot be read or parsed,
    /// - `client.url` or `server.delay` is missing from both sources,
    /// - any value cannot be parsed.
    pub fn resolve(env: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        Self::resolve_with_default(Path::new(PROPERTIES_FILENAME), env)
    }

    fn resolve_with_default(
        default_path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        let mut properties = match env(PROPERTIES_ENV) {
            Some(path) => read_properties_file(Path::new(&path))?,
            None if default_path.is_file() => read_properties_file(default_path)?,
            None => {
                tracing::warn!(
                    path = %default_path.display(),
                    "properties file not found; expecting configuration from the environment"
                );
                HashMap::new()
            }
        };

        for (var, key) in [
            (CLIENT_URL_ENV, CLIENT_URL_KEY),
            (SERVER_DELAY_ENV, SERVER_DELAY_KEY),
            (RESPONSE_MODE_ENV, SERVER_RESPONSE_KEY),
            (TEMPLATE_PATH_ENV, SERVER_TEMPLATE_KEY),
        ] {
            if let Some(value) = env(var) {
                properties.insert(key.to_string(), value);
            }
        }

        Self::from_properties(&properties)
    }

    /// Build configuration from the text of a properties file.
    pub fn from_properties_str(text: &str) -> ConfigResult<Self> {
        let properties =
            java_properties::read(text.as_bytes()).map_err(ConfigError::PropertiesParse)?;
        Self::from_properties(&properties)
    }

    fn from_properties(properties: &HashMap<String, String>) -> ConfigResult<Self> {
        let client_url = required(properties, CLIENT_URL_KEY)?;
        let delay = parse_delay(required(properties, SERVER_DELAY_KEY)?)?;
        let response_mode = optional(properties, SERVER_RESPONSE_KEY)
            .map(ResponseMode::parse)
            .transpose()?
            .unwrap_or_default();
        let template_path = optional(properties, SERVER_TEMPLATE_KEY).map(PathBuf::from);

        Self::new(client_url, delay, response_mode, template_path)
    }
}

fn read_properties_file(path: &Path) -> ConfigResult<HashMap<String, String>> {
    let file = File::open(path).map_err(|source| ConfigError::PropertiesRead {
        path: path.to_path_buf(),
        source,
    })?;
    java_properties::read(BufReader::new(file)).map_err(|source| ConfigError::PropertiesFile {
        path: path.to_path_buf(),
        source,
    })
}

fn optional<'a>(properties: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    properties
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn required<'a>(
    properties: &'a HashMap<String, String>,
    key: &'static str,
) -> ConfigResult<&'a str> {
    optional(properties, key).ok_or(ConfigError::MissingKey(key))
}

fn parse_delay(value: &str) -> ConfigResult<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidValue {
            key: SERVER_DELAY_KEY,
            reason: format!("`{value}` is not a number of milliseconds: {e}"),
        })
}
