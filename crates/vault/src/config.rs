//! Configuration loading and validation for the vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use field_codec::EncryptionKey;
use serde::Deserialize;
use zeroize::{Zeroize, Zeroizing};

/// Validated vault service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Hex-encoded 32-byte AES-256 key. **Required.** Never logged.
    ///
    /// Cleared by [`Config::take_key`] once the codec holds the parsed key.
    #[serde(default = "default_encryption_key")]
    pub encryption_key: Zeroizing<String>,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// HTTP header used to identify which record profile to apply.
    #[serde(default = "default_profile_header")]
    pub profile_header_name: String,

    /// Optional YAML or JSON file defining extra record profiles.
    #[serde(default)]
    pub profiles_path: Option<String>,

    /// How often (seconds) to re-read the profiles file.
    #[serde(default = "default_profile_refresh_interval")]
    pub profile_refresh_interval_secs: u64,

    /// OTLP endpoint for span export. Logs only when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_encryption_key() -> Zeroizing<String> {
    Zeroizing::new(String::new())
}
fn default_listen_port() -> u16 {
    8080
}
fn default_profile_header() -> String {
    "X-Record-Profile".into()
}
fn default_profile_refresh_interval() -> u64 {
    300
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed,
    /// including an encryption key that is not exactly 32 bytes.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Parse the configured key.
    ///
    /// # Errors
    ///
    /// Returns an error if `ENCRYPTION_KEY` is missing or malformed.
    pub fn key(&self) -> Result<EncryptionKey> {
        EncryptionKey::from_hex(&self.encryption_key).context("ENCRYPTION_KEY is invalid")
    }

    /// Parse the configured key and wipe its hex form from this config.
    ///
    /// # Errors
    ///
    /// Returns an error if `ENCRYPTION_KEY` is missing or malformed. The hex
    /// form is wiped either way.
    pub fn take_key(&mut self) -> Result<EncryptionKey> {
        let key = self.key();
        self.encryption_key.zeroize();
        key
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.key()?;
        ensure_non_empty(&self.profile_header_name, "PROFILE_HEADER_NAME")?;
        if let Some(path) = &self.profiles_path {
            ensure_non_empty(path, "PROFILES_PATH")?;
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        if self.profile_refresh_interval_secs == 0 {
            anyhow::bail!("PROFILE_REFRESH_INTERVAL_SECS must be > 0");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &"[REDACTED]")
            .field("listen_port", &self.listen_port)
            .field("profile_header_name", &self.profile_header_name)
            .field("profiles_path", &self.profiles_path)
            .field(
                "profile_refresh_interval_secs",
                &self.profile_refresh_interval_secs,
            )
            .field(
                "otel_exporter_otlp_endpoint",
                &self.otel_exporter_otlp_endpoint,
            )
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
