//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use field_codec::FieldCodec;

use crate::profile::ProfileRegistry;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// that Axum can clone the state for each request without copying the key.
#[derive(Clone)]
pub struct AppState {
    /// Codec bound to the process-wide encryption key.
    pub codec: Arc<FieldCodec>,
    /// Lock-free registry of record profiles.
    pub profiles: ProfileRegistry,
    /// Name of the HTTP header used to select the profile for each request.
    pub profile_header_name: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] with the provided codec, registry and header name.
    pub fn new(codec: FieldCodec, profiles: ProfileRegistry, profile_header_name: String) -> Self {
        Self {
            codec: Arc::new(codec),
            profiles,
            profile_header_name: Arc::new(profile_header_name),
        }
    }
}

#[cfg(test)]
impl Default for AppState {
    /// Creates an [`AppState`] with a random key and the built-in profiles.
    fn default() -> Self {
        Self::new(
            FieldCodec::new(field_codec::EncryptionKey::generate()),
            ProfileRegistry::new(),
            "X-Record-Profile".into(),
        )
    }
}
