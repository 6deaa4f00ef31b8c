//! In-memory registry of record profiles, keyed by profile name.
//!
//! The built-in `journal` profile is always present unless a loaded profiles
//! file overrides it. The registry uses `arc-swap` for lock-free reads on the
//! hot path.

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use common::ServiceError;
use field_codec::{JOURNAL_ENCRYPTED_FIELDS, JOURNAL_PROFILE};
use thiserror::Error;

/// Ordered, de-duplicated list of top-level field names to encrypt.
pub type FieldList = Vec<String>;

/// Errors from the profile registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The requested profile name has no entry in the registry.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
}

impl From<RegistryError> for ServiceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownProfile(name) => ServiceError::UnknownProfile(name),
        }
    }
}

/// Shared, lock-free registry of profiles keyed by name.
///
/// Internally backed by [`ArcSwap`] so readers never block and the background
/// refresh task can atomically swap in a completely new map.
#[derive(Clone, Debug)]
pub struct ProfileRegistry {
    inner: Arc<ArcSwap<HashMap<String, Arc<FieldList>>>>,
}

impl ProfileRegistry {
    /// Create a registry holding only the built-in profiles.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(builtin_profiles()))),
        }
    }

    /// Return the number of profiles currently registered.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Profile names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.load().keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up a profile's field list by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProfile`] if `name` is not present.
    pub fn get(&self, name: &str) -> Result<Arc<FieldList>, RegistryError> {
        self.inner
            .load()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownProfile(name.to_owned()))
    }

    /// Atomically replace every file-loaded profile.
    ///
    /// The result is the built-in profiles overlaid with `loaded`; a loaded
    /// profile with a built-in name takes precedence.
    pub fn replace_loaded(&self, loaded: HashMap<String, FieldList>) {
        let mut map = builtin_profiles();
        map.extend(
            loaded
                .into_iter()
                .map(|(name, fields)| (name, Arc::new(fields))),
        );
        self.inner.store(Arc::new(map));
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_profiles() -> HashMap<String, Arc<FieldList>> {
    let journal: FieldList = JOURNAL_ENCRYPTED_FIELDS.iter().map(|f| f.to_string()).collect();
    HashMap::from([(JOURNAL_PROFILE.to_owned(), Arc::new(journal))])
}
