//! Record profiles: named lists of fields that are stored encrypted.
//!
//! # Responsibilities
//!
//! - Provide the built-in `journal` profile.
//! - Load extra profiles from an optional YAML or JSON file at startup and on
//!   a refresh interval.
//!
//! # Profiles file
//!
//! ```yaml
//! profiles:
//!   journal: [title, content, tags, mood, journalType]
//!   transcript: [text, speakers]
//! ```

pub mod registry;

pub use registry::{FieldList, ProfileRegistry};

use std::{collections::HashMap, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::time;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct ProfilesFile {
    profiles: HashMap<String, Vec<String>>,
}

/// Read the profiles file at `path` and atomically replace the loaded profiles.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is neither YAML nor JSON, or
/// defines an invalid profile. The registry is left unchanged in that case.
pub async fn load_from_file(path: &str, registry: &ProfileRegistry) -> Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read profiles file {path}"))?;

    let profiles =
        parse_profiles(&text).with_context(|| format!("invalid profiles file {path}"))?;

    registry.replace_loaded(profiles);
    info!(path, profiles = ?registry.names(), "record profiles loaded");
    Ok(())
}

/// Spawn a background task that periodically re-reads the profiles file.
///
/// On failure the previous profiles are retained and a warning is emitted.
pub fn refresh_task(
    path: String,
    interval: Duration,
    registry: ProfileRegistry,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately; skip it so we don't double-load at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = load_from_file(&path, &registry).await {
                warn!(error = %e, "profile refresh failed; retaining previous profiles");
            }
        }
    })
}

/// Parse and validate the contents of a profiles file.
fn parse_profiles(text: &str) -> Result<HashMap<String, FieldList>> {
    let file: ProfilesFile = if let Ok(parsed) = serde_yaml::from_str(text) {
        parsed
    } else if let Ok(parsed) = serde_json::from_str(text) {
        parsed
    } else {
        anyhow::bail!("not valid YAML or JSON with a top-level `profiles` map");
    };

    let mut out = HashMap::with_capacity(file.profiles.len());
    for (name, fields) in file.profiles {
        let name = name.trim().to_owned();
        if name.is_empty() {
            anyhow::bail!("profile names must not be empty");
        }
        if fields.is_empty() {
            anyhow::bail!("profile {name} lists no fields");
        }

        let mut list = FieldList::with_capacity(fields.len());
        for field in fields {
            if field.trim().is_empty() {
                anyhow::bail!("profile {name} contains an empty field name");
            }
            if !list.contains(&field) {
                list.push(field);
            }
        }
        out.insert(name, list);
    }
    Ok(out)
}
