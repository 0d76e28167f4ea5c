use std::{io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE: &str = "config.json";

const DEFAULT_PERSONA: &str = "Role: You are my external prefrontal cortex and strategic CFO.\n\
Protocols: anti-procrastination, financial firewall, emotional filter.\n\
Tone: cold, rational, data-driven. Slightly sarcastic if I was lazy, protective if I was focused.";

/// User settings, read from `config.json` inside the application directory. Every field is
/// optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix printed before money amounts.
    pub currency: String,
    /// Opening section of the generated prompt.
    pub persona: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "RM".into(),
            persona: DEFAULT_PERSONA.into(),
        }
    }
}

impl Settings {
    /// Loads settings from `app_dir`. A missing file means defaults, a malformed one is an
    /// error.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings in {path:?}")),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings at {path:?}, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {path:?}")),
        }
    }
}
