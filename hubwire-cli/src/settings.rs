use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hub {
    /// `ip[:port]`, optionally with an `http://` scheme.
    pub host: String,
    pub events_path: String,
    pub timeout_ms: u64,
    /// How long `events` listens; 0 listens until the hub closes.
    pub duration_ms: u64,
}

impl Hub {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub hub: Hub,
}

impl Settings {
    /// Loads `path` when given, otherwise the compiled-in defaults.
    pub fn new(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
                Ok(toml::from_str(&content)?)
            }
            None => Ok(toml::from_str(include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../",
                "configs/default.toml"
            )))?),
        }
    }
}
