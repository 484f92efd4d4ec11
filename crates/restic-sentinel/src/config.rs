use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_MAX_AGE_HOURS: i64 = 24 * 7;

/// Optional TOML check definition. Command-line targets and --max-age-hours
/// take precedence over the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub max_age_hours: i64,
    pub targets: Vec<String>,
    pub restic_binary: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_age_hours: DEFAULT_MAX_AGE_HOURS,
            targets: Vec::new(),
            restic_binary: "restic".to_string(),
        }
    }
}

pub fn load(path: &Path) -> Result<CheckConfig> {
    let data = fs::read_to_string(path)
        .map_err(|e| Error::msg(format!("failed to read config {}: {e}", path.display())))?;
    let cfg: CheckConfig = toml::from_str(&data)
        .map_err(|e| Error::msg(format!("TOML parse error in {}: {e}", path.display())))?;
    Ok(cfg)
}
