use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

/// Run-wide timezone toggle: bucket each commit by its recorded offset, or
/// normalize everything to the host zone first. Applied uniformly to the
/// whole run; there is no per-commit mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TzMode {
    #[default]
    Local,
    Commit,
}

impl TzMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TzMode::Local => "local",
            TzMode::Commit => "commit",
        }
    }
}

/// All settings that can be placed in a .git-roast.yml config file.
/// Every field is optional; omitted fields fall back to CLI defaults.
/// CLI flags always take precedence over values set here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub since: Option<String>,
    pub until: Option<String>,
    pub author: Option<String>,
    pub intensity: Option<u8>,
    pub wholesome: Option<bool>,
    pub censor: Option<bool>,
    pub deep: Option<bool>,
    pub max_commits: Option<usize>,
    pub tz: Option<TzMode>,
    pub explain: Option<bool>,
}

impl FileConfig {
    /// Semantic constraints serde cannot enforce.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(i) = self.intensity {
            if i > 5 {
                return Err(format!("invalid 'intensity' value: {i}. Expected 0-5"));
            }
        }
        if let Some(since) = &self.since {
            validate_date("since", since)?;
        }
        if let Some(until) = &self.until {
            validate_date("until", until)?;
        }
        Ok(())
    }
}

pub fn validate_date(name: &str, value: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("invalid '{name}' value: {value:?}. Expected YYYY-MM-DD"))
}

/// Loads the first config file found: `.git-roast.yml` next to the target
/// path, then in the working directory, then the user config dir. A missing
/// file is simply the default config; a present-but-invalid file is an error
/// worth stopping for.
pub fn load_file(path_hint: Option<&Path>) -> Result<FileConfig, String> {
    for candidate in candidates(path_hint) {
        if !candidate.is_file() {
            continue;
        }
        let text = std::fs::read_to_string(&candidate)
            .map_err(|e| format!("cannot read {}: {e}", candidate.display()))?;
        let config: FileConfig = serde_yaml::from_str(&text)
            .map_err(|e| format!("invalid config {}: {e}", candidate.display()))?;
        config
            .validate()
            .map_err(|e| format!("invalid config {}: {e}", candidate.display()))?;
        return Ok(config);
    }
    Ok(FileConfig::default())
}

fn candidates(path_hint: Option<&Path>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(hint) = path_hint {
        out.push(hint.join(".git-roast.yml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        out.push(cwd.join(".git-roast.yml"));
    }
    if let Some(dir) = dirs::config_dir() {
        out.push(dir.join("git-roast").join("config.yml"));
    }
    out
}
