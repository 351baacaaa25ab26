// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::console::{ConsoleOptions, DEFAULT_PLACEHOLDER_PROMPT};
use crate::error::{Error, Result};
use crate::poller::{DEFAULT_INTERVAL, DEFAULT_LIMIT, PollerConfig};
use crate::remote::Variant;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum UiMode {
    #[default]
    Cli,
    Tui,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RemoteSection {
    pub compute_url: Option<String>,
    pub relay_url: Option<String>,
    pub variant: Variant,
    /// Code evaluated to open a session
    pub handshake_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct PollerSection {
    pub interval_ms: u64,
    pub limit: usize,
}

impl Default for PollerSection {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct UiSection {
    pub default: UiMode,
    pub placeholder_prompt: String,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            default: UiMode::default(),
            placeholder_prompt: DEFAULT_PLACEHOLDER_PROMPT.to_string(),
        }
    }
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ConfigFile {
    pub remote: RemoteSection,
    pub poller: PollerSection,
    pub ui: UiSection,
}

impl ConfigFile {
    pub(crate) fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("evalterm").join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location when `None`. A missing
    /// default file yields defaults; a missing explicit file is an error.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub(crate) fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub(crate) fn console_options(&self) -> ConsoleOptions {
        ConsoleOptions {
            placeholder_prompt: self.ui.placeholder_prompt.clone(),
            handshake_code: self.remote.handshake_code.clone(),
            poller: PollerConfig {
                interval: Duration::from_millis(self.poller.interval_ms.max(1)),
                limit: self.poller.limit.max(1),
                variant: self.remote.variant,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ConfigFile::parse("").unwrap();
        assert_eq!(config.remote.variant, Variant::Envelope);
        assert_eq!(config.poller.interval_ms, 2000);
        assert_eq!(config.poller.limit, 1000);
        assert_eq!(config.ui.default, UiMode::Cli);
        assert_eq!(config.ui.placeholder_prompt, DEFAULT_PLACEHOLDER_PROMPT);
    }

    #[test]
    fn test_parse_sections() {
        let config = ConfigFile::parse(
            r#"
[remote]
compute_url = "https://cu.example"
relay_url = "https://relay.example"
variant = "numeric"

[poller]
interval_ms = 500

[ui]
default = "tui"
"#,
        )
        .unwrap();
        assert_eq!(config.remote.compute_url.as_deref(), Some("https://cu.example"));
        assert_eq!(config.remote.variant, Variant::Numeric);
        assert_eq!(config.poller.limit, 1000);
        assert_eq!(config.ui.default, UiMode::Tui);

        let options = config.console_options();
        assert_eq!(options.poller.interval, Duration::from_millis(500));
        assert_eq!(options.poller.variant, Variant::Numeric);
    }

    #[test]
    fn test_bad_value_is_an_error() {
        assert!(ConfigFile::parse("[poller]\ninterval_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            ConfigFile::load(Some(&missing)),
            Err(Error::Config(_))
        ));

        let present = dir.path().join("config.toml");
        fs::write(&present, "[ui]\nplaceholder_prompt = \"? \"\n").unwrap();
        let config = ConfigFile::load(Some(&present)).unwrap();
        assert_eq!(config.ui.placeholder_prompt, "? ");
    }
}
