// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_TIMEOUT_MS;
use crate::config::ClientSettings;
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the bridge.
///
/// # Fields
/// * `library` - Path to the native engine shared library. When omitted the
///   in-process stub engine is used instead.
/// * `settings` - Client settings passed to the engine's `init`
/// * `dispatch` - Options for async dispatch (optional)
///
/// # Example
/// ```yaml
/// library: ./lib/libbitwarden_c.so
/// settings:
///   apiUrl: https://api.bitwarden.com
///   identityUrl: https://identity.bitwarden.com
/// dispatch:
///   timeout_ms: 10000
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub library: Option<PathBuf>,
    #[serde(default)]
    pub settings: ClientSettings,
    #[serde(default)]
    pub dispatch: DispatchOptions,
}

/// Options controlling async dispatch from the CLI.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DispatchOptions {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Load a config from a YAML or TOML file, chosen by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BridgeConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let cfg: BridgeConfig = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        _ => return Err(ConfigError::UnsupportedFormat { extension }),
    };

    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &BridgeConfig) -> Result<(), ConfigError> {
    if cfg.dispatch.timeout_ms == 0 {
        return Err(ConfigError::InvalidValue {
            field: "dispatch.timeout_ms",
            reason: "must be greater than zero".to_string(),
        });
    }
    if cfg.settings.api_url.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "settings.apiUrl",
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::DEFAULT_API_URL;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_config() {
        let file = write_config(
            ".yaml",
            r#"
library: /opt/engine/libbitwarden_c.so
settings:
  apiUrl: http://localhost:4000
  statePath: /tmp/state.json
dispatch:
  timeout_ms: 500
"#,
        );

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(
            cfg.library,
            Some(PathBuf::from("/opt/engine/libbitwarden_c.so"))
        );
        assert_eq!(cfg.settings.api_url, "http://localhost:4000");
        assert_eq!(cfg.settings.state_path.as_deref(), Some("/tmp/state.json"));
        assert_eq!(cfg.dispatch.timeout_ms, 500);
    }

    #[test]
    fn test_load_toml_config() {
        let file = write_config(
            ".toml",
            r#"
[settings]
userAgent = "vault-bridge-tests"

[dispatch]
timeout_ms = 1200
"#,
        );

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.library, None);
        assert_eq!(cfg.settings.user_agent, "vault-bridge-tests");
        assert_eq!(cfg.settings.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.dispatch.timeout_ms, 1200);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let file = write_config(".yml", "{}\n");

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.library, None);
        assert_eq!(cfg.settings, ClientSettings::default());
        assert_eq!(cfg.dispatch, DispatchOptions::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_config(".json", "{}");

        match load_config(file.path()) {
            Err(ConfigError::UnsupportedFormat { extension }) => assert_eq!(extension, "json"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let file = write_config(".yaml", "dispatch:\n  timeout_ms: 0\n");

        match load_config(file.path()) {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "dispatch.timeout_ms")
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
