use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Root configuration structure, deserialized from `.license-expr/config.toml`.
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Which licenses the registry holds.
    pub registry: RegistryConfig,
    /// Log filter used when `RUST_LOG` is unset.
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:8080".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Register deprecated SPDX ids such as `GPL-2.0` alongside current ones.
    pub include_deprecated: bool,
    /// Organization-defined licenses, appended after the built-in ones.
    pub custom: Vec<CustomLicense>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            include_deprecated: true,
            custom: Vec::new(),
        }
    }
}

/// A `[[registry.custom]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomLicense {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-expr/config.toml`
/// 3. `~/.config/license-expr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-expr").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("license-expr").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
        assert!(cfg.server.cors_origins.is_empty());
        assert!(cfg.registry.include_deprecated);
        assert!(cfg.registry.custom.is_empty());
        assert_eq!(cfg.log.filter, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[server]
bind = "0.0.0.0:9000"
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert!(cfg.registry.include_deprecated);
        assert_eq!(cfg.log.filter, "info");
    }

    #[test]
    fn test_full_file() {
        let cfg: Config = toml::from_str(
            r#"
[server]
bind = "127.0.0.1:3000"
cors_origins = ["https://app.example.com"]

[registry]
include_deprecated = false

[[registry.custom]]
id = "Acme-Internal-1.0"
name = "Acme Internal License 1.0"

[[registry.custom]]
id = "Acme-Eval"
name = "Acme Evaluation License"

[log]
filter = "debug,tower_http=info"
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.cors_origins, vec!["https://app.example.com"]);
        assert!(!cfg.registry.include_deprecated);
        assert_eq!(cfg.registry.custom.len(), 2);
        assert_eq!(cfg.registry.custom[1].id, "Acme-Eval");
        assert_eq!(cfg.log.filter, "debug,tower_http=info");
    }

    #[test]
    fn test_load_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let conf_dir = dir.path().join(".license-expr");
        std::fs::create_dir_all(&conf_dir).unwrap();
        std::fs::write(
            conf_dir.join("config.toml"),
            "[server]\nbind = \"127.0.0.1:7777\"\n",
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:7777");
    }

    #[test]
    fn test_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let conf_dir = dir.path().join(".license-expr");
        std::fs::create_dir_all(&conf_dir).unwrap();
        std::fs::write(
            conf_dir.join("config.toml"),
            "[server]\nbind = \"127.0.0.1:7777\"\n",
        )
        .unwrap();
        let override_path = dir.path().join("other.toml");
        std::fs::write(&override_path, "[log]\nfilter = \"warn\"\n").unwrap();

        let cfg = load_config(dir.path(), Some(&override_path)).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
        assert_eq!(cfg.log.filter, "warn");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nbind = ").unwrap();
        let err = load_config(dir.path(), Some(&path)).unwrap_err();
        assert!(err.to_string().contains("parsing config file"));
    }

    #[test]
    fn test_missing_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(dir.path(), Some(&dir.path().join("nope.toml"))).is_err());
    }
}
