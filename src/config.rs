//! Application configuration.
//!
//! Precedence: CLI > env > config files > defaults. Config files are TOML and are read in
//! order (`--config`, `$DEVCAMPER_CONFIG`, `./devcamper.toml`); a value from an earlier file
//! wins over a later one.
//!
//! ```toml
//! bind = "0.0.0.0:5000"
//! seed_dir = "data"
//! log_dir = "logs"
//! log_level = "debug"
//!
//! [pagination]
//! default_limit = 20
//! max_limit = 100
//! count_mode = "filtered"
//! ```

use crate::advanced::PaginationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_RETENTION: u32 = 7;
pub const CONFIG_FILE_NAME: &str = "devcamper.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path} not found")]
    Missing { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("invalid TOML in {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind: String,
    pub seed_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub log_retention: u32,
    pub pagination: PaginationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            seed_dir: None,
            log_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_retention: DEFAULT_LOG_RETENTION,
            pagination: PaginationConfig::default(),
        }
    }
}

/// One layer of configuration; unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub bind: Option<String>,
    pub seed_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_retention: Option<u32>,
    pub pagination: Option<PaginationConfig>,
}

impl PartialConfig {
    /// Keep every value already set; take the rest from `lower`.
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            bind: self.bind.or(lower.bind),
            seed_dir: self.seed_dir.or(lower.seed_dir),
            log_dir: self.log_dir.or(lower.log_dir),
            log_level: self.log_level.or(lower.log_level),
            log_retention: self.log_retention.or(lower.log_retention),
            pagination: self.pagination.or(lower.pagination),
        }
    }

    fn resolve(self) -> AppConfig {
        let d = AppConfig::default();
        AppConfig {
            bind: self.bind.unwrap_or(d.bind),
            seed_dir: self.seed_dir,
            log_dir: self.log_dir,
            log_level: self.log_level.unwrap_or(d.log_level),
            log_retention: self.log_retention.unwrap_or(d.log_retention),
            pagination: self.pagination.unwrap_or(d.pagination),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub bind: Option<String>,
    pub seed_dir: Option<PathBuf>,
}

/// Load configuration from the process environment and working directory.
///
/// # Errors
/// See [`load_with`].
pub fn load(cli: &CliOverrides) -> Result<AppConfig, ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    load_with(cli, |k| std::env::var(k).ok(), &cwd)
}

/// Load configuration with an explicit environment lookup and working directory.
///
/// # Errors
/// A config file named explicitly (flag or `DEVCAMPER_CONFIG`) that does not exist, any
/// config file that cannot be read or parsed, and malformed numeric environment values.
pub fn load_with<F>(cli: &CliOverrides, env: F, cwd: &Path) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut files = PartialConfig::default();
    for (path, required) in config_paths(cli, &env, cwd) {
        if !path.exists() {
            if required {
                return Err(ConfigError::Missing { path });
            }
            continue;
        }
        files = files.or(read_file(&path)?);
    }

    let env_layer = PartialConfig {
        bind: env("DEVCAMPER_BIND"),
        seed_dir: env("DEVCAMPER_SEED_DIR").map(PathBuf::from),
        log_dir: env("DEVCAMPER_LOG_DIR").map(PathBuf::from),
        log_level: env("DEVCAMPER_LOG_LEVEL"),
        log_retention: env("DEVCAMPER_LOG_RETENTION")
            .map(|v| {
                v.parse().map_err(|_| ConfigError::Invalid {
                    key: "DEVCAMPER_LOG_RETENTION",
                    value: v,
                })
            })
            .transpose()?,
        pagination: None,
    };
    let bind_from_env = env_layer.bind.is_some();
    let cli_layer = PartialConfig {
        bind: cli.bind.clone(),
        seed_dir: cli.seed_dir.clone(),
        ..PartialConfig::default()
    };

    let mut cfg = cli_layer.clone().or(env_layer).or(files).resolve();

    // PORT only moves the port, and only when nothing more specific named an address.
    if cli_layer.bind.is_none() && !bind_from_env {
        if let Some(port) = env("PORT") {
            let port: u16 = port.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: port.clone(),
            })?;
            cfg.bind = with_port(&cfg.bind, port);
        }
    }
    Ok(cfg)
}

fn config_paths<F>(cli: &CliOverrides, env: &F, cwd: &Path) -> Vec<(PathBuf, bool)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut paths = Vec::new();
    if let Some(p) = &cli.config {
        paths.push((p.clone(), true));
    }
    if let Some(p) = env("DEVCAMPER_CONFIG") {
        paths.push((PathBuf::from(p), true));
    }
    paths.push((cwd.join(CONFIG_FILE_NAME), false));
    paths
}

fn read_file(path: &Path) -> Result<PartialConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

fn with_port(bind: &str, port: u16) -> String {
    let host = match bind.rsplit_once(':') {
        Some((host, _)) => host,
        None => bind,
    };
    format!("{host}:{port}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advanced::CountMode;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_any_source() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_with(&CliOverrides::default(), env_of(&[]), dir.path()).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn port_replaces_only_the_port() {
        let dir = tempfile::tempdir().unwrap();
        let cfg =
            load_with(&CliOverrides::default(), env_of(&[("PORT", "8080")]), dir.path()).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:8080");
        let err = load_with(&CliOverrides::default(), env_of(&[("PORT", "http")]), dir.path());
        assert!(matches!(err, Err(ConfigError::Invalid { key: "PORT", .. })));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = CliOverrides {
            config: Some(dir.path().join("nope.toml")),
            ..CliOverrides::default()
        };
        assert!(matches!(
            load_with(&cli, env_of(&[]), dir.path()),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn pagination_section_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[pagination]\nmax_limit = 50\ncount_mode = \"collection\"\n",
        )
        .unwrap();
        let cfg = load_with(&CliOverrides::default(), env_of(&[]), dir.path()).unwrap();
        assert_eq!(cfg.pagination.max_limit, 50);
        assert_eq!(cfg.pagination.default_limit, 20);
        assert_eq!(cfg.pagination.count_mode, CountMode::Collection);
    }
}
