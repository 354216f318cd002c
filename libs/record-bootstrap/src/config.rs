//! Layered application configuration.
//!
//! Precedence, lowest first: built-in defaults, YAML file, `PORT`,
//! `APP__*` environment variables, CLI overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Yaml};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;
use crate::paths::resolve_dir;

/// Prefix of environment overrides; `__` separates nesting levels.
pub const ENV_PREFIX: &str = "APP__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    /// Per-module sections, handed to each module as raw JSON.
    pub modules: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_owned(),
            port: 3000,
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the collection documents; `~` is expanded.
    pub data_dir: String,
    /// Keep every collection in memory only.
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_owned(),
            in_memory: false,
        }
    }
}

impl StorageConfig {
    /// Absolute data directory.
    ///
    /// # Errors
    /// Fails when the configured path is empty or cannot be expanded.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        resolve_dir(&self.data_dir)
            .with_context(|| format!("invalid storage.data_dir '{}'", self.data_dir))
    }
}

/// Command-line values that override the layered configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Load defaults, the optional YAML file and environment overrides.
    ///
    /// An explicitly given `config_path` must exist.
    ///
    /// # Errors
    /// Fails when the file is missing or malformed, or when a value does not
    /// fit its field.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(path) = config_path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment = figment
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: AppConfig = figment.extract().context("invalid configuration")?;
        config.storage.resolved_data_dir()?;
        Ok(config)
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(level) = LoggingConfig::level_for_verbosity(args.verbose) {
            level.clone_into(&mut self.logging.level);
        }
        if args.mock {
            self.storage.in_memory = true;
        }
    }

    /// Typed view of `modules.<name>`; defaults when the section is absent.
    ///
    /// # Errors
    /// Fails when the section does not match `T`.
    pub fn module_config<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            None | Some(serde_json::Value::Null) => Ok(T::default()),
            Some(value) => serde_json::from_value(value.clone())
                .with_context(|| format!("invalid configuration for module '{name}'")),
        }
    }

    /// Effective configuration rendered as YAML.
    ///
    /// # Errors
    /// Fails if the configuration cannot be serialized.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self)
            .map_err(|e| anyhow::anyhow!("failed to render configuration as YAML: {e}"))
    }
}
