//! Configuration loading and resolution.
//!
//! Settings are layered: command-line flags win over `OOSA_*` environment
//! variables, which win over the TOML config file, which wins over the
//! built-in defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ::config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;
use url::Url;

use crate::types::{McpError, McpResult};

/// Environment variables are read as `OOSA_<SETTING>`, e.g. `OOSA_BASE_URL`.
pub const ENV_PREFIX: &str = "OOSA";
pub const DEFAULT_CONFIG_FILE: &str = ".oosa-mcp-server.toml";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Stdio,
    Sse,
}

impl FromStr for TransportKind {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(TransportKind::Stdio),
            "sse" => Ok(TransportKind::Sse),
            _ => Err(McpError::Config(format!(
                "unsupported transport '{s}' (expected 'stdio' or 'sse')"
            ))),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Stdio => f.write_str("stdio"),
            TransportKind::Sse => f.write_str("sse"),
        }
    }
}

/// Serve settings as read from one or more layers. Unset fields fall
/// through to the next layer, then to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeSettings {
    pub transport: Option<String>,
    pub addr: Option<String>,
    pub base_url: Option<String>,
    pub log_file: Option<PathBuf>,
    pub enable_command_logging: Option<bool>,
    pub drain_timeout_secs: Option<u64>,
    pub attractions: Option<PathBuf>,
}

impl ServeSettings {
    /// Validate and apply defaults.
    pub fn resolve(self) -> McpResult<RunConfig> {
        let transport = self
            .transport
            .as_deref()
            .unwrap_or("stdio")
            .parse::<TransportKind>()?;

        let raw_base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw_base_url)
            .map_err(|e| McpError::Config(format!("invalid base URL '{raw_base_url}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(McpError::Config(format!(
                "base URL '{raw_base_url}' must use http or https"
            )));
        }

        Ok(RunConfig {
            transport,
            addr: self.addr.unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            base_url,
            log_commands: self.enable_command_logging.unwrap_or(false),
            log_file: self.log_file,
            drain_timeout: Duration::from_secs(
                self.drain_timeout_secs.unwrap_or(DEFAULT_DRAIN_TIMEOUT_SECS),
            ),
            attractions: self.attractions,
        })
    }
}

/// Layer CLI settings over the process environment and the config file.
///
/// An explicit `config_path` must exist; otherwise `.oosa-mcp-server.toml`
/// in the working directory is used when present.
pub fn resolve_settings(cli: ServeSettings, config_path: Option<&Path>) -> McpResult<ServeSettings> {
    layer_settings(cli, config_path, None)
}

/// Like [`resolve_settings`], reading `OOSA_*` variables from `env` instead
/// of the process environment when given.
pub fn layer_settings(
    cli: ServeSettings,
    config_path: Option<&Path>,
    env: Option<Map<String, String>>,
) -> McpResult<ServeSettings> {
    let file = match config_path {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
    };

    Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .ignore_empty(true)
                .source(env),
        )
        .set_override_option("transport", cli.transport)?
        .set_override_option("addr", cli.addr)?
        .set_override_option("base_url", cli.base_url)?
        .set_override_option("log_file", cli.log_file.map(path_value))?
        .set_override_option("enable_command_logging", cli.enable_command_logging)?
        .set_override_option("drain_timeout_secs", cli.drain_timeout_secs)?
        .set_override_option("attractions", cli.attractions.map(path_value))?
        .build()?
        .try_deserialize()
        .map_err(McpError::from)
}

fn path_value(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

/// Fully resolved settings for one server run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub transport: TransportKind,
    pub addr: String,
    pub base_url: Url,
    pub log_commands: bool,
    pub log_file: Option<PathBuf>,
    pub drain_timeout: Duration,
    pub attractions: Option<PathBuf>,
}
