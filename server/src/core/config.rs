use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::provenance::NarrativeDetail;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CONNECTOR_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_PROXY_TIMEOUT_SECS, DEFAULT_PROXY_URL,
};

// =============================================================================
// Build Strategy Enum
// =============================================================================

/// How a record set is assembled for an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStrategy {
    /// One retrieval per record kind for the whole event chain
    #[default]
    Batched,
    /// One record set per chain event, merged; facilities must resolve uniquely
    PerEvent,
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStrategy::Batched => write!(f, "batched"),
            BuildStrategy::PerEvent => write!(f, "per_event"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON, every field optional)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Provenance proxy section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProxyFileConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Connector section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConnectorFileConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Trace building section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TraceFileConfig {
    pub strategy: Option<BuildStrategy>,
}

/// Narrative view section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NarrativeFileConfig {
    pub detail: Option<NarrativeDetail>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub proxy: Option<ProxyFileConfig>,
    pub connector: Option<ConnectorFileConfig>,
    pub trace: Option<TraceFileConfig>,
    pub narrative: Option<NarrativeFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(proxy) = other.proxy {
            let current = self.proxy.get_or_insert_with(ProxyFileConfig::default);
            if proxy.url.is_some() {
                tracing::trace!(url = ?proxy.url, "Merging proxy.url");
                current.url = proxy.url;
            }
            if proxy.timeout_secs.is_some() {
                current.timeout_secs = proxy.timeout_secs;
            }
        }

        if let Some(connector) = other.connector {
            let current = self
                .connector
                .get_or_insert_with(ConnectorFileConfig::default);
            if connector.url.is_some() {
                tracing::trace!(url = ?connector.url, "Merging connector.url");
                current.url = connector.url;
            }
            if connector.timeout_secs.is_some() {
                current.timeout_secs = connector.timeout_secs;
            }
        }

        if let Some(trace) = other.trace {
            let current = self.trace.get_or_insert_with(TraceFileConfig::default);
            if trace.strategy.is_some() {
                tracing::trace!(strategy = ?trace.strategy, "Merging trace.strategy");
                current.strategy = trace.strategy;
            }
        }

        // The detail header is replaced as a whole
        if let Some(narrative) = other.narrative
            && narrative.detail.is_some()
        {
            tracing::trace!("Merging narrative.detail");
            self.narrative = Some(narrative);
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub url: String,
    pub timeout_secs: u64,
}

/// Payload uploads are disabled when `url` is `None`
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub proxy: ProxyConfig,
    pub connector: ConnectorConfig,
    pub strategy: BuildStrategy,
    pub narrative: NarrativeDetail,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.provenance/provenance.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let file_server = file_config.server.unwrap_or_default();
        let file_proxy = file_config.proxy.unwrap_or_default();
        let file_connector = file_config.connector.unwrap_or_default();
        let file_trace = file_config.trace.unwrap_or_default();
        let file_narrative = file_config.narrative.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let proxy = ProxyConfig {
            url: cli
                .proxy_url
                .clone()
                .or(file_proxy.url)
                .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string()),
            timeout_secs: file_proxy
                .timeout_secs
                .unwrap_or(DEFAULT_PROXY_TIMEOUT_SECS),
        };

        // An empty URL from env or file disables the connector
        let connector = ConnectorConfig {
            url: cli
                .connector_url
                .clone()
                .or(file_connector.url)
                .filter(|url| !url.trim().is_empty()),
            timeout_secs: file_connector
                .timeout_secs
                .unwrap_or(DEFAULT_CONNECTOR_TIMEOUT_SECS),
        };

        let strategy = cli
            .trace_strategy
            .or(file_trace.strategy)
            .unwrap_or_default();

        let config = Self {
            server: ServerConfig { host, port },
            proxy,
            connector,
            strategy,
            narrative: file_narrative.detail.unwrap_or_default(),
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            proxy_url = %config.proxy.url,
            proxy_timeout_secs = config.proxy.timeout_secs,
            connector_url = ?config.connector.url,
            strategy = %config.strategy,
            "Configuration loaded"
        );

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }
        if !is_http_url(&self.proxy.url) {
            anyhow::bail!(
                "Configuration error: proxy.url must be an http(s) URL, got '{}'",
                self.proxy.url
            );
        }
        if self.proxy.timeout_secs == 0 {
            anyhow::bail!("Configuration error: proxy.timeout_secs must be greater than 0");
        }
        if let Some(url) = &self.connector.url
            && !is_http_url(url)
        {
            anyhow::bail!(
                "Configuration error: connector.url must be an http(s) URL, got '{}'",
                url
            );
        }
        if self.connector.timeout_secs == 0 {
            anyhow::bail!("Configuration error: connector.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

/// Get the profile config path (~/.provenance/provenance.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
