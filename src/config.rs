use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration for Homeport.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Port for the dashboard HTTP server.
    pub port: u16,
    /// Bind address (127.0.0.1 = local only, 0.0.0.0 = all interfaces).
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the JSON data file. Defaults to data_dir/data.json.
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Admin password gating mutating UI actions.
    pub password: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProxyConfig {
    /// Timeout for outbound widget requests, in seconds.
    pub timeout_secs: u64,
    /// Accept self-signed certificates on Portainer/Uptime Kuma instances.
    pub accept_invalid_certs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8780,
            bind: "127.0.0.1".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: None }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { password: None }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            accept_invalid_certs: true,
        }
    }
}

impl Config {
    /// Resolve the admin password: configured value, else "admin".
    /// The ADMIN_PASSWORD env var is applied by `apply_env_overrides`.
    pub fn admin_password(&self) -> String {
        self.auth
            .password
            .clone()
            .unwrap_or_else(|| "admin".to_string())
    }
}

/// Determine the default data directory for config and data files.
pub fn default_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("homeport")
}

/// Load config from a TOML file, falling back to defaults for missing fields.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        validate_server_config(&config.server)?;

        // Apply environment variable overrides (for Docker)
        apply_env_overrides(&mut config);

        Ok(config)
    } else {
        tracing::info!("No config file found at {:?}, using defaults", path);
        let mut config = Config::default();
        apply_env_overrides(&mut config);
        Ok(config)
    }
}

/// Apply environment variable overrides to config.
/// Supports: HOMEPORT_PORT, HOMEPORT_BIND, HOMEPORT_DATA_FILE, ADMIN_PASSWORD
fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("HOMEPORT_PORT") {
        if let Ok(port) = val.parse::<u16>() {
            config.server.port = port;
        }
    }
    if let Ok(val) = std::env::var("HOMEPORT_BIND") {
        if !val.is_empty() {
            config.server.bind = val;
        }
    }
    if let Ok(val) = std::env::var("HOMEPORT_DATA_FILE") {
        if !val.is_empty() {
            config.store.path = Some(PathBuf::from(val));
        }
    }
    if let Ok(val) = std::env::var("ADMIN_PASSWORD") {
        if !val.is_empty() {
            config.auth.password = Some(val);
        }
    }
}

/// Validate the server bind address parses as an IP.
fn validate_server_config(server: &ServerConfig) -> anyhow::Result<()> {
    server.bind.parse::<std::net::IpAddr>().map_err(|_| {
        anyhow::anyhow!(
            "server.bind must be a valid IP address (e.g. 127.0.0.1), got: {}",
            server.bind
        )
    })?;
    Ok(())
}
