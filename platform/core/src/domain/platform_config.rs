// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

// Platform Configuration Types
//
// Defines the configuration schema for a Benevole API node:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP server binding
// - Storage backend selection (in-memory or PostgreSQL)
// - Registration policy (matricule prefix, password rules, hashing cost)
// - Observability settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::repository::{PostgresConfig, StorageBackend};

pub const API_VERSION: &str = "benevole.org/v1";
pub const KIND: &str = "PlatformConfig";

/// Top-level Kubernetes-style platform configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfigManifest {
    /// API version (must be "benevole.org/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "PlatformConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: PlatformConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable deployment name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformConfigSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub registration: RegistrationConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackendKind {
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackendKind,

    /// PostgreSQL connection string (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Prefix of generated matricules (e.g. "VOL" -> "VOL-000042")
    #[serde(default = "default_matricule_prefix")]
    pub matricule_prefix: String,

    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,

    #[serde(default)]
    pub password_hashing: PasswordHashingConfig,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHashingConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Events buffered per subscriber before the slowest one lags
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus exposition
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_backend() -> StorageBackendKind {
    StorageBackendKind::InMemory
}

fn default_max_connections() -> u32 {
    5
}

fn default_matricule_prefix() -> String {
    "VOL".to_string()
}

fn default_password_min_length() -> usize {
    8
}

// OWASP recommendation for Argon2id: m=19 MiB, t=2, p=1
fn default_memory_kib() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_bus_capacity() -> usize {
    1000
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            matricule_prefix: default_matricule_prefix(),
            password_min_length: default_password_min_length(),
            password_hashing: PasswordHashingConfig::default(),
        }
    }
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            event_bus_capacity: default_event_bus_capacity(),
            metrics: None,
        }
    }
}

impl Default for PlatformConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "benevole-node".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: PlatformConfigSpec::default(),
        }
    }
}

impl PlatformConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. BENEVOLE_CONFIG_PATH environment variable
    /// 2. ./benevole-config.yaml (working directory)
    /// 3. ~/.benevole/config.yaml (user home)
    /// 4. /etc/benevole/config.yaml (system, Unix) or C:\ProgramData\Benevole\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("BENEVOLE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./benevole-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".benevole").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/benevole/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Benevole\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using an arbitrary variable lookup
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BENEVOLE_DATABASE_URL") {
            tracing::info!("Environment override: BENEVOLE_DATABASE_URL (backend=postgres)");
            self.spec.storage.database_url = Some(url);
            self.spec.storage.backend = StorageBackendKind::Postgres;
        }

        if let Some(val) = lookup("BENEVOLE_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: BENEVOLE_PORT={}", port);
                    self.spec.server.port = port;
                }
                Err(_) => {
                    tracing::warn!("Invalid value for BENEVOLE_PORT: '{}'. Ignoring.", val);
                }
            }
        }

        if let Some(addr) = lookup("BENEVOLE_BIND_ADDRESS") {
            tracing::info!("Environment override: BENEVOLE_BIND_ADDRESS={}", addr);
            self.spec.server.bind_address = addr;
        }
    }

    /// Resolve the connection string, following "env:VAR_NAME" indirection
    pub fn resolved_database_url(&self) -> anyhow::Result<Option<String>> {
        match self.spec.storage.database_url.as_deref() {
            None => Ok(None),
            Some(value) => match value.strip_prefix("env:") {
                Some(var) => std::env::var(var)
                    .map(Some)
                    .map_err(|_| anyhow::anyhow!("Environment variable '{}' referenced by database_url is not set", var)),
                None => Ok(Some(value.to_string())),
            },
        }
    }

    /// Storage backend selected by this configuration
    pub fn storage_backend(&self) -> anyhow::Result<StorageBackend> {
        match self.spec.storage.backend {
            StorageBackendKind::InMemory => Ok(StorageBackend::InMemory),
            StorageBackendKind::Postgres => {
                let connection_string = self
                    .resolved_database_url()?
                    .ok_or_else(|| anyhow::anyhow!("spec.storage.database_url is required for the postgres backend"))?;
                Ok(StorageBackend::PostgreSQL(PostgresConfig {
                    connection_string,
                    max_connections: self.spec.storage.max_connections,
                }))
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.server.port == 0 {
            anyhow::bail!("spec.server.port cannot be 0");
        }

        if self.spec.storage.backend == StorageBackendKind::Postgres {
            if self.spec.storage.database_url.as_deref().map(str::is_empty).unwrap_or(true) {
                anyhow::bail!("spec.storage.database_url is required for the postgres backend");
            }
            if self.spec.storage.max_connections == 0 {
                anyhow::bail!("spec.storage.max_connections must be at least 1");
            }
        }

        let prefix = &self.spec.registration.matricule_prefix;
        let prefix_ok = prefix
            .chars()
            .next()
            .map(|c| c.is_ascii_uppercase())
            .unwrap_or(false)
            && prefix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !prefix_ok {
            anyhow::bail!(
                "Invalid spec.registration.matricule_prefix: '{}'. Use uppercase letters and digits, starting with a letter",
                prefix
            );
        }

        if self.spec.registration.password_min_length < 8 {
            anyhow::bail!("spec.registration.password_min_length cannot be lower than 8");
        }

        let hashing = &self.spec.registration.password_hashing;
        if hashing.iterations == 0 || hashing.parallelism == 0 {
            anyhow::bail!("spec.registration.password_hashing iterations and parallelism must be at least 1");
        }
        if hashing.memory_kib < 8 * hashing.parallelism {
            anyhow::bail!(
                "spec.registration.password_hashing.memory_kib must be at least 8 * parallelism ({})",
                8 * hashing.parallelism
            );
        }

        if self.spec.observability.event_bus_capacity == 0 {
            anyhow::bail!("spec.observability.event_bus_capacity must be at least 1");
        }

        Ok(())
    }
}
