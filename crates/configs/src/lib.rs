use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub allocator: AllocatorConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::File, data_dir: default_data_dir() }
    }
}

/// How the allocator treats two concurrent first-time requests for one name.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RacePolicy {
    /// Check-then-put with blind overwrites. Concurrent callers may each mint an id.
    Inherit,
    /// Conditional writes on both the id and a `name -> id` index.
    #[default]
    Guarded,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllocatorConfig {
    #[serde(default = "default_id_min")]
    pub id_min: u32,
    #[serde(default = "default_id_max")]
    pub id_max: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub race_policy: RacePolicy,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            id_min: default_id_min(),
            id_max: default_id_max(),
            max_attempts: default_max_attempts(),
            race_policy: RacePolicy::default(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_valid_roles")]
    pub valid_roles: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self { Self { valid_roles: default_valid_roles() } }
}

fn default_data_dir() -> String { "data".into() }
fn default_id_min() -> u32 { 1 }
fn default_id_max() -> u32 { 10_000 }
fn default_max_attempts() -> u32 { 1_000 }
fn default_request_timeout_ms() -> u64 { 5_000 }
fn default_valid_roles() -> Vec<String> {
    ["Admin", "Faculty/Staff", "Coach", "Mentor"].iter().map(|s| s.to_string()).collect()
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file if present, otherwise defaults plus environment overrides.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Environment overrides: `SERVER_HOST`, `SERVER_PORT`, `DATA_DIR`, `TOKIO_WORKER_THREADS`.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            self.storage.data_dir = dir;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize();
        self.allocator.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize(&mut self) {
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
    }
}

impl AllocatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.id_min == 0 {
            return Err(anyhow!("allocator.id_min must be >= 1"));
        }
        if self.id_min > self.id_max {
            return Err(anyhow!("allocator.id_min must be <= allocator.id_max"));
        }
        if self.max_attempts == 0 {
            return Err(anyhow!("allocator.max_attempts must be >= 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(anyhow!("allocator.request_timeout_ms must be a positive number of milliseconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<()> {
        if self.valid_roles.iter().all(|r| r.trim().is_empty()) {
            return Err(anyhow!("auth.valid_roles must name at least one role"));
        }
        Ok(())
    }
}
