use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV: &str = "CHECK_PALOALTO_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    #[serde(default)]
    pub appliance: ApplianceConfig,
    #[serde(default)]
    pub state: StateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplianceConfig {
    /// Bound on each XML API request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Self-signed management certificates are common; `--insecure` overrides per run.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            verify_tls: default_verify_tls(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    /// SQLite file holding throughput baselines.
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
    /// Max wait for the store's write lock.
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
            lock_timeout_secs: default_lock_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_verify_tls() -> bool {
    true
}

fn default_state_path() -> PathBuf {
    PathBuf::from("/var/lib/check_paloalto/counters.db")
}

fn default_lock_timeout_secs() -> u64 {
    5
}

impl ProbeConfig {
    /// Explicit path must exist. Without one, `CHECK_PALOALTO_CONFIG` is tried and
    /// a missing file there means defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            return Self::load_file(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(p) if Path::new(&p).exists() => Self::load_file(Path::new(&p)),
            _ => Ok(Self::default()),
        }
    }

    fn load_file(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: ProbeConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.appliance.timeout_secs > 0,
            "appliance.timeout_secs must be > 0, got {}",
            self.appliance.timeout_secs
        );
        anyhow::ensure!(
            !self.state.path.as_os_str().is_empty(),
            "state.path must be non-empty"
        );
        anyhow::ensure!(
            self.state.lock_timeout_secs > 0,
            "state.lock_timeout_secs must be > 0, got {}",
            self.state.lock_timeout_secs
        );
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.appliance.timeout_secs)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.state.lock_timeout_secs)
    }
}
