use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::noise::NoiseConfig;
use crate::scenario::ScenarioPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

fn default_version() -> String {
    "1".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self { version: default_version(), core: CoreConfig::default(), simulation: SimulationConfig::default() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    #[serde(default = "default_bind_http")]
    pub bind_http: String,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// The dashboard polls `localhost:5000`.
fn default_bind_http() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            bind_http: default_bind_http(),
            cors: CorsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// `"*"` anywhere in the list opens the policy to every origin.
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,
}

fn default_allow_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allow_origins: default_allow_origins() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { metrics_path: default_metrics_path() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationConfig {
    /// Fixed RNG seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub scenario_policy: ScenarioPolicy,
    #[serde(default)]
    pub noise: NoiseConfig,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    /// Picks the config file and applies the bind override.
    ///
    /// `arg` (from `--config`) wins over `env` (`HYDRAMIND_CONFIG`); either one
    /// must exist. Only `default_path` may be absent, which yields built-in
    /// defaults. `bind` (`HYDRAMIND_BIND`) replaces `core.bind_http`.
    pub fn resolve(
        arg: Option<String>,
        env: Option<String>,
        default_path: impl AsRef<Path>,
        bind: Option<String>,
    ) -> anyhow::Result<Self> {
        let default_path = default_path.as_ref();
        let mut cfg = if let Some(path) = arg.or(env) {
            let cfg = Self::from_path(&path).context("loading config")?;
            info!(config_path=%path, "loaded config");
            cfg
        } else if default_path.exists() {
            let cfg = Self::from_path(default_path).context("loading config")?;
            info!(config_path=%default_path.display(), "loaded config");
            cfg
        } else {
            info!("no config file, using defaults");
            Self::default()
        };

        if let Some(bind) = bind {
            info!(%bind, "bind address overridden");
            cfg.core.bind_http = bind;
        }
        Ok(cfg)
    }
}
