use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const CONFIG_ENV_VAR: &str = "PAYOFF_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "payoff.toml";

/// 100 years of monthly payments.
pub const DEFAULT_HORIZON_MONTHS: u32 = 1200;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub report: ReportConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub horizon_months: u32,
    pub default_extra_payment: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            default_extra_payment: 0.0,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("payoff-data.json"),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "The Pour & Payoff Planner".to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.simulation.horizon_months == 0 {
            return Err(Error::Config(
                "simulation.horizon_months must be > 0".to_string(),
            ));
        }
        let extra = self.simulation.default_extra_payment;
        if !extra.is_finite() || extra < 0.0 {
            return Err(Error::Config(
                "simulation.default_extra_payment must be >= 0".to_string(),
            ));
        }
        if self.report.title.trim().is_empty() {
            return Err(Error::Config("report.title must not be empty".to_string()));
        }
        Ok(())
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref)
        .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path_ref, e)))?;
    parse_config(&contents).map_err(|e| match e {
        Error::Toml(e) => Error::Config(format!(
            "Failed to parse TOML from config file {:?}: {}",
            path_ref, e
        )),
        other => other,
    })
}

/// Resolves the configuration source: an explicit path wins, then the
/// `PAYOFF_CONFIG` variable, then `payoff.toml` in the working directory.
/// With none of these present the defaults are used.
pub fn load_app_configuration(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return load_config(path);
    }
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return load_config(default_path);
    }
    tracing::info!("No configuration file found, using defaults.");
    Ok(AppConfig::default())
}
