//! Configuration management for pisum
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.pisum/config.toml

use crate::arithmetic::Precision;
use crate::cli::args::{Args, Verbosity};
use crate::convergence::{
    ControllerConfig, TailCorrection, DEFAULT_MAX_ITERATIONS, DEFAULT_STEP_SIZE,
};
use crate::aggregation::DEFAULT_WORKER_COUNT;
use crate::errors::{PiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete configuration for pisum
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Compute service connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub timeout_secs: u64,
}

/// Convergence loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub digits: u32,
    pub step_size: u64,
    pub worker_count: usize,
    pub max_iterations: u64,
    pub tail_correction: TailCorrection,
}

/// Console output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub verbosity: String,
    pub color: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            path: "/compute_pi".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            digits: Precision::DEFAULT_DIGITS,
            step_size: DEFAULT_STEP_SIZE,
            worker_count: DEFAULT_WORKER_COUNT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tail_correction: TailCorrection::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            verbosity: "normal".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PiError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| PiError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pisum").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(PiError::ConfigError("server.host must not be empty".to_string()));
        }

        if !self.server.path.starts_with('/') {
            return Err(PiError::ConfigError(
                "server.path must start with '/'".to_string(),
            ));
        }

        if self.server.timeout_secs == 0 {
            return Err(PiError::ConfigError(
                "server.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if Verbosity::from_name(&self.output.verbosity).is_none() {
            return Err(PiError::ConfigError(format!(
                "Invalid verbosity level: {}",
                self.output.verbosity
            )));
        }

        self.controller_config().validate()
    }

    /// Apply command-line overrides on top of file values
    pub fn apply_args(&mut self, args: &Args) -> Result<()> {
        self.run.digits = args.resolve_digits(self.run.digits);

        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(step_size) = args.step_size {
            self.run.step_size = step_size;
        }
        if let Some(workers) = args.workers {
            self.run.worker_count = workers;
        }
        if let Some(max_iterations) = args.max_iterations {
            self.run.max_iterations = max_iterations;
        }
        if let Some(policy) = &args.tail_correction {
            self.run.tail_correction = policy.parse()?;
        }

        self.validate()
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| PiError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PiError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PiError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Compute service base URL
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    /// Configured verbosity, `Normal` if unrecognised
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_name(&self.output.verbosity).unwrap_or(Verbosity::Normal)
    }

    /// Loop options for the convergence controller
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            precision: Precision::new(self.run.digits),
            step_size: self.run.step_size,
            worker_count: self.run.worker_count,
            max_iterations: self.run.max_iterations,
            tail_correction: self.run.tail_correction,
        }
    }
}
