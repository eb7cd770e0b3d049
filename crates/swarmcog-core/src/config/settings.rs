use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How cognitive tasks are executed.
///
/// Only `Asynchronous` (the worker pool) is implemented. The other modes are
/// accepted so existing configuration keeps parsing, and fall back to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    Synchronous,
    #[default]
    Asynchronous,
    Distributed,
}

impl ProcessingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingMode::Synchronous => "synchronous",
            ProcessingMode::Asynchronous => "asynchronous",
            ProcessingMode::Distributed => "distributed",
        }
    }

    /// Whether this mode runs as configured rather than falling back to the pool.
    pub fn is_native(self) -> bool {
        self == ProcessingMode::Asynchronous
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProcessingMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "synchronous" | "sync" => Ok(ProcessingMode::Synchronous),
            "asynchronous" | "async" => Ok(ProcessingMode::Asynchronous),
            "distributed" => Ok(ProcessingMode::Distributed),
            other => Err(CoreError::Config(format!("unknown processing mode: {other}"))),
        }
    }
}

/// Runtime configuration consumed by the store, the scheduler and the driver loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmCogConfig {
    pub processing_mode: ProcessingMode,
    /// Worker threads; `None` means one per available hardware thread.
    pub worker_count: Option<usize>,
    /// Seconds between cycles. Driven by the caller's loop, not the scheduler.
    pub cycle_interval_secs: f64,
    pub max_agents: usize,
    pub space_name: String,
    pub log_level: String,
}

impl Default for SwarmCogConfig {
    fn default() -> Self {
        Self {
            processing_mode: ProcessingMode::Asynchronous,
            worker_count: None,
            cycle_interval_secs: 1.0,
            max_agents: 50,
            space_name: "swarmcog_space".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl SwarmCogConfig {
    /// Read config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        let config: SwarmCogConfig = serde_json::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Write config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.cycle_interval_secs.is_finite() || self.cycle_interval_secs <= 0.0 {
            return Err(CoreError::Config(format!(
                "cycle_interval_secs must be positive, got {}",
                self.cycle_interval_secs
            )));
        }
        if self.worker_count == Some(0) {
            return Err(CoreError::Config("worker_count must be at least 1".into()));
        }
        if self.max_agents == 0 {
            return Err(CoreError::Config("max_agents must be at least 1".into()));
        }
        if self.space_name.trim().is_empty() {
            return Err(CoreError::Config("space_name is empty".into()));
        }
        Ok(())
    }

    /// Worker count with the hardware default applied.
    pub fn effective_workers(&self) -> usize {
        self.worker_count.unwrap_or_else(default_workers).max(1)
    }

    pub fn cycle_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.cycle_interval_secs)
    }
}

/// Available hardware parallelism, at least 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SwarmCogConfig::default();
        assert_eq!(config.processing_mode, ProcessingMode::Asynchronous);
        assert_eq!(config.max_agents, 50);
        assert!(config.effective_workers() >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("swarmcog.json");
        std::fs::write(
            &path,
            r#"{"processing_mode": "distributed", "worker_count": 3}"#,
        )
        .unwrap();

        let config = SwarmCogConfig::load(&path).unwrap();
        assert_eq!(config.processing_mode, ProcessingMode::Distributed);
        assert!(!config.processing_mode.is_native());
        assert_eq!(config.effective_workers(), 3);
        assert_eq!(config.space_name, "swarmcog_space");
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        let config = SwarmCogConfig {
            cycle_interval_secs: 0.25,
            space_name: "lab".into(),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(SwarmCogConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, r#"{"cycle_interval_secs": 0}"#).unwrap();
        assert!(matches!(
            SwarmCogConfig::load(&path),
            Err(CoreError::Config(_))
        ));

        let zero_workers = SwarmCogConfig {
            worker_count: Some(0),
            ..Default::default()
        };
        assert!(zero_workers.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SwarmCogConfig::load(&path),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_processing_mode_parse() {
        assert_eq!(
            "sync".parse::<ProcessingMode>().unwrap(),
            ProcessingMode::Synchronous
        );
        assert_eq!(
            "Asynchronous".parse::<ProcessingMode>().unwrap(),
            ProcessingMode::Asynchronous
        );
        assert!("quantum".parse::<ProcessingMode>().is_err());
    }
}
