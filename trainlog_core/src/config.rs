//! Configuration file support for trainlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/trainlog/config.toml`.
//! Every value has a default, so a partial file (or none at all) is fine.

use crate::{BlockFocus, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub fatigue: FatigueConfig,

    #[serde(default)]
    pub zones: ZoneConfig,

    #[serde(default)]
    pub targets: TargetConfig,

    #[serde(default)]
    pub load_weights: LoadWeights,

    #[serde(default)]
    pub training: TrainingConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Rolling window for monotony and strain
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FatigueConfig {
    /// Number of trailing sessions
    #[serde(default = "default_window")]
    pub window: usize,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

/// Thresholds used to bucket readiness and strain
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoneConfig {
    #[serde(default = "default_readiness_high")]
    pub readiness_high: f64,

    #[serde(default = "default_readiness_medium")]
    pub readiness_medium: f64,

    #[serde(default = "default_strain_high")]
    pub strain_high: f64,

    #[serde(default = "default_strain_medium")]
    pub strain_medium: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            readiness_high: default_readiness_high(),
            readiness_medium: default_readiness_medium(),
            strain_high: default_strain_high(),
            strain_medium: default_strain_medium(),
        }
    }
}

/// Reference values the hybrid score compares personal bests against
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_squat_target")]
    pub squat: f64,

    #[serde(default = "default_bench_target")]
    pub bench: f64,

    #[serde(default = "default_deadlift_target")]
    pub deadlift: f64,

    #[serde(default = "default_hspu_target")]
    pub hspu_reps: f64,

    #[serde(default = "default_muscle_up_target")]
    pub muscle_up_reps: f64,

    #[serde(default = "default_planche_target")]
    pub planche_sec: f64,

    #[serde(default = "default_weighted_pullup_target")]
    pub weighted_pullup_kg: f64,

    #[serde(default = "default_box_jump_target")]
    pub box_jump_cm: f64,

    /// Upper bound on any best/target ratio
    #[serde(default = "default_ratio_cap")]
    pub ratio_cap: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            squat: default_squat_target(),
            bench: default_bench_target(),
            deadlift: default_deadlift_target(),
            hspu_reps: default_hspu_target(),
            muscle_up_reps: default_muscle_up_target(),
            planche_sec: default_planche_target(),
            weighted_pullup_kg: default_weighted_pullup_target(),
            box_jump_cm: default_box_jump_target(),
            ratio_cap: default_ratio_cap(),
        }
    }
}

/// Load multipliers for bodyweight-skill metrics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadWeights {
    #[serde(default = "default_hspu_weight")]
    pub hspu_reps: f64,

    #[serde(default = "default_muscle_up_weight")]
    pub muscle_up_reps: f64,

    #[serde(default = "default_planche_weight")]
    pub planche_sec: f64,

    #[serde(default = "default_weighted_pullup_weight")]
    pub weighted_pullup_kg: f64,

    #[serde(default = "default_box_jump_weight")]
    pub box_jump_cm: f64,
}

impl Default for LoadWeights {
    fn default() -> Self {
        Self {
            hspu_reps: default_hspu_weight(),
            muscle_up_reps: default_muscle_up_weight(),
            planche_sec: default_planche_weight(),
            weighted_pullup_kg: default_weighted_pullup_weight(),
            box_jump_cm: default_box_jump_weight(),
        }
    }
}

/// Current training block
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_focus")]
    pub focus: BlockFocus,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            focus: default_focus(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("trainlog")
}

fn default_window() -> usize {
    7
}

fn default_readiness_high() -> f64 {
    70.0
}

fn default_readiness_medium() -> f64 {
    40.0
}

fn default_strain_high() -> f64 {
    25_000.0
}

fn default_strain_medium() -> f64 {
    10_000.0
}

fn default_squat_target() -> f64 {
    220.0
}

fn default_bench_target() -> f64 {
    160.0
}

fn default_deadlift_target() -> f64 {
    260.0
}

fn default_hspu_target() -> f64 {
    15.0
}

fn default_muscle_up_target() -> f64 {
    10.0
}

fn default_planche_target() -> f64 {
    20.0
}

fn default_weighted_pullup_target() -> f64 {
    40.0
}

fn default_box_jump_target() -> f64 {
    100.0
}

fn default_ratio_cap() -> f64 {
    1.3
}

fn default_hspu_weight() -> f64 {
    10.0
}

fn default_muscle_up_weight() -> f64 {
    15.0
}

fn default_planche_weight() -> f64 {
    1.0
}

fn default_weighted_pullup_weight() -> f64 {
    5.0
}

fn default_box_jump_weight() -> f64 {
    2.0
}

fn default_focus() -> BlockFocus {
    BlockFocus::MaxStrength
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("trainlog").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check values that would make the analytics meaningless
    ///
    /// Returns one message per problem; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.fatigue.window == 0 {
            errors.push("fatigue.window must be at least 1".to_string());
        }

        if self.zones.readiness_medium > self.zones.readiness_high {
            errors.push("zones.readiness_medium must not exceed zones.readiness_high".to_string());
        }
        if self.zones.strain_medium > self.zones.strain_high {
            errors.push("zones.strain_medium must not exceed zones.strain_high".to_string());
        }

        let t = &self.targets;
        let targets = [
            ("targets.squat", t.squat),
            ("targets.bench", t.bench),
            ("targets.deadlift", t.deadlift),
            ("targets.hspu_reps", t.hspu_reps),
            ("targets.muscle_up_reps", t.muscle_up_reps),
            ("targets.planche_sec", t.planche_sec),
            ("targets.weighted_pullup_kg", t.weighted_pullup_kg),
            ("targets.box_jump_cm", t.box_jump_cm),
            ("targets.ratio_cap", t.ratio_cap),
        ];
        for (name, value) in targets {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("{} must be a positive number (got {})", name, value));
            }
        }

        let w = &self.load_weights;
        let weights = [
            ("load_weights.hspu_reps", w.hspu_reps),
            ("load_weights.muscle_up_reps", w.muscle_up_reps),
            ("load_weights.planche_sec", w.planche_sec),
            ("load_weights.weighted_pullup_kg", w.weighted_pullup_kg),
            ("load_weights.box_jump_cm", w.box_jump_cm),
        ];
        for (name, value) in weights {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(format!("{} must not be negative (got {})", name, value));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fatigue.window, 7);
        assert_eq!(config.zones.readiness_high, 70.0);
        assert_eq!(config.zones.strain_high, 25_000.0);
        assert_eq!(config.targets.deadlift, 260.0);
        assert_eq!(config.load_weights.muscle_up_reps, 15.0);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.fatigue.window, parsed.fatigue.window);
        assert_eq!(config.training.focus, parsed.training.focus);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[targets]
squat = 180.0

[training]
focus = "power"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.targets.squat, 180.0);
        assert_eq!(config.targets.bench, 160.0); // default
        assert_eq!(config.training.focus, BlockFocus::Power);
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = Config::default();
        config.fatigue.window = 0;
        config.targets.bench = 0.0;
        config.zones.strain_medium = 30_000.0;

        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("targets.bench")));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.fatigue.window = 10;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.fatigue.window, 10);
    }
}
