//! Settings file loading
//!
//! Settings are read from `~/.config/gravrun/settings.toml` unless a path is
//! given on the command line. Missing sections and fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use gravrun_game::GameConfig;
use tracing::{info, warn};

/// Default settings file location
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gravrun").join("settings.toml"))
}

/// Load settings from `path`, or return defaults if the file is missing or broken
pub fn load(path: Option<&Path>) -> GameConfig {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_path) else {
        warn!("Could not determine config directory");
        return GameConfig::default();
    };

    if !path.exists() {
        info!("No settings file at {:?}, using defaults", path);
        return GameConfig::default();
    }

    match fs::read_to_string(&path) {
        Ok(content) => match parse(&content) {
            Ok(config) => {
                info!("Loaded settings from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to parse settings: {}, using defaults", e);
                GameConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read settings file: {}, using defaults", e);
            GameConfig::default()
        }
    }
}

/// Parse settings from TOML text
pub fn parse(content: &str) -> Result<GameConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Write the default settings to `path`, creating parent directories
pub fn write_defaults(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;
    }
    let content = toml::to_string_pretty(&GameConfig::default())?;
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Wrote default settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gravrun_game::{SpeedCarryPolicy, TimeoutPolicy};

    #[test]
    fn test_partial_settings_fill_defaults() {
        let config = parse(
            r#"
            [movement]
            run_speed = 12.0
            speed_carry = { decay = { rate = 20.0 } }

            [reorientation]
            timeout_policy = "world_down"
            "#,
        )
        .unwrap();
        assert_eq!(config.movement.run_speed, 12.0);
        assert_eq!(
            config.movement.speed_carry,
            SpeedCarryPolicy::Decay { rate: 20.0 }
        );
        assert_eq!(config.movement.dash_speed, 25.0);
        assert_eq!(
            config.reorientation.timeout_policy,
            TimeoutPolicy::WorldDown
        );
        assert_eq!(config.reorientation.buffer_duration, 0.5);
    }

    #[test]
    fn test_defaults_survive_roundtrip() {
        let text = toml::to_string_pretty(&GameConfig::default()).unwrap();
        let config = parse(&text).unwrap();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.power_up.threshold, 100.0);
    }

    #[test]
    fn test_malformed_settings_rejected() {
        assert!(parse("[movement]\nrun_speed = \"fast\"").is_err());
    }
}
