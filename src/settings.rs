//! Scene configuration
//!
//! Supplied by the page at mount time as JSON; cached in LocalStorage on web.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::theme::Theme;

/// Configuration rejected at load time
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scene config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scene config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("poll interval must be at least 1ms")]
    ZeroPollInterval,
    #[error("collision display duration must be at least 1ms")]
    ZeroDisplayDuration,
    #[error("item size must be positive, got {0}")]
    ItemSize(f32),
    #[error("boundary height must not be negative, got {0}")]
    BoundaryHeight(f32),
}

/// Images shown by the hero section out of the box
pub const DEFAULT_IMAGES: [&str; 7] = [
    "arc2.jpg", "arc3.jpg", "arc4.jpg", "arc5.jpg", "arc6.jpeg", "arc7.jpeg", "arc8.jpeg",
];

/// Falling-images scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Image sources in display order; "" renders a placeholder block
    pub images: Vec<String>,
    /// Extra classes for the scene root (no effect on the simulation)
    pub class_overrides: Vec<String>,
    /// RNG seed; None draws one from entropy
    pub seed: Option<u64>,

    // === Timing ===
    /// Collision poll period
    pub poll_interval_ms: u64,
    /// How long a collision stays recorded before respawn
    pub collision_display_ms: u64,

    // === Layout ===
    /// Height of the boundary panel at the bottom of the scene
    pub boundary_height: f32,
    /// Falling item edge length
    pub item_size: f32,

    // === Appearance ===
    /// Theme used until the visitor toggles it
    pub theme: Theme,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            images: DEFAULT_IMAGES.iter().map(|s| s.to_string()).collect(),
            class_overrides: Vec::new(),
            seed: None,

            poll_interval_ms: POLL_INTERVAL_MS,
            collision_display_ms: COLLISION_DISPLAY_MS,

            boundary_height: 0.0,
            item_size: ITEM_SIZE,

            theme: Theme::Dark,
        }
    }
}

impl SceneConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.collision_display_ms == 0 {
            return Err(ConfigError::ZeroDisplayDuration);
        }
        if self.item_size.is_nan() || self.item_size <= 0.0 {
            return Err(ConfigError::ItemSize(self.item_size));
        }
        if self.boundary_height.is_nan() || self.boundary_height < 0.0 {
            return Err(ConfigError::BoundaryHeight(self.boundary_height));
        }
        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "hero_fall_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded scene config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored scene config: {}", e),
                }
            }
        }

        log::info!("Using default scene config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Scene config saved");
            }
        }
    }

    /// Native: no LocalStorage, always the defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }

    /// Native: read and validate a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.images.len(), 7);
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.collision_display_ms, 2000);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SceneConfig::from_json(r#"{"images": ["a.jpg", "", "b.jpg"], "seed": 9}"#).unwrap();
        assert_eq!(config.images, vec!["a.jpg", "", "b.jpg"]);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.item_size, 112.0);
        assert_eq!(config.theme, Theme::Dark);
    }

    #[test]
    fn test_rejects_invalid_fields() {
        assert!(matches!(
            SceneConfig::from_json(r#"{"poll_interval_ms": 0}"#),
            Err(ConfigError::ZeroPollInterval)
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{"collision_display_ms": 0}"#),
            Err(ConfigError::ZeroDisplayDuration)
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{"item_size": -4.0}"#),
            Err(ConfigError::ItemSize(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{"boundary_height": -1.0}"#),
            Err(ConfigError::BoundaryHeight(_))
        ));
        assert!(matches!(
            SceneConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SceneConfig::default();
        config.class_overrides = vec!["opacity-80".into()];
        config.theme = Theme::Light;
        let back = SceneConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_from_file() {
        let name = format!("hero_fall_config_{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, r#"{"seed": 77, "boundary_height": 24.0}"#).unwrap();
        let config = SceneConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.seed, Some(77));
        assert_eq!(config.boundary_height, 24.0);
    }

    #[test]
    fn test_load_from_missing_file_keeps_io_error() {
        let path = std::env::temp_dir().join("hero_fall_config_does_not_exist.json");
        assert!(matches!(SceneConfig::load_from(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_native_storage_is_inert() {
        let mut config = SceneConfig::default();
        config.seed = Some(5);
        config.save();
        assert_eq!(SceneConfig::load(), SceneConfig::default());
    }
}
