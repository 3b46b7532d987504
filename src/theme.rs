//! Light/dark theme flag
//!
//! Persisted separately from the scene config in LocalStorage.

use serde::{Deserialize, Serialize};

/// RGBA color, components in [0, 1]
pub type Color = [f32; 4];

/// Site theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// The other theme
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn toggle(&mut self) {
        *self = self.toggled();
    }

    /// Icon name for the toggle button (what clicking switches to)
    pub fn toggle_icon(&self) -> &'static str {
        match self {
            Theme::Light => "dark-mode",
            Theme::Dark => "sun",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => Palette {
                backdrop: [1.0, 1.0, 1.0, 1.0],
                grid: [0.0, 0.0, 0.0, 0.2],
                buildings: [
                    ([0.61, 0.64, 0.69, 1.0], [0.29, 0.33, 0.39, 1.0]),
                    ([0.82, 0.84, 0.86, 1.0], [0.42, 0.45, 0.50, 1.0]),
                    ([0.90, 0.91, 0.92, 1.0], [0.61, 0.64, 0.69, 1.0]),
                ],
                boundary: [0.96, 0.96, 0.96, 1.0],
            },
            Theme::Dark => Palette {
                backdrop: [0.0, 0.0, 0.02, 1.0],
                grid: [1.0, 1.0, 1.0, 0.03],
                buildings: [
                    ([0.22, 0.25, 0.32, 1.0], [0.07, 0.09, 0.15, 1.0]),
                    ([0.29, 0.33, 0.39, 1.0], [0.12, 0.16, 0.22, 1.0]),
                    ([0.42, 0.45, 0.50, 1.0], [0.22, 0.25, 0.32, 1.0]),
                ],
                boundary: [0.96, 0.96, 0.96, 1.0],
            },
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "hero_fall_theme";

    /// Load the visitor's theme from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load(fallback: Theme) -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten())
            .and_then(|s| Self::from_str(&s));

        match stored {
            Some(theme) => {
                log::info!("Loaded theme: {}", theme.as_str());
                theme
            }
            None => fallback,
        }
    }

    /// Save the theme to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, self.as_str());
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(fallback: Theme) -> Self {
        fallback
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Theme-dependent colors used by the scene composer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub backdrop: Color,
    pub grid: Color,
    /// (from, to) gradient per building block
    pub buildings: [(Color, Color); 3],
    pub boundary: Color,
}
