//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/landscape/config.toml` (XDG) or platform config dir
//! 2. Project config: `.landscape.toml`
//! 3. Environment variables: `LANDSCAPE_*`, nested with `__`
//!    (e.g. `LANDSCAPE_SIMULATION__CHARGE_STRENGTH=-60`)
//!
//! # Example
//!
//! ```toml
//! [simulation]
//! link_distance = 16.0
//! max_radius = 90.0
//!
//! [camera]
//! settle_only = true
//!
//! [render]
//! label_budget = 100
//! refresh_interval_secs = 5
//!
//! [theme]
//! name = "segment"
//! ```
//!
//! Every section and field is optional. An inline `[theme.custom]` table
//! overrides the named preset.

use std::ops::Deref;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::error::AppError;
use crate::simulation::SimulationConfig;
use crate::theme::Theme;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub theme: ThemeSelection,
}

/// Frame loop and refresh settings for the visualizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum number of node labels drawn per frame.
    pub label_budget: usize,
    /// Simulation ticks per rendered frame.
    pub ticks_per_frame: usize,
    /// Seconds between input file checks; 0 disables polling.
    pub refresh_interval_secs: u64,
    /// Keep positions of surviving nodes when the input changes.
    pub preserve_layout: bool,
    /// Sphere hit radius as a multiple of the node radius.
    pub pick_scale: f32,
    /// World-space distance within which a click selects an edge.
    pub edge_pick_tolerance: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            label_budget: 250,
            ticks_per_frame: 1,
            refresh_interval_secs: 0,
            preserve_layout: true,
            pick_scale: 1.8,
            edge_pick_tolerance: 0.6,
        }
    }
}

/// Which theme to map with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSelection {
    /// Built-in preset name.
    pub name: String,
    /// Inline theme; takes precedence over `name`.
    pub custom: Option<Theme>,
}

impl Default for ThemeSelection {
    fn default() -> Self {
        Self {
            name: "market".to_string(),
            custom: None,
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::new()
                // Layer 1: User config (lowest priority)
                .merge(Toml::file(Self::user_config_path()))
                // Layer 2: Project config
                .merge(Toml::file(".landscape.toml"))
                // Layer 3: Environment variables (highest priority)
                .merge(Env::prefixed("LANDSCAPE_").split("__")),
        )
    }

    /// Extract from an already-assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(ConfigError::from)
    }

    /// The theme to use, with an optional name overriding the configured one.
    pub fn resolve_theme(&self, name: Option<&str>) -> Result<Theme, AppError> {
        match (name, &self.theme.custom) {
            (Some(name), _) => Theme::preset(name),
            (None, Some(custom)) => Ok(custom.clone()),
            (None, None) => Theme::preset(&self.theme.name),
        }
    }

    /// User config path: ~/.config/landscape/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("landscape").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("landscape").join("config.toml"))
            .unwrap_or_default()
    }
}
