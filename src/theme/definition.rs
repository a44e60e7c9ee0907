//! Theme definitions and built-in presets.
//!
//! A theme is plain data selecting which entity and connection attributes
//! drive colour, size, glow and edge style. Themes deserialize from config so
//! several can coexist and the caller picks one before mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Background, Rgb};

/// Entity attribute selecting the node colour key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBy {
    #[default]
    Industry,
    Segment,
    /// Two keys only: `home` and `other`.
    Home,
}

/// What makes a node glow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlowBy {
    #[default]
    Home,
    Weight,
    None,
}

/// Connection attribute driving edge thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeValue {
    #[default]
    Strength,
    Sentiment,
}

/// How edge colours are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeColorBy {
    #[default]
    Kind,
    Sentiment,
    Fixed,
}

/// A theme definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,
    pub color_by: ColorBy,
    pub glow_by: GlowBy,
    pub edge_value: EdgeValue,
    pub edge_color_by: EdgeColorBy,
    /// Size given to the smallest entity; the largest always gets 1.
    pub min_size: f32,
    pub glow_scale: f32,
    /// Colour forced onto the home entity, if any.
    pub home_color: Option<Rgb>,
    /// Explicit node colours by compound key.
    pub palette: BTreeMap<String, Rgb>,
    /// Edge colours by connection kind.
    pub kind_colors: BTreeMap<String, Rgb>,
    /// Edge colour for `EdgeColorBy::Fixed` and unknown kinds.
    pub edge_color: Rgb,
    pub dashed_kinds: Vec<String>,
    pub pulse_kinds: Vec<String>,
    /// Edges at or above this thickness carry particles.
    pub particle_threshold: f32,
    /// Strength assumed for connections that do not carry one.
    pub default_strength: f32,
    pub background: Background,
}

impl Default for Theme {
    fn default() -> Self {
        Self::market()
    }
}

/// Names accepted by [`Theme::preset`].
pub const PRESET_NAMES: &[&str] = &["market", "segment", "sentiment"];

impl Theme {
    /// Look up a built-in theme by name.
    pub fn preset(name: &str) -> Result<Self, AppError> {
        match name {
            "market" => Ok(Self::market()),
            "segment" => Ok(Self::segment()),
            "sentiment" => Ok(Self::sentiment()),
            _ => Err(AppError::UnknownTheme(name.to_string())),
        }
    }

    /// One-line description of a built-in theme.
    pub fn preset_description(name: &str) -> Option<&'static str> {
        match name {
            "market" => Some("Colour by industry, size by market cap, home entity glows"),
            "segment" => Some("Colour by market segment, glow by market weight"),
            "sentiment" => Some("Edges coloured and weighted by relationship sentiment"),
            _ => None,
        }
    }

    /// Colour by industry, size by market cap, glow on the home entity.
    pub fn market() -> Self {
        Self {
            name: "market".to_string(),
            color_by: ColorBy::Industry,
            glow_by: GlowBy::Home,
            edge_value: EdgeValue::Strength,
            edge_color_by: EdgeColorBy::Kind,
            min_size: 0.15,
            glow_scale: 1.0,
            home_color: Some(Rgb(0xFFD700)),
            palette: BTreeMap::new(),
            kind_colors: default_kind_colors(),
            edge_color: Rgb(0x808080),
            dashed_kinds: vec!["adjacency".to_string()],
            pulse_kinds: vec!["competitor".to_string()],
            particle_threshold: 0.75,
            default_strength: 0.5,
            background: Background {
                color: Rgb(0x0B0E14),
                fog_density: 0.004,
                starfield: true,
            },
        }
    }

    /// Colour by market segment, glow by weight.
    pub fn segment() -> Self {
        Self {
            name: "segment".to_string(),
            color_by: ColorBy::Segment,
            glow_by: GlowBy::Weight,
            glow_scale: 0.6,
            home_color: None,
            background: Background {
                color: Rgb(0x111318),
                fog_density: 0.0,
                starfield: false,
            },
            ..Self::market()
        }
    }

    /// Edges by sentiment: red for negative, green for positive.
    pub fn sentiment() -> Self {
        Self {
            name: "sentiment".to_string(),
            edge_value: EdgeValue::Sentiment,
            edge_color_by: EdgeColorBy::Sentiment,
            dashed_kinds: Vec::new(),
            particle_threshold: 0.9,
            ..Self::market()
        }
    }
}

fn default_kind_colors() -> BTreeMap<String, Rgb> {
    [
        ("competitor", Rgb(0xFF8050)),
        ("adjacency", Rgb(0x4DB3E6)),
        ("partner", Rgb(0x80CC66)),
        ("supplier", Rgb(0xE6B333)),
    ]
    .into_iter()
    .map(|(k, c)| (k.to_string(), c))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_resolve() {
        for name in PRESET_NAMES {
            let theme = Theme::preset(name).unwrap();
            assert_eq!(theme.name, *name);
            assert!(Theme::preset_description(name).is_some());
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            Theme::preset("neon"),
            Err(AppError::UnknownTheme(ref n)) if n == "neon"
        ));
    }

    #[test]
    fn test_partial_theme_deserializes_over_defaults() {
        let theme: Theme = serde_json::from_str(
            r##"{"name": "custom", "color_by": "segment", "edge_color": "#ffffff"}"##,
        )
        .unwrap();
        assert_eq!(theme.color_by, ColorBy::Segment);
        assert_eq!(theme.edge_color, Rgb(0xFFFFFF));
        assert_eq!(theme.min_size, Theme::market().min_size);
    }
}
