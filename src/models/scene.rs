//! Renderer-agnostic visual primitives produced by the theme mapper.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::entity::ConnectionKind;

/// Packed `0xRRGGBB` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u32);

impl Rgb {
    /// Neutral grey used whenever a colour cannot be resolved.
    pub const NEUTRAL: Rgb = Rgb(0x8A8F98);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Channels as floats in [0, 1].
    pub fn to_f32_array(self) -> [f32; 3] {
        [
            self.r() as f32 / 255.0,
            self.g() as f32 / 255.0,
            self.b() as f32 / 255.0,
        ]
    }

    /// Linear interpolation between two colours, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
        )
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xFF_FFFF)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(format!("Invalid colour '{}'. Expected #RRGGBB", s));
        }
        u32::from_str_radix(hex, 16)
            .map(Rgb)
            .map_err(|_| format!("Invalid colour '{}'. Expected #RRGGBB", s))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Packed(u32),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Packed(n) => Ok(Rgb(n & 0xFF_FFFF)),
        }
    }
}

/// Source-entity fields carried through the pipeline for the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMeta {
    /// Raw sizing value (0 when the entity has none).
    pub weight: f64,
    /// Key the node colour was selected by.
    pub category: Option<String>,
    pub is_home: bool,
}

/// Source-connection fields carried through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeMeta {
    pub kind: ConnectionKind,
    /// Value the edge style was derived from.
    pub strength: f64,
    pub sentiment: Option<f64>,
}

/// A node ready for simulation and rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub id: String,
    pub name: String,
    /// Seed position inside the unit cube centred on the origin.
    pub position: [f32; 3],
    pub size: f32,
    pub color: Rgb,
    pub glow: f32,
    /// Small idle-motion vector.
    pub drift: [f32; 3],
    pub meta: NodeMeta,
}

/// An edge between two existing visual nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualEdge {
    pub source: String,
    pub target: String,
    pub thickness: f32,
    pub color: Rgb,
    pub dashed: bool,
    pub particles: bool,
    pub pulses_on_active: bool,
    pub meta: EdgeMeta,
}

/// Scene background descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Background {
    pub color: Rgb,
    pub fog_density: f32,
    pub starfield: bool,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: Rgb(0x0B0E14),
            fog_density: 0.0,
            starfield: false,
        }
    }
}

/// Output of one theme mapping pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemedScene {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
    pub background: Background,
}
