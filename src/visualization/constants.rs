//! Visual constants for the landscape view.

use bevy::prelude::*;

use crate::models::Rgb;

// =============================================================================
// Scene
// =============================================================================

/// Window size at startup.
pub const WINDOW_SIZE: (f32, f32) = (1440.0, 900.0);
/// Number of background stars when the theme asks for a starfield.
pub const STAR_COUNT: usize = 600;
/// Radius of the shell the stars sit on.
pub const STAR_SHELL_RADIUS: f32 = 600.0;

// =============================================================================
// Nodes
// =============================================================================

/// Emissive multiplier for a node's theme glow.
pub const GLOW_EMISSIVE: f32 = 1.2;
/// Emissive multiplier for selected nodes and their neighbours.
pub const SELECTED_EMISSIVE: f32 = 2.5;
/// World-space amplitude of idle drift.
pub const DRIFT_AMPLITUDE: f32 = 8.0;
/// Angular speed of idle drift (radians per second).
pub const DRIFT_SPEED: f32 = 0.4;

// =============================================================================
// Edges
// =============================================================================

/// Number of dash/gap pairs per dashed edge.
pub const DASH_COUNT: usize = 12;
/// Number of particles travelling along an edge that carries them.
pub const PARTICLES_PER_EDGE: usize = 3;
/// Particle length as a fraction of the edge.
pub const PARTICLE_LENGTH: f32 = 0.04;
/// Full edge traversals per second.
pub const PARTICLE_SPEED: f32 = 0.25;
/// Pulse frequency of active edges (Hz).
pub const PULSE_HZ: f32 = 1.5;
/// Edge opacity at zero and full thickness.
pub const EDGE_ALPHA_RANGE: (f32, f32) = (0.25, 0.95);

// =============================================================================
// Interaction
// =============================================================================

/// Cursor travel in pixels below which a press-release counts as a click.
pub const CLICK_SLOP: f32 = 5.0;

// =============================================================================
// Helpers
// =============================================================================

/// Convert a packed theme colour to a Bevy colour.
pub fn color_of(rgb: Rgb) -> Color {
    Color::srgb_u8(rgb.r(), rgb.g(), rgb.b())
}

/// Emissive colour for a theme colour scaled by `strength`.
pub fn emissive_of(rgb: Rgb, strength: f32) -> LinearRgba {
    let linear = color_of(rgb).to_linear();
    LinearRgba::new(
        linear.red * strength,
        linear.green * strength,
        linear.blue * strength,
        1.0,
    )
}
