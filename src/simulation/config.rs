//! Tunable physics parameters.

use serde::{Deserialize, Serialize};

/// Physics parameters for the force simulation.
///
/// Distances are in world units. Seed positions span roughly
/// `[-seed_spread, seed_spread]` per axis and node radii `radius_min..radius_max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Alpha below which the simulation is settled.
    pub alpha_min: f32,
    /// Fraction of the remaining distance to `alpha_target` covered per tick.
    pub alpha_decay: f32,
    /// Alpha a reheat raises the simulation to.
    pub alpha_restart: f32,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,

    /// Rest length of a link with zero thickness.
    pub link_distance: f32,
    pub link_strength: f32,

    /// Many-body strength; negative repels.
    pub charge_strength: f32,
    /// Distance floor for inverse-distance terms.
    pub charge_distance_min: f32,
    /// Pairs further apart than this do not interact.
    pub charge_distance_max: f32,

    pub center_strength: f32,
    pub collide_strength: f32,
    /// Pull of the z coordinate toward 0.
    pub z_strength: f32,
    /// Extra pull toward the origin, scaled by normalized node weight.
    pub weight_pull: f32,
    /// Hard bound on distance from the origin.
    pub max_radius: f32,

    pub radius_min: f32,
    pub radius_max: f32,

    pub seed_spread: f32,
    pub seed_jitter: f32,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_min: 0.001,
            // Settles in ~300 ticks from alpha = 1.
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            alpha_restart: 0.3,
            velocity_decay: 0.4,
            link_distance: 12.0,
            link_strength: 1.0,
            charge_strength: -30.0,
            charge_distance_min: 1.0,
            charge_distance_max: 80.0,
            center_strength: 0.02,
            collide_strength: 0.7,
            z_strength: 0.05,
            weight_pull: 0.06,
            max_radius: 120.0,
            radius_min: 0.8,
            radius_max: 2.0,
            seed_spread: 40.0,
            seed_jitter: 4.0,
            seed: 7,
        }
    }
}
