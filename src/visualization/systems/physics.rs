//! Simulation tick and transform sync.

use bevy::prelude::*;

use crate::visualization::components::NodeSphere;
use crate::visualization::constants::{DRIFT_AMPLITUDE, DRIFT_SPEED};
use crate::visualization::resources::{FrameRes, RenderSettings, SimulationRes};

/// Advance the simulation and capture this frame's render data.
pub fn tick_simulation_system(
    mut sim: ResMut<SimulationRes>,
    mut frame: ResMut<FrameRes>,
    settings: Res<RenderSettings>,
) {
    for _ in 0..settings.0.ticks_per_frame.max(1) {
        if !sim.0.state().is_running() {
            break;
        }
        sim.0.tick();
    }
    frame.0.refill(&sim.0, settings.0.label_budget);
}

/// Move node spheres to their simulated positions, plus idle drift.
pub fn sync_nodes_system(
    sim: Res<SimulationRes>,
    frame: Res<FrameRes>,
    time: Res<Time>,
    mut node_query: Query<(&mut Transform, &NodeSphere)>,
) {
    let phase = (time.elapsed_secs() * DRIFT_SPEED).sin();
    let nodes = sim.0.nodes();
    for (mut transform, sphere) in node_query.iter_mut() {
        let Some(instance) = frame.0.spheres.get(sphere.index) else {
            continue;
        };
        let drift = nodes
            .get(sphere.index)
            .filter(|n| !n.is_pinned())
            .map(|n| n.drift * DRIFT_AMPLITUDE * phase)
            .unwrap_or(Vec3::ZERO);
        transform.translation = instance.position + drift;
        transform.scale = Vec3::splat(instance.radius);
    }
}
