//! Input file polling and scene rebuild.

use bevy::prelude::*;

use crate::models::{LandscapeData, ThemedScene};
use crate::render::RenderFrame;
use crate::simulation::{Simulation, SimulationState};
use crate::theme::{apply_standard_theme, empty_scene};
use crate::visualization::components::SceneItem;
use crate::visualization::events::SceneReloaded;
use crate::visualization::resources::{
    CurrentSelection, DataSource, DragState, FrameRes, RenderSettings, Selection, SimulationRes,
    SphereMesh,
};
use crate::visualization::setup::spawn_scene_items;

/// Re-read the input file when its modification time changes.
///
/// A file that no longer parses yields an empty scene.
#[allow(clippy::too_many_arguments)]
pub fn poll_data_source_system(
    mut commands: Commands,
    time: Res<Time>,
    mut source: ResMut<DataSource>,
    mut sim: ResMut<SimulationRes>,
    mut frame: ResMut<FrameRes>,
    settings: Res<RenderSettings>,
    mut selection: ResMut<CurrentSelection>,
    mut drag_state: ResMut<DragState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mesh: Res<SphereMesh>,
    items: Query<Entity, With<SceneItem>>,
    mut reloaded: EventWriter<SceneReloaded>,
) {
    let Some(timer) = source.poll.as_mut() else {
        return;
    };
    if !timer.tick(time.delta()).just_finished() {
        return;
    }

    let modified = std::fs::metadata(&source.path)
        .and_then(|m| m.modified())
        .ok();
    if modified.is_none() || modified == source.modified {
        return;
    }
    source.modified = modified;

    let scene = match LandscapeData::load(&source.path) {
        Ok(data) => {
            tracing::info!(
                "Reloaded {} entities and {} connections from {}",
                data.entities.len(),
                data.connections.len(),
                source.path.display()
            );
            apply_standard_theme(&source.theme, &data.entities, &data.connections)
        }
        Err(e) => {
            tracing::warn!("Failed to reload {}: {}", source.path.display(), e);
            empty_scene(&source.theme)
        }
    };

    let state = reload_simulation(
        &mut sim.0,
        &mut frame.0,
        &scene,
        source.preserve_layout,
        settings.0.label_budget,
    );
    tracing::debug!("Simulation state after reload: {:?}", state);

    // Indices changed; drop anything that refers to the old node table
    for entity in items.iter() {
        commands.entity(entity).despawn_recursive();
    }
    selection.selection = Selection::None;
    *drag_state = DragState::default();

    spawn_scene_items(&mut commands, &mut materials, &mesh.0, &sim.0);
    reloaded.send(SceneReloaded {
        generation: sim.0.generation(),
    });
}

/// Swap the scene into the simulation and recapture the frame, so picking
/// later this frame indexes the new node table.
fn reload_simulation(
    sim: &mut Simulation,
    frame: &mut RenderFrame,
    scene: &ThemedScene,
    preserve_layout: bool,
    label_budget: usize,
) -> SimulationState {
    let state = if preserve_layout {
        sim.refresh(&scene.nodes, &scene.edges)
    } else {
        sim.start(&scene.nodes, &scene.edges)
    };
    frame.refill(sim, label_budget);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;
    use crate::theme::Theme;

    fn scene(ids: &[&str]) -> ThemedScene {
        let entities: Vec<Entity> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Entity::new(*id, *id).with_market_cap(10f64.powi(i as i32 + 3)))
            .collect();
        apply_standard_theme(&Theme::market(), &entities, &[])
    }

    #[test]
    fn test_reload_recaptures_frame_for_new_nodes() {
        let mut sim = Simulation::default();
        sim.start(&scene(&["a", "b", "c"]).nodes, &[]);
        let mut frame = RenderFrame::capture(&sim, 10);

        for preserve in [true, false] {
            reload_simulation(&mut sim, &mut frame, &scene(&["c", "d"]), preserve, 10);
            assert_eq!(frame.spheres.len(), 2);
            for sphere in &frame.spheres {
                let node = &sim.nodes()[sphere.index];
                assert_eq!(sphere.position, node.position);
            }
            assert_eq!(sim.node_id(frame.spheres[0].index), Some("c"));
        }
    }
}
