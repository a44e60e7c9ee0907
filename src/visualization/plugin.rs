//! Visualization plugin for Bevy.

use std::sync::Mutex;

use bevy::prelude::*;

use super::events::{log_events_system, EdgeClicked, NodeClicked, NodeDragStarted, SceneReloaded};
use super::resources::{
    CameraOrbit, CameraRig, CurrentSelection, DataSource, DragState, FrameRes, RenderSettings,
    SceneBackground, SimulationRes,
};
use super::setup::setup_scene;
use super::systems;
use crate::camera::CameraController;
use crate::config::RenderConfig;
use crate::models::Background;
use crate::simulation::Simulation;

/// Plugin that adds the interactive landscape view.
///
/// The simulation and data source sit in `Mutex<Option<...>>` so `build()`
/// (which takes `&self`) can move them into resources.
pub struct VisualizationPlugin {
    simulation: Mutex<Option<Simulation>>,
    source: Mutex<Option<DataSource>>,
    camera: CameraController,
    render: RenderConfig,
    background: Background,
}

impl VisualizationPlugin {
    /// Create a new visualization plugin around a started simulation.
    pub fn new(
        simulation: Simulation,
        source: DataSource,
        camera: CameraController,
        render: RenderConfig,
        background: Background,
    ) -> Self {
        Self {
            simulation: Mutex::new(Some(simulation)),
            source: Mutex::new(Some(source)),
            camera,
            render,
            background,
        }
    }
}

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        // Take ownership of the simulation and source (moves them out, leaves None)
        let simulation = self
            .simulation
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .unwrap_or_default();
        if let Some(source) = self.source.lock().ok().and_then(|mut s| s.take()) {
            app.insert_resource(source);
        }

        app.insert_resource(SimulationRes(simulation))
            .insert_resource(FrameRes::default())
            .insert_resource(RenderSettings(self.render.clone()))
            .insert_resource(SceneBackground(self.background))
            .insert_resource(CameraRig {
                controller: self.camera.clone(),
                orbit: CameraOrbit::default(),
                auto_frame: true,
            })
            .insert_resource(DragState::default())
            .insert_resource(CurrentSelection::default())
            .add_event::<NodeClicked>()
            .add_event::<NodeDragStarted>()
            .add_event::<EdgeClicked>()
            .add_event::<SceneReloaded>()
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (
                    systems::poll_data_source_system.run_if(resource_exists::<DataSource>),
                    systems::drag_node_system,
                    systems::tick_simulation_system,
                    systems::sync_nodes_system,
                    systems::camera_system,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    systems::update_labels_system,
                    systems::update_info_panel_system,
                    systems::update_status_system,
                    systems::update_selection_glow_system,
                    systems::draw_edges_system,
                    log_events_system,
                )
                    .after(systems::camera_system),
            );
    }
}
