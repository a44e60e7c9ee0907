//! Interactive 3D landscape view.
//!
//! Hosts the simulation in a Bevy app: one tick per frame, spheres and
//! labels synced from the captured render frame, edges drawn with gizmos.
//!
//! ## Module Structure
//!
//! - `components` - ECS components for nodes, labels, panels
//! - `resources` - ECS resources for state (simulation, camera, selection, etc.)
//! - `events` - Click and drag events carrying node and edge ids
//! - `systems` - ECS systems (camera, interaction, physics, refresh, UI)
//! - `setup` - Scene initialization
//! - `plugin` - Bevy plugin definition
//! - `constants` - Sizes, timings and colour helpers

mod components;
mod constants;
mod events;
mod plugin;
mod resources;
mod setup;
mod systems;

use std::path::PathBuf;
use std::time::Duration;

pub use events::{EdgeClicked, NodeClicked, NodeDragStarted, SceneReloaded};
pub use plugin::VisualizationPlugin;
pub use resources::DataSource;

use bevy::prelude::*;

use crate::camera::CameraController;
use crate::config::Config;
use crate::models::LandscapeData;
use crate::simulation::Simulation;
use crate::theme::{apply_standard_theme, Theme};
use constants::{color_of, WINDOW_SIZE};

/// Everything the view needs to start.
pub struct VisualizerInput {
    pub config: Config,
    pub theme: Theme,
    pub data: LandscapeData,
    /// File to poll for changes.
    pub source: PathBuf,
}

/// Run the visualizer.
///
/// This spawns a Bevy window with the 3D landscape.
/// The function blocks until the window is closed.
pub fn run_visualizer(input: VisualizerInput) {
    let VisualizerInput {
        config,
        theme,
        data,
        source,
    } = input;

    let scene = apply_standard_theme(&theme, &data.entities, &data.connections);
    let mut simulation = Simulation::new(config.simulation.clone());
    simulation.start(&scene.nodes, &scene.edges);

    let interval = config.render.refresh_interval_secs;
    let data_source = DataSource {
        modified: std::fs::metadata(&source).and_then(|m| m.modified()).ok(),
        poll: (interval > 0)
            .then(|| Timer::new(Duration::from_secs(interval), TimerMode::Repeating)),
        preserve_layout: config.render.preserve_layout,
        path: source,
        theme,
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Landscape".to_string(),
                resolution: WINDOW_SIZE.into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(color_of(scene.background.color)))
        .add_plugins(VisualizationPlugin::new(
            simulation,
            data_source,
            CameraController::new(config.camera.clone()),
            config.render.clone(),
            scene.background,
        ))
        .run();
}
