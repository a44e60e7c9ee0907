//! ECS resources for landscape view state.
//!
//! Resources are global singleton data - there's only one instance
//! of each resource in the entire app.

use std::path::PathBuf;
use std::time::SystemTime;

use bevy::prelude::*;

use crate::camera::CameraController;
use crate::config::RenderConfig;
use crate::models::Background;
use crate::render::RenderFrame;
use crate::simulation::Simulation;
use crate::theme::Theme;

// =============================================================================
// Camera State
// =============================================================================

/// Camera orbit state for manual 3D navigation.
#[derive(Debug, Clone, Copy)]
pub struct CameraOrbit {
    /// Horizontal rotation angle (radians).
    pub yaw: f32,
    /// Vertical rotation angle (radians).
    pub pitch: f32,
    /// Distance from target.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
}

impl Default for CameraOrbit {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance: 25.0,
            target: Vec3::ZERO,
        }
    }
}

impl CameraOrbit {
    /// Orbit reproducing a camera at `position` looking at `target`.
    pub fn from_look(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return Self {
                target,
                ..Self::default()
            };
        }
        let dir = offset / distance;
        Self {
            yaw: dir.x.atan2(dir.z),
            pitch: dir.y.clamp(-1.0, 1.0).asin(),
            distance,
            target,
        }
    }
}

/// Camera control: automatic framing until the user takes over.
#[derive(Resource)]
pub struct CameraRig {
    pub controller: CameraController,
    pub orbit: CameraOrbit,
    /// Follow the controller's framing. Manual input clears it; `R` restores it.
    pub auto_frame: bool,
}

// =============================================================================
// Simulation State
// =============================================================================

/// The live simulation, ticked once per frame.
#[derive(Resource)]
pub struct SimulationRes(pub Simulation);

/// Render data captured from the simulation after this frame's ticks.
#[derive(Resource, Default)]
pub struct FrameRes(pub RenderFrame);

/// Frame loop and picking settings.
#[derive(Resource, Clone)]
pub struct RenderSettings(pub RenderConfig);

/// Background of the current theme.
#[derive(Resource, Clone, Copy)]
pub struct SceneBackground(pub Background);

/// Shared sphere mesh; node spheres scale it by radius.
#[derive(Resource)]
pub struct SphereMesh(pub Handle<Mesh>);

// =============================================================================
// Interaction State
// =============================================================================

/// State for node dragging operations.
#[derive(Resource, Default)]
pub struct DragState {
    /// Node id currently held.
    pub node: Option<String>,
    /// Whether the cursor went down on empty space.
    pub pressed_empty: bool,
    /// Plane distance from camera along its forward axis.
    pub drag_depth: f32,
    /// Total mouse movement during drag (to detect click vs drag).
    pub total_movement: f32,
    /// Offset from cursor to node center (prevents jumping).
    pub grab_offset: Vec3,
}

/// What is currently selected.
#[derive(Clone, Default, Debug, PartialEq)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    None,
    /// A node, by simulation index.
    Node(usize),
    /// An edge, by simulation link index.
    Edge(usize),
}

/// Currently selected element (node or edge).
#[derive(Resource, Default)]
pub struct CurrentSelection {
    pub selection: Selection,
}

// =============================================================================
// Data Source
// =============================================================================

/// The input file and how to re-map it when it changes.
#[derive(Resource)]
pub struct DataSource {
    pub path: PathBuf,
    pub theme: Theme,
    /// Modification time of the last load.
    pub modified: Option<SystemTime>,
    /// `None` when polling is disabled.
    pub poll: Option<Timer>,
    pub preserve_layout: bool,
}
