//! ECS components for the landscape view.
//!
//! Components are data attached to entities. Each entity can have
//! any combination of components.

use bevy::prelude::*;

/// Sphere mesh for one simulation node.
#[derive(Component)]
pub struct NodeSphere {
    /// Index in the simulation's node table.
    pub index: usize,
}

/// Label component that follows a node in screen space.
#[derive(Component)]
pub struct NodeLabel {
    /// Index of the node this label follows.
    pub index: usize,
}

/// Everything spawned for the current node set; despawned on refresh.
#[derive(Component)]
pub struct SceneItem;

/// Marker component for the info panel container.
#[derive(Component)]
pub struct InfoPanel;

/// Marker component for the info panel text content.
#[derive(Component)]
pub struct InfoPanelText;

/// Simulation status line.
#[derive(Component)]
pub struct StatusText;

/// Legend container, rebuilt when the node set changes.
#[derive(Component)]
pub struct Legend;
