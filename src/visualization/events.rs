//! Interaction events carrying node and edge ids.

use bevy::prelude::*;

/// A node was clicked without dragging.
#[derive(Event, Debug, Clone)]
pub struct NodeClicked {
    pub id: String,
}

/// The pointer went down on a node.
#[derive(Event, Debug, Clone)]
pub struct NodeDragStarted {
    pub id: String,
}

/// An edge was clicked.
#[derive(Event, Debug, Clone)]
pub struct EdgeClicked {
    pub source: String,
    pub target: String,
}

/// The input file was reloaded.
#[derive(Event, Debug, Clone, Copy)]
pub struct SceneReloaded {
    pub generation: u64,
}

/// Log interaction events.
pub fn log_events_system(
    mut clicks: EventReader<NodeClicked>,
    mut drags: EventReader<NodeDragStarted>,
    mut edges: EventReader<EdgeClicked>,
) {
    for ev in clicks.read() {
        tracing::info!("Node clicked: {}", ev.id);
    }
    for ev in drags.read() {
        tracing::debug!("Node drag started: {}", ev.id);
    }
    for ev in edges.read() {
        tracing::info!("Edge clicked: {} -> {}", ev.source, ev.target);
    }
}
