//! ECS systems for the landscape view.
//!
//! Systems are functions that operate on components and resources each frame.

pub mod camera;
pub mod interaction;
pub mod physics;
pub mod refresh;
pub mod ui;

pub use camera::camera_system;
pub use interaction::drag_node_system;
pub use physics::{sync_nodes_system, tick_simulation_system};
pub use refresh::poll_data_source_system;
pub use ui::{
    draw_edges_system, update_info_panel_system, update_labels_system,
    update_selection_glow_system, update_status_system,
};
