//! Node dragging and selection systems.
//!
//! Hit-testing runs on the captured [`RenderFrame`](crate::render::RenderFrame)
//! and positions go back through the simulation's drag API.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use crate::render::{pick_segment, pick_sphere, resolve, Pick, PickTarget, Ray};
use crate::visualization::constants::CLICK_SLOP;
use crate::visualization::events::{EdgeClicked, NodeClicked, NodeDragStarted};
use crate::visualization::resources::{
    CameraRig, CurrentSelection, DragState, FrameRes, RenderSettings, Selection, SimulationRes,
};

/// Drag nodes with left-click. Shift+drag to push in depth. Click to select.
#[allow(clippy::too_many_arguments)]
pub fn drag_node_system(
    mut drag_state: ResMut<DragState>,
    mut sim: ResMut<SimulationRes>,
    mut selection: ResMut<CurrentSelection>,
    mut rig: ResMut<CameraRig>,
    frame: Res<FrameRes>,
    settings: Res<RenderSettings>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window>,
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut node_clicked: EventWriter<NodeClicked>,
    mut drag_started: EventWriter<NodeDragStarted>,
    mut edge_clicked: EventWriter<EdgeClicked>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.get_single() else {
        return;
    };
    let cursor_ray = || {
        let cursor = window.cursor_position()?;
        let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
        Ray::new(ray.origin, *ray.direction)
    };
    let camera_pos = camera_transform.translation();
    let camera_forward = *camera_transform.forward();

    // Start drag on left click
    if mouse_button.just_pressed(MouseButton::Left) {
        drag_state.total_movement = 0.0;
        drag_state.pressed_empty = true;
        if let Some(ray) = cursor_ray() {
            let hit = pick_sphere(&ray, &frame.0.spheres, settings.0.pick_scale);
            if let Some(index) = hit {
                let node_pos = frame.0.spheres[index].position;
                let depth = (node_pos - camera_pos).dot(camera_forward);
                let id = sim.0.node_id(index).map(str::to_string);
                if let Some(id) = id {
                    if let Some(hit_point) = project_to_plane(&ray, camera_pos, camera_forward, depth)
                    {
                        drag_state.grab_offset = node_pos - hit_point;
                    }
                    drag_state.drag_depth = depth;
                    drag_state.pressed_empty = false;
                    sim.0.drag_start(&id);
                    drag_started.send(NodeDragStarted { id: id.clone() });
                    drag_state.node = Some(id);
                }
            }
        }
    }

    let mut total_delta = Vec2::ZERO;
    for ev in mouse_motion.read() {
        total_delta += ev.delta;
    }

    // Continue drag - project cursor to the plane at node depth
    if mouse_button.pressed(MouseButton::Left) {
        drag_state.total_movement += total_delta.length();

        if let Some(id) = drag_state.node.clone() {
            if keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight) {
                // Vertical mouse movement pushes the node toward or away from the camera
                drag_state.drag_depth = (drag_state.drag_depth + total_delta.y * 0.05).max(1.0);
            }
            if drag_state.total_movement >= CLICK_SLOP {
                if let Some(ray) = cursor_ray() {
                    if let Some(point) =
                        project_to_plane(&ray, camera_pos, camera_forward, drag_state.drag_depth)
                    {
                        sim.0.drag_to(&id, point + drag_state.grab_offset);
                    }
                }
            }
        }
    }

    // End drag on release
    if mouse_button.just_released(MouseButton::Left) {
        let is_click = drag_state.total_movement < CLICK_SLOP;
        if let Some(id) = drag_state.node.take() {
            sim.0.drag_end(&id);
            if is_click {
                if let Some(index) = sim.0.node_index(&id) {
                    selection.selection = Selection::Node(index);
                }
                rig.controller.focus(Some(id.clone()));
                node_clicked.send(NodeClicked { id });
            }
        } else if is_click && drag_state.pressed_empty {
            let edge = cursor_ray()
                .and_then(|ray| pick_segment(&ray, &frame.0.segments, settings.0.edge_pick_tolerance));
            match edge.and_then(|index| resolve(&sim.0, Pick::Edge(index)).map(|t| (index, t))) {
                Some((index, PickTarget::Edge { source, target })) => {
                    selection.selection = Selection::Edge(index);
                    edge_clicked.send(EdgeClicked { source, target });
                }
                _ => {
                    // Clicked on empty space - clear selection and focus
                    selection.selection = Selection::None;
                    rig.controller.focus(None);
                }
            }
        }
        drag_state.pressed_empty = false;
    }
}

/// Intersect a ray with the plane `depth` units along the camera's forward axis.
fn project_to_plane(ray: &Ray, camera_pos: Vec3, forward: Vec3, depth: f32) -> Option<Vec3> {
    let plane_point = camera_pos + forward * depth;
    let denom = ray.direction.dot(forward);
    if denom.abs() <= 0.0001 {
        return None;
    }
    let t = (plane_point - ray.origin).dot(forward) / denom;
    (t > 0.0).then(|| ray.at(t))
}
