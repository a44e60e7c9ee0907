//! UI systems for labels, info panel, status line, edges and glow effects.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use bevy::ui::Node as UiNode;

use crate::render::{label_anchor, LineSegment};
use crate::simulation::Simulation;
use crate::visualization::components::{InfoPanelText, NodeLabel, NodeSphere, StatusText};
use crate::visualization::constants::{
    color_of, emissive_of, DASH_COUNT, EDGE_ALPHA_RANGE, GLOW_EMISSIVE, PARTICLES_PER_EDGE,
    PARTICLE_LENGTH, PARTICLE_SPEED, PULSE_HZ, SELECTED_EMISSIVE,
};
use crate::visualization::resources::{CurrentSelection, FrameRes, Selection, SimulationRes};

/// Node indices highlighted by the current selection.
fn highlighted_nodes(sim: &Simulation, selection: &Selection) -> HashSet<usize> {
    match selection {
        Selection::Node(idx) => {
            // Selected node and all connected nodes
            let mut nodes: HashSet<usize> = sim
                .links()
                .iter()
                .filter_map(|l| {
                    if l.source == *idx {
                        Some(l.target)
                    } else if l.target == *idx {
                        Some(l.source)
                    } else {
                        None
                    }
                })
                .collect();
            nodes.insert(*idx);
            nodes
        }
        Selection::Edge(link_idx) => sim
            .link(*link_idx)
            .map(|l| [l.source, l.target].into_iter().collect())
            .unwrap_or_default(),
        Selection::None => HashSet::new(),
    }
}

/// Position labels of the top-K nodes (and the selection) in screen space.
pub fn update_labels_system(
    sim: Res<SimulationRes>,
    frame: Res<FrameRes>,
    selection: Res<CurrentSelection>,
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut label_query: Query<(&mut UiNode, &mut Visibility, &NodeLabel)>,
) {
    let Ok((camera, camera_transform)) = camera_query.get_single() else {
        return;
    };

    let budgeted: HashMap<usize, Vec3> =
        frame.0.labels.iter().map(|l| (l.index, l.anchor)).collect();
    let highlighted = highlighted_nodes(&sim.0, &selection.selection);
    let camera_forward = camera_transform.forward();

    for (mut node_ui, mut visibility, label) in label_query.iter_mut() {
        // Highlighted nodes outside the label budget still get a label.
        let anchor = budgeted.get(&label.index).copied().or_else(|| {
            highlighted
                .contains(&label.index)
                .then(|| frame.0.spheres.get(label.index))
                .flatten()
                .map(|s| label_anchor(s.position, s.radius))
        });
        let Some(world_pos) = anchor else {
            *visibility = Visibility::Hidden;
            continue;
        };

        let in_front = (world_pos - camera_transform.translation()).dot(*camera_forward) > 0.0;
        match camera.world_to_viewport(camera_transform, world_pos) {
            Ok(viewport_pos) if in_front => {
                *visibility = Visibility::Visible;
                node_ui.left = Val::Px(viewport_pos.x - 40.0); // Center text roughly
                node_ui.top = Val::Px(viewport_pos.y - 10.0);
            }
            _ => *visibility = Visibility::Hidden,
        }
    }
}

/// Update info panel when a node or edge is selected.
pub fn update_info_panel_system(
    selection: Res<CurrentSelection>,
    sim: Res<SimulationRes>,
    mut text_query: Query<&mut Text, With<InfoPanelText>>,
) {
    if !selection.is_changed() {
        return;
    }
    let Ok(mut text) = text_query.get_single_mut() else {
        return;
    };
    let sim = &sim.0;
    let name_of = |idx: usize| sim.nodes().get(idx).map(|n| n.name.as_str()).unwrap_or("?");

    **text = match &selection.selection {
        Selection::Node(idx) => match sim.nodes().get(*idx) {
            Some(node) => {
                let connections: Vec<String> = sim
                    .links()
                    .iter()
                    .filter_map(|l| {
                        let other = if l.source == *idx {
                            l.target
                        } else if l.target == *idx {
                            l.source
                        } else {
                            return None;
                        };
                        Some(format!("{} ({})", name_of(other), l.meta.kind))
                    })
                    .collect();
                format!(
                    "\nName: {}\nID: {}\nCategory: {}\nWeight: {:.3e}{}\nConnections: {}\n\n{}",
                    node.name,
                    node.id,
                    node.category.as_deref().unwrap_or("-"),
                    node.weight,
                    if node.is_home { "\nHome company" } else { "" },
                    connections.len(),
                    connections.join("\n")
                )
            }
            None => String::new(),
        },
        Selection::Edge(link_idx) => match sim.link(*link_idx) {
            Some(link) => format!(
                "\nRelationship\n\nType: {}\nFrom: {}\nTo: {}\nStrength: {:.2}\nSentiment: {}",
                link.meta.kind,
                name_of(link.source),
                name_of(link.target),
                link.meta.strength,
                link.meta
                    .sentiment
                    .map(|s| format!("{s:+.2}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            None => String::new(),
        },
        Selection::None => "Click a company or relationship to see details".to_string(),
    };
}

/// Show simulation state, alpha and node counts.
pub fn update_status_system(
    sim: Res<SimulationRes>,
    mut text_query: Query<&mut Text, With<StatusText>>,
) {
    let Ok(mut text) = text_query.get_single_mut() else {
        return;
    };
    let sim = &sim.0;
    **text = format!(
        "{:?}  alpha {:.3}  {} nodes  {} links  gen {}",
        sim.state(),
        sim.alpha(),
        sim.nodes().len(),
        sim.links().len(),
        sim.generation()
    );
}

/// Brighten the selection and its neighbours; restore theme glow elsewhere.
pub fn update_selection_glow_system(
    selection: Res<CurrentSelection>,
    sim: Res<SimulationRes>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    node_query: Query<(&NodeSphere, &MeshMaterial3d<StandardMaterial>)>,
    added: Query<(), Added<NodeSphere>>,
) {
    if !selection.is_changed() && added.is_empty() {
        return;
    }
    let highlighted = highlighted_nodes(&sim.0, &selection.selection);
    for (sphere, handle) in node_query.iter() {
        let Some(node) = sim.0.nodes().get(sphere.index) else {
            continue;
        };
        let Some(material) = materials.get_mut(&handle.0) else {
            continue;
        };
        let strength = if highlighted.contains(&sphere.index) {
            SELECTED_EMISSIVE
        } else {
            node.glow * GLOW_EMISSIVE
        };
        material.emissive = emissive_of(node.color, strength);
    }
}

/// Draw edges as gizmo lines: dashes, particles and pulses per edge flags.
pub fn draw_edges_system(
    frame: Res<FrameRes>,
    sim: Res<SimulationRes>,
    selection: Res<CurrentSelection>,
    time: Res<Time>,
    mut gizmos: Gizmos,
) {
    let elapsed = time.elapsed_secs();
    let active = highlighted_nodes(&sim.0, &selection.selection);
    let selected_link = match selection.selection {
        Selection::Edge(idx) => Some(idx),
        _ => None,
    };

    for segment in &frame.0.segments {
        let Some(link) = sim.0.link(segment.index) else {
            continue;
        };
        let touches_active = active.contains(&link.source) && active.contains(&link.target);
        let (lo, hi) = EDGE_ALPHA_RANGE;
        let mut alpha = lo + (hi - lo) * segment.thickness.clamp(0.0, 1.0);
        if segment.pulses_on_active && touches_active {
            alpha *= 0.6 + 0.4 * (elapsed * PULSE_HZ * std::f32::consts::TAU).sin().abs();
        }
        if selected_link == Some(segment.index) {
            alpha = 1.0;
        }
        let color = color_of(segment.color).with_alpha(alpha);

        if segment.dashed {
            draw_dashed(&mut gizmos, segment, color);
        } else {
            gizmos.line(segment.start, segment.end, color);
        }

        if segment.particles {
            let bright = color_of(segment.color).with_alpha(1.0);
            for k in 0..PARTICLES_PER_EDGE {
                let t = (elapsed * PARTICLE_SPEED + k as f32 / PARTICLES_PER_EDGE as f32).fract();
                let end = (t + PARTICLE_LENGTH).min(1.0);
                gizmos.line(
                    segment.start.lerp(segment.end, t),
                    segment.start.lerp(segment.end, end),
                    bright,
                );
            }
        }
    }
}

fn draw_dashed(gizmos: &mut Gizmos, segment: &LineSegment, color: Color) {
    let step = 1.0 / DASH_COUNT as f32;
    for i in 0..DASH_COUNT {
        let from = i as f32 * step;
        let to = from + step * 0.5;
        gizmos.line(
            segment.start.lerp(segment.end, from),
            segment.start.lerp(segment.end, to),
            color,
        );
    }
}
