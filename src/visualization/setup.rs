//! Scene setup: camera, lighting, background and per-node entities.

use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bevy::ui::PositionType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::Rgb;
use crate::simulation::Simulation;
use crate::visualization::components::{
    InfoPanel, InfoPanelText, Legend, NodeLabel, NodeSphere, SceneItem, StatusText,
};
use crate::visualization::constants::{
    color_of, emissive_of, GLOW_EMISSIVE, STAR_COUNT, STAR_SHELL_RADIUS,
};
use crate::visualization::resources::{CameraRig, SceneBackground, SimulationRes, SphereMesh};

/// Setup the scene with camera, lighting, UI panels and the initial nodes.
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim: Res<SimulationRes>,
    mut rig: ResMut<CameraRig>,
    background: Res<SceneBackground>,
) {
    // Camera, snapped to the initial framing
    let framing = rig.controller.update(&sim.0);
    let mut camera = commands.spawn((
        Camera3d::default(),
        Transform::from_translation(framing.position).looking_at(framing.target, Vec3::Y),
    ));
    if background.0.fog_density > 0.0 {
        camera.insert(DistanceFog {
            color: color_of(background.0.color),
            falloff: FogFalloff::Exponential {
                density: background.0.fog_density,
            },
            ..default()
        });
    }

    // Main directional light
    commands.spawn((
        DirectionalLight {
            illuminance: 12000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(40.0, 80.0, 40.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Fill light from the opposite side
    commands.spawn((
        DirectionalLight {
            illuminance: 4000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-30.0, 20.0, -30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });

    let sphere = meshes.add(Sphere::new(1.0).mesh().uv(32, 18));
    if background.0.starfield {
        spawn_starfield(&mut commands, &mut materials, sphere.clone());
    }

    spawn_scene_items(&mut commands, &mut materials, &sphere, &sim.0);
    commands.insert_resource(SphereMesh(sphere));

    spawn_panels(&mut commands);
}

/// Spawn spheres, labels and the legend for the simulation's current nodes.
pub fn spawn_scene_items(
    commands: &mut Commands,
    materials: &mut Assets<StandardMaterial>,
    mesh: &Handle<Mesh>,
    sim: &Simulation,
) {
    let text_style = TextFont {
        font_size: 11.0,
        ..default()
    };
    let text_color = TextColor(Color::srgba(0.9, 0.9, 0.9, 0.8));

    for (index, node) in sim.nodes().iter().enumerate() {
        let material = materials.add(StandardMaterial {
            base_color: color_of(node.color),
            metallic: 0.3,
            perceptual_roughness: 0.5,
            reflectance: 0.3,
            emissive: emissive_of(node.color, node.glow * GLOW_EMISSIVE),
            ..default()
        });

        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material),
            Transform::from_translation(node.position).with_scale(Vec3::splat(node.radius)),
            NodeSphere { index },
            SceneItem,
        ));

        // Label as UI text, positioned in screen space each frame
        commands.spawn((
            Text::new(node.name.clone()),
            text_style.clone(),
            text_color,
            bevy::ui::Node {
                position_type: PositionType::Absolute,
                ..default()
            },
            Visibility::Hidden,
            NodeLabel { index },
            SceneItem,
        ));
    }

    spawn_legend(commands, legend_entries(sim));
}

/// Distinct (category, colour) pairs, sorted by category.
fn legend_entries(sim: &Simulation) -> Vec<(String, Rgb)> {
    let mut entries: Vec<(String, Rgb)> = sim
        .nodes()
        .iter()
        .filter(|n| !n.is_home)
        .filter_map(|n| n.category.clone().map(|c| (c, n.color)))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.dedup_by(|a, b| a.0 == b.0);
    entries
}

fn spawn_legend(commands: &mut Commands, entries: Vec<(String, Rgb)>) {
    if entries.is_empty() {
        return;
    }
    commands
        .spawn((
            bevy::ui::Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::all(Val::Px(10.0)),
                flex_direction: FlexDirection::Row,
                flex_wrap: FlexWrap::Wrap,
                column_gap: Val::Px(18.0),
                max_width: Val::Percent(90.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.1, 0.1, 0.15, 0.85)),
            BorderRadius::all(Val::Px(6.0)),
            Legend,
            SceneItem,
        ))
        .with_children(|parent| {
            for (category, color) in entries {
                parent
                    .spawn(bevy::ui::Node {
                        flex_direction: FlexDirection::Row,
                        align_items: AlignItems::Center,
                        column_gap: Val::Px(6.0),
                        ..default()
                    })
                    .with_children(|item| {
                        // Color swatch
                        item.spawn((
                            bevy::ui::Node {
                                width: Val::Px(12.0),
                                height: Val::Px(12.0),
                                border: UiRect::all(Val::Px(1.0)),
                                ..default()
                            },
                            BackgroundColor(color_of(color)),
                            BorderColor(Color::srgba(1.0, 1.0, 1.0, 0.3)),
                            BorderRadius::all(Val::Px(6.0)),
                        ));
                        item.spawn((
                            Text::new(category),
                            TextFont {
                                font_size: 12.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.8, 0.8, 0.8)),
                        ));
                    });
            }
        });
}

fn spawn_panels(commands: &mut Commands) {
    // Info panel on the left
    commands
        .spawn((
            bevy::ui::Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                width: Val::Px(280.0),
                min_height: Val::Px(100.0),
                padding: UiRect::all(Val::Px(12.0)),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::srgba(0.1, 0.1, 0.15, 0.9)),
            BorderRadius::all(Val::Px(8.0)),
            InfoPanel,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Details"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
            ));
            parent.spawn((
                Text::new("Click a company or relationship to see details"),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.7, 0.7)),
                InfoPanelText,
            ));
        });

    // Status line, top right
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 12.0,
            ..default()
        },
        TextColor(Color::srgb(0.6, 0.6, 0.6)),
        bevy::ui::Node {
            position_type: PositionType::Absolute,
            right: Val::Px(12.0),
            top: Val::Px(10.0),
            ..default()
        },
        StatusText,
    ));
}

fn spawn_starfield(
    commands: &mut Commands,
    materials: &mut Assets<StandardMaterial>,
    mesh: Handle<Mesh>,
) {
    let star = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        emissive: LinearRgba::new(2.0, 2.0, 2.2, 1.0),
        unlit: true,
        ..default()
    });
    let mut rng = StdRng::seed_from_u64(0x5747);
    for _ in 0..STAR_COUNT {
        let dir = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .try_normalize()
        .unwrap_or(Vec3::Y);
        let size = rng.gen_range(0.4..1.4);
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(star.clone()),
            Transform::from_translation(dir * STAR_SHELL_RADIUS).with_scale(Vec3::splat(size)),
        ));
    }
}
