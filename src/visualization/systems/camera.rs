//! Camera framing, orbit, pan, and zoom.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

use crate::visualization::resources::{CameraOrbit, CameraRig, SimulationRes};

/// Calculate camera position from orbit parameters.
pub fn calculate_camera_position(orbit: &CameraOrbit) -> Vec3 {
    let x = orbit.distance * orbit.pitch.cos() * orbit.yaw.sin();
    let y = orbit.distance * orbit.pitch.sin();
    let z = orbit.distance * orbit.pitch.cos() * orbit.yaw.cos();
    orbit.target + Vec3::new(x, y, z)
}

/// Camera control system.
///
/// Follows the framing controller until the user moves the camera.
///
/// Controls:
/// - Right-click drag: Orbit around target
/// - Middle-click drag (or Alt+right-click): Pan
/// - Scroll wheel: Zoom
/// - WASD: Pan horizontally
/// - Q/E: Pan vertically
/// - R: Return to automatic framing
pub fn camera_system(
    mut rig: ResMut<CameraRig>,
    sim: Res<SimulationRes>,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll: EventReader<MouseWheel>,
) {
    let alt_held = keyboard.pressed(KeyCode::AltLeft) || keyboard.pressed(KeyCode::AltRight);
    let orbiting = mouse_button.pressed(MouseButton::Right) && !alt_held;
    let panning = mouse_button.pressed(MouseButton::Middle)
        || (mouse_button.pressed(MouseButton::Right) && alt_held);

    let motion: Vec2 = if orbiting || panning {
        mouse_motion.read().map(|ev| ev.delta).sum()
    } else {
        mouse_motion.clear();
        Vec2::ZERO
    };
    let zoom: f32 = scroll.read().map(|ev| ev.y).sum();

    let pan_keys = [
        KeyCode::KeyW,
        KeyCode::KeyA,
        KeyCode::KeyS,
        KeyCode::KeyD,
        KeyCode::KeyQ,
        KeyCode::KeyE,
    ];
    let manual = motion != Vec2::ZERO || zoom != 0.0 || keyboard.any_pressed(pan_keys);

    // Hand over to manual control from wherever the camera currently is
    if manual && rig.auto_frame {
        if let Some(framing) = rig.controller.current() {
            rig.orbit = CameraOrbit::from_look(framing.position, framing.target);
        }
        rig.auto_frame = false;
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        rig.auto_frame = true;
        rig.controller.reset();
    }

    if rig.auto_frame {
        let framing = rig.controller.update(&sim.0);
        if let Ok(mut transform) = camera_query.get_single_mut() {
            *transform =
                Transform::from_translation(framing.position).looking_at(framing.target, Vec3::Y);
        }
        return;
    }

    let orbit = &mut rig.orbit;
    if orbiting {
        orbit.yaw -= motion.x * 0.01;
        orbit.pitch = (orbit.pitch + motion.y * 0.01).clamp(-1.5, 1.5);
    }

    if panning {
        // Pan perpendicular to view direction, scaled with distance
        let right = Vec3::new(orbit.yaw.cos(), 0.0, -orbit.yaw.sin());
        let speed = orbit.distance * 0.002;
        orbit.target -= right * motion.x * speed;
        orbit.target += Vec3::Y * motion.y * speed;
    }

    orbit.distance = (orbit.distance * (1.0 - zoom * 0.1)).clamp(2.0, 2000.0);

    let pan_speed = orbit.distance * 0.01;
    let forward = -Vec3::new(orbit.yaw.sin(), 0.0, orbit.yaw.cos());
    let right = Vec3::new(orbit.yaw.cos(), 0.0, -orbit.yaw.sin());

    if keyboard.pressed(KeyCode::KeyW) {
        orbit.target += forward * pan_speed;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        orbit.target -= forward * pan_speed;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        orbit.target -= right * pan_speed;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        orbit.target += right * pan_speed;
    }
    if keyboard.pressed(KeyCode::KeyQ) {
        orbit.target.y -= pan_speed;
    }
    if keyboard.pressed(KeyCode::KeyE) {
        orbit.target.y += pan_speed;
    }

    if let Ok(mut transform) = camera_query.get_single_mut() {
        let pos = calculate_camera_position(orbit);
        *transform = Transform::from_translation(pos).looking_at(orbit.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_from_look_round_trips_position() {
        let position = Vec3::new(12.0, 9.6, 12.0);
        let target = Vec3::new(1.0, -2.0, 3.0);
        let orbit = CameraOrbit::from_look(position, target);
        assert!(calculate_camera_position(&orbit).distance(position) < 1e-3);
    }
}
