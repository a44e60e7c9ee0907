//! Force terms.
//!
//! Every force reads the position snapshot taken at the start of the tick and
//! adds into a shared accumulator, so no node sees another node's position
//! from the same tick. Inverse-distance terms floor the distance.

use bevy::math::Vec3;

use super::node::ForceLink;

/// Distance below which two points are treated as coincident.
const COINCIDENT: f32 = 1e-6;

/// Springs pulling linked pairs toward their rest length.
pub fn apply_links(
    links: &[ForceLink],
    positions: &[Vec3],
    acc: &mut [Vec3],
    alpha: f32,
    min_distance: f32,
) {
    let n = positions.len();
    for (i, link) in links.iter().enumerate() {
        if link.source >= n || link.target >= n {
            continue;
        }
        let mut delta = positions[link.target] - positions[link.source];
        if delta.length_squared() < COINCIDENT * COINCIDENT {
            delta = jiggle(link.source, link.target + i);
        }
        let dist = delta.length().max(min_distance);
        let k = (dist - link.rest_length) / dist * alpha * link.strength;
        let pull = delta * k;
        acc[link.target] -= pull * link.bias;
        acc[link.source] += pull * (1.0 - link.bias);
    }
}

/// All-pairs repulsion with `1/d` falloff, cut off at `distance_max`.
///
/// Squared distances below `distance_min²` are floored.
pub fn apply_charge(
    positions: &[Vec3],
    acc: &mut [Vec3],
    alpha: f32,
    strength: f32,
    distance_min: f32,
    distance_max: f32,
) {
    let n = positions.len();
    let max2 = distance_max * distance_max;
    let min2 = distance_min * distance_min;
    for i in 0..n {
        for j in (i + 1)..n {
            let mut delta = positions[j] - positions[i];
            let mut l2 = delta.length_squared();
            if l2 >= max2 {
                continue;
            }
            if l2 < COINCIDENT * COINCIDENT {
                delta = jiggle(i, j);
                l2 = delta.length_squared();
            }
            if l2 < min2 {
                l2 = min2;
            }
            let w = strength * alpha / l2;
            acc[i] += delta * w;
            acc[j] -= delta * w;
        }
    }
}

/// Weak pull of every node toward the origin.
pub fn apply_center(positions: &[Vec3], acc: &mut [Vec3], alpha: f32, strength: f32) {
    for (p, a) in positions.iter().zip(acc.iter_mut()) {
        *a -= *p * strength * alpha;
    }
}

/// Pushes overlapping spheres apart, split by squared radius.
///
/// Not scaled by alpha, so overlap keeps resolving while the layout cools.
pub fn apply_collision(positions: &[Vec3], radii: &[f32], acc: &mut [Vec3], strength: f32) {
    let n = positions.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let r = radii[i] + radii[j];
            let mut delta = positions[j] - positions[i];
            let mut l2 = delta.length_squared();
            if l2 >= r * r {
                continue;
            }
            if l2 < COINCIDENT * COINCIDENT {
                delta = jiggle(i, j);
                l2 = delta.length_squared();
            }
            let l = l2.sqrt();
            let push = delta * ((r - l) / l * strength);
            let (ri2, rj2) = (radii[i] * radii[i], radii[j] * radii[j]);
            let share = if ri2 + rj2 > 0.0 { rj2 / (ri2 + rj2) } else { 0.5 };
            acc[i] -= push * share;
            acc[j] += push * (1.0 - share);
        }
    }
}

/// Pulls z toward 0, biasing the layout toward a plane.
pub fn apply_axis(positions: &[Vec3], acc: &mut [Vec3], alpha: f32, z_strength: f32) {
    for (p, a) in positions.iter().zip(acc.iter_mut()) {
        a.z -= p.z * z_strength * alpha;
    }
}

/// Heavier nodes are pulled toward the origin harder.
pub fn apply_weight_pull(
    positions: &[Vec3],
    weight_norms: &[f32],
    acc: &mut [Vec3],
    alpha: f32,
    strength: f32,
) {
    for ((p, w), a) in positions.iter().zip(weight_norms).zip(acc.iter_mut()) {
        *a -= *p * strength * *w * alpha;
    }
}

/// Hard radial clamp. Returns true if the node was moved.
pub fn contain(position: &mut Vec3, velocity: &mut Vec3, max_radius: f32) -> bool {
    let dist = position.length();
    if dist <= max_radius || dist <= COINCIDENT {
        return false;
    }
    let radial = *position / dist;
    *position = radial * max_radius;
    let outward = velocity.dot(radial);
    if outward > 0.0 {
        *velocity -= radial * outward;
    }
    true
}

/// Small deterministic direction for separating coincident points.
fn jiggle(i: usize, j: usize) -> Vec3 {
    let seed = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (j as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    let component = |shift: u32| ((seed >> shift) & 0xFFFF) as f32 / 65535.0 - 0.5;
    let v = Vec3::new(component(0), component(16), component(32));
    if v.length_squared() < 1e-4 {
        Vec3::new(1e-3, 0.0, 0.0)
    } else {
        v.normalize() * 1e-3
    }
}
