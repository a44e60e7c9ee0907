//! Per-frame render data and pointer picking.
//!
//! A [`RenderFrame`] is a read-only copy of what a renderer needs from the
//! simulation: sphere instances, line segments and a bounded set of labels.
//! Picking works on the frame by index; [`resolve`] turns an index back into
//! node or edge ids through the simulation's tables.

use bevy::math::Vec3;

use crate::models::Rgb;
use crate::simulation::Simulation;

/// Label height above the top of its sphere.
const LABEL_LIFT: f32 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct SphereInstance {
    /// Node index in the simulation.
    pub index: usize,
    pub position: Vec3,
    pub radius: f32,
    pub color: Rgb,
    pub glow: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    /// Link index in the simulation.
    pub index: usize,
    pub start: Vec3,
    pub end: Vec3,
    pub thickness: f32,
    pub color: Rgb,
    pub dashed: bool,
    pub particles: bool,
    pub pulses_on_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub index: usize,
    pub text: String,
    /// World-space point the label is drawn at.
    pub anchor: Vec3,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    pub spheres: Vec<SphereInstance>,
    pub segments: Vec<LineSegment>,
    pub labels: Vec<Label>,
}

impl RenderFrame {
    /// Snapshot the simulation. At most `label_budget` labels are kept, for
    /// the largest nodes.
    pub fn capture(sim: &Simulation, label_budget: usize) -> Self {
        let mut frame = Self::default();
        frame.refill(sim, label_budget);
        frame
    }

    /// Like [`capture`](Self::capture), reusing this frame's buffers.
    pub fn refill(&mut self, sim: &Simulation, label_budget: usize) {
        let nodes = sim.nodes();

        self.spheres.clear();
        self.spheres
            .extend(nodes.iter().enumerate().map(|(index, n)| SphereInstance {
                index,
                position: n.position,
                radius: n.radius,
                color: n.color,
                glow: n.glow,
            }));

        self.segments.clear();
        self.segments.extend(
            sim.links()
                .iter()
                .enumerate()
                .filter(|(_, l)| l.source < nodes.len() && l.target < nodes.len())
                .map(|(index, l)| LineSegment {
                    index,
                    start: nodes[l.source].position,
                    end: nodes[l.target].position,
                    thickness: l.thickness,
                    color: l.color,
                    dashed: l.dashed,
                    particles: l.particles,
                    pulses_on_active: l.pulses_on_active,
                }),
        );

        let mut ranked: Vec<usize> = (0..nodes.len()).collect();
        ranked.sort_by(|&a, &b| nodes[b].size.total_cmp(&nodes[a].size).then(a.cmp(&b)));
        ranked.truncate(label_budget);

        self.labels.clear();
        self.labels.extend(ranked.into_iter().map(|index| {
            let n = &nodes[index];
            Label {
                index,
                text: n.name.clone(),
                anchor: label_anchor(n.position, n.radius),
            }
        }));
    }
}

/// Point a node's label is drawn at, just above its sphere.
pub fn label_anchor(position: Vec3, radius: f32) -> Vec3 {
    position + Vec3::Y * (radius + LABEL_LIFT)
}

/// A pointer ray in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Returns `None` for a zero or non-finite direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// What a pointer hit, by frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Node(usize),
    Edge(usize),
}

/// What a pointer hit, by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickTarget {
    Node(String),
    Edge { source: String, target: String },
}

/// Closest sphere whose radius, scaled by `hit_scale`, the ray passes through.
pub fn pick_sphere(ray: &Ray, spheres: &[SphereInstance], hit_scale: f32) -> Option<usize> {
    let mut closest: Option<(usize, f32)> = None;
    for sphere in spheres {
        let t = (sphere.position - ray.origin).dot(ray.direction);
        if t <= 0.0 {
            continue;
        }
        let miss = ray.at(t).distance(sphere.position);
        if miss < sphere.radius * hit_scale && closest.map_or(true, |(_, best)| t < best) {
            closest = Some((sphere.index, t));
        }
    }
    closest.map(|(index, _)| index)
}

/// Closest segment passing within `tolerance` of the ray.
pub fn pick_segment(ray: &Ray, segments: &[LineSegment], tolerance: f32) -> Option<usize> {
    let mut closest: Option<(usize, f32)> = None;
    for segment in segments {
        let Some((t, miss)) = ray_segment_distance(ray, segment.start, segment.end) else {
            continue;
        };
        if miss <= tolerance && closest.map_or(true, |(_, best)| t < best) {
            closest = Some((segment.index, t));
        }
    }
    closest.map(|(index, _)| index)
}

/// Resolve a pick to ids. `None` if the index is stale.
pub fn resolve(sim: &Simulation, pick: Pick) -> Option<PickTarget> {
    match pick {
        Pick::Node(index) => sim.node_id(index).map(|id| PickTarget::Node(id.to_string())),
        Pick::Edge(index) => {
            let link = sim.link(index)?;
            Some(PickTarget::Edge {
                source: sim.node_id(link.source)?.to_string(),
                target: sim.node_id(link.target)?.to_string(),
            })
        }
    }
}

/// Ray parameter and distance of the closest approach between a ray and a
/// segment. `None` when the closest point is behind the ray origin.
fn ray_segment_distance(ray: &Ray, a: Vec3, b: Vec3) -> Option<(f32, f32)> {
    let u = ray.direction;
    let v = b - a;
    let w = ray.origin - a;
    let c = v.dot(v);
    let s = if c <= f32::EPSILON {
        0.0
    } else {
        let (uv, uw, vw) = (u.dot(v), u.dot(w), v.dot(w));
        let denom = c - uv * uv;
        let s = if denom.abs() <= f32::EPSILON {
            0.0
        } else {
            (vw - uv * uw) / denom
        };
        s.clamp(0.0, 1.0)
    };
    let t = (a + v * s - ray.origin).dot(u);
    if t <= 0.0 {
        return None;
    }
    let s = if c <= f32::EPSILON {
        0.0
    } else {
        ((ray.at(t) - a).dot(v) / c).clamp(0.0, 1.0)
    };
    Some((t, ray.at(t).distance(a + v * s)))
}
