//! Live simulation state for nodes and links.

use bevy::math::Vec3;

use crate::models::{EdgeMeta, Rgb, VisualEdge, VisualNode};

/// A node with mutable position and velocity.
#[derive(Debug, Clone)]
pub struct ForceNode {
    /// Node ID (from VisualNode).
    pub id: String,
    /// Display label.
    pub name: String,
    /// Current position in 3D space.
    pub position: Vec3,
    /// Current velocity.
    pub velocity: Vec3,
    /// Collision and rendering radius.
    pub radius: f32,
    /// Raw sizing value.
    pub weight: f64,
    /// Weight on the log scale, remapped onto [0, 1].
    pub weight_norm: f32,
    pub size: f32,
    pub color: Rgb,
    pub glow: f32,
    pub drift: Vec3,
    pub category: Option<String>,
    pub is_home: bool,
    pub(crate) pinned: Option<Vec3>,
}

impl ForceNode {
    pub(crate) fn from_visual(node: &VisualNode, position: Vec3, scale: &RadiusScale) -> Self {
        let weight = node.meta.weight;
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            position,
            velocity: Vec3::ZERO,
            radius: scale.radius(weight),
            weight,
            weight_norm: scale.norm(weight),
            size: node.size,
            color: node.color,
            glow: node.glow,
            drift: Vec3::from_array(node.drift),
            category: node.meta.category.clone(),
            is_home: node.meta.is_home,
            pinned: None,
        }
    }

    /// Whether a drag currently holds this node in place.
    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }
}

/// A link between two nodes, by index into the simulation's node buffer.
#[derive(Debug, Clone)]
pub struct ForceLink {
    /// Source node index.
    pub source: usize,
    /// Target node index.
    pub target: usize,
    /// Distance where the link force is zero.
    pub rest_length: f32,
    pub strength: f32,
    /// Share of the correction applied to the target.
    pub bias: f32,
    pub thickness: f32,
    pub color: Rgb,
    pub dashed: bool,
    pub particles: bool,
    pub pulses_on_active: bool,
    pub meta: EdgeMeta,
}

impl ForceLink {
    pub(crate) fn from_visual(edge: &VisualEdge, source: usize, target: usize) -> Self {
        Self {
            source,
            target,
            rest_length: 0.0,
            strength: 0.0,
            bias: 0.5,
            thickness: edge.thickness,
            color: edge.color,
            dashed: edge.dashed,
            particles: edge.particles,
            pulses_on_active: edge.pulses_on_active,
            meta: edge.meta.clone(),
        }
    }
}

/// Log-scaled mapping from raw weight to radius.
///
/// `log10(max(weight, 1))` is remapped linearly from the observed
/// `[min, max]` onto `[radius_min, radius_max]`, so orders of magnitude in
/// the weight stay visible but bounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    log_min: f64,
    log_max: f64,
    radius_min: f32,
    radius_max: f32,
}

impl RadiusScale {
    /// Scale over a set of weights.
    pub fn from_weights(weights: impl IntoIterator<Item = f64>, radius_min: f32, radius_max: f32) -> Self {
        let (log_min, log_max) = weights
            .into_iter()
            .map(log_weight)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        Self {
            log_min,
            log_max,
            radius_min: radius_min.min(radius_max),
            radius_max: radius_max.max(radius_min),
        }
    }

    /// Weight remapped onto [0, 1]; 0.5 when the observed range is degenerate.
    pub fn norm(&self, weight: f64) -> f32 {
        let span = self.log_max - self.log_min;
        if !span.is_finite() || span <= f64::EPSILON {
            return 0.5;
        }
        ((log_weight(weight) - self.log_min) / span).clamp(0.0, 1.0) as f32
    }

    /// Radius for a raw weight.
    pub fn radius(&self, weight: f64) -> f32 {
        self.radius_min + (self.radius_max - self.radius_min) * self.norm(weight)
    }
}

fn log_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(1.0).log10()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_spans_configured_range() {
        let scale = RadiusScale::from_weights([1e3, 1e6, 1e12], 0.8, 2.0);
        assert!((scale.radius(1e3) - 0.8).abs() < 1e-6);
        assert!((scale.radius(1e12) - 2.0).abs() < 1e-6);
        // 1e6 sits a third of the way along the log range.
        assert!((scale.radius(1e6) - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_range_uses_midpoint() {
        let scale = RadiusScale::from_weights([5.0, 5.0], 0.8, 2.0);
        assert!((scale.radius(5.0) - 1.4).abs() < 1e-6);
        let empty = RadiusScale::from_weights([], 0.8, 2.0);
        assert!((empty.radius(10.0) - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_zero_and_non_finite_weights_floor() {
        let scale = RadiusScale::from_weights([0.0, 100.0], 0.8, 2.0);
        assert!((scale.radius(0.0) - 0.8).abs() < 1e-6);
        assert!((scale.radius(f64::NAN) - 0.8).abs() < 1e-6);
        assert!((scale.radius(100.0) - 2.0).abs() < 1e-6);
    }
}
