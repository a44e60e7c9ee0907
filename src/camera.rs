//! Camera framing around the dominant node.
//!
//! The dominant node is the heaviest one, unless a focus id is set. The camera
//! sits along a fixed diagonal from that node, far enough back to see the
//! radius-inflated bounding box of the whole layout.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::simulation::{ForceNode, Simulation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera distance as a multiple of the largest bounding-box extent.
    pub offset_ratio: f32,
    /// Direction from target to camera; normalized on use.
    pub direction: [f32; 3],
    /// Distance used when the scene has no extent.
    pub fallback_distance: f32,
    pub min_distance: f32,
    /// Fraction of the remaining way to the goal covered per update.
    pub smoothing: f32,
    /// Only recompute the goal once alpha drops below `settle_alpha`.
    pub settle_only: bool,
    pub settle_alpha: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset_ratio: 1.5,
            direction: [1.0, 0.8, 1.0],
            fallback_distance: 30.0,
            min_distance: 8.0,
            smoothing: 0.1,
            settle_only: false,
            settle_alpha: 0.05,
        }
    }
}

/// Where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraFraming {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraFraming {
    /// Distance from camera to target.
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

/// Tracks the dominant node across ticks.
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    config: CameraConfig,
    focus: Option<String>,
    goal: Option<CameraFraming>,
    current: Option<CameraFraming>,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Override the dominant node; `None` returns to the heaviest node.
    pub fn focus(&mut self, id: Option<String>) {
        if self.focus != id {
            tracing::debug!("Camera focus changed to {:?}", id);
            self.focus = id;
            self.goal = None;
        }
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Last framing returned by [`update`](Self::update).
    pub fn current(&self) -> Option<CameraFraming> {
        self.current
    }

    /// Index of the node the camera targets.
    pub fn dominant(&self, nodes: &[ForceNode]) -> Option<usize> {
        if let Some(id) = &self.focus {
            if let Some(i) = nodes.iter().position(|n| &n.id == id) {
                return Some(i);
            }
        }
        nodes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, n)| match best {
                Some((_, w)) if n.weight <= w => best,
                _ => Some((i, n.weight)),
            })
            .map(|(i, _)| i)
    }

    /// Framing for a node set, ignoring smoothing.
    pub fn compute_framing(&self, nodes: &[ForceNode]) -> CameraFraming {
        let direction = Vec3::from_array(self.config.direction)
            .try_normalize()
            .unwrap_or(Vec3::ONE.normalize());
        let Some(dominant) = self.dominant(nodes) else {
            return CameraFraming {
                position: direction * self.config.fallback_distance,
                target: Vec3::ZERO,
            };
        };
        let target = nodes[dominant].position;

        let (lo, hi) = nodes.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), n| {
                let r = Vec3::splat(n.radius.max(0.0));
                (lo.min(n.position - r), hi.max(n.position + r))
            },
        );
        let extent = (hi - lo).max_element();
        let distance = if extent.is_finite() && extent > f32::EPSILON {
            (extent * self.config.offset_ratio).max(self.config.min_distance)
        } else {
            self.config.fallback_distance
        };

        CameraFraming {
            position: target + direction * distance,
            target,
        }
    }

    /// Move toward the framing for the simulation's current state.
    ///
    /// The first call snaps straight to the goal.
    pub fn update(&mut self, sim: &Simulation) -> CameraFraming {
        let recompute = !self.config.settle_only
            || self.goal.is_none()
            || sim.alpha() < self.config.settle_alpha;
        if recompute {
            self.goal = Some(self.compute_framing(sim.nodes()));
        }
        let goal = self.goal.unwrap_or_else(|| self.compute_framing(sim.nodes()));

        let next = match self.current {
            None => goal,
            Some(current) => {
                let t = self.config.smoothing.clamp(0.0, 1.0);
                CameraFraming {
                    position: current.position.lerp(goal.position, t),
                    target: current.target.lerp(goal.target, t),
                }
            }
        };
        self.current = Some(next);
        next
    }

    /// Forget the smoothed framing so the next update snaps.
    pub fn reset(&mut self) {
        self.goal = None;
        self.current = None;
    }
}
