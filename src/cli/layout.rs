//! Layout subcommand - settle the simulation headless and print positions.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use crate::camera::{CameraController, CameraFraming};
use crate::config::Config;
use crate::models::LandscapeData;
use crate::simulation::{Simulation, SimulationState};
use crate::theme::{apply_standard_theme, Theme};

/// Run the layout to completion without a window.
#[derive(Parser)]
pub struct LayoutCommand {
    /// Path to a JSON file with `entities` and `connections` arrays.
    pub input: PathBuf,

    /// Built-in theme name (overrides config).
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Stop after this many ticks even if not settled.
    #[arg(long, default_value = "3000")]
    pub max_ticks: usize,

    /// Seed for the initial position jitter (overrides config).
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Final position of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodePlacement {
    pub id: String,
    pub position: [f32; 3],
    pub radius: f32,
}

/// Result of a headless layout run.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub ticks: usize,
    pub state: SimulationState,
    pub camera: CameraFraming,
    pub nodes: Vec<NodePlacement>,
}

impl LayoutReport {
    /// Map `data` with `theme`, run the simulation and frame the result.
    pub fn compute(config: &Config, theme: &Theme, data: &LandscapeData, max_ticks: usize) -> Self {
        let scene = apply_standard_theme(theme, &data.entities, &data.connections);
        let mut sim = Simulation::new(config.simulation.clone());
        sim.start(&scene.nodes, &scene.edges);
        let ticks = sim.run_until_settled(max_ticks);

        let camera = CameraController::new(config.camera.clone()).compute_framing(sim.nodes());
        let nodes = sim
            .nodes()
            .iter()
            .map(|n| NodePlacement {
                id: n.id.clone(),
                position: n.position.to_array(),
                radius: n.radius,
            })
            .collect();

        Self {
            ticks,
            state: sim.state(),
            camera,
            nodes,
        }
    }
}

impl LayoutCommand {
    /// Run the layout command.
    pub fn run(self) -> color_eyre::Result<()> {
        let mut config = Config::load()?;
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        let theme = config.resolve_theme(self.theme.as_deref())?;

        let data = LandscapeData::load(&self.input)?;
        tracing::info!(
            "Loaded {} entities and {} connections from {}",
            data.entities.len(),
            data.connections.len(),
            self.input.display()
        );

        let report = LayoutReport::compute(&config, &theme, &data, self.max_ticks);
        if report.state != SimulationState::Settled {
            tracing::warn!("Layout did not settle within {} ticks", self.max_ticks);
        }

        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Connection, ConnectionKind, Entity};

    fn data() -> LandscapeData {
        LandscapeData {
            entities: vec![
                Entity::new("acme", "Acme").with_market_cap(5e10).home(),
                Entity::new("globex", "Globex").with_market_cap(2e9),
                Entity::new("initech", "Initech").with_market_cap(4e7),
            ],
            connections: vec![
                Connection::new("acme", "globex", ConnectionKind::Competitor),
                Connection::new("acme", "initech", ConnectionKind::Partner),
            ],
        }
    }

    #[test]
    fn test_report_settles_and_targets_heaviest() {
        let config = Config::default();
        let report = LayoutReport::compute(&config, &Theme::market(), &data(), 3000);
        assert_eq!(report.state, SimulationState::Settled);
        assert_eq!(report.nodes.len(), 3);
        let acme = report.nodes.iter().find(|n| n.id == "acme").unwrap();
        assert_eq!(report.camera.target.to_array(), acme.position);
    }

    #[test]
    fn test_report_is_reproducible_for_a_seed() {
        let config = Config::default();
        let a = LayoutReport::compute(&config, &Theme::market(), &data(), 3000);
        let b = LayoutReport::compute(&config, &Theme::market(), &data(), 3000);
        let positions = |r: &LayoutReport| r.nodes.iter().map(|n| n.position).collect::<Vec<_>>();
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn test_report_serializes_expected_fields() {
        let report = LayoutReport::compute(&Config::default(), &Theme::market(), &LandscapeData::default(), 10);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ticks"], 0);
        assert_eq!(json["state"], "settled");
        assert!(json["nodes"].as_array().unwrap().is_empty());
        assert!(json["camera"]["position"].is_array());
    }
}
