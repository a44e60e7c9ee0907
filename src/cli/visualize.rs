//! Visualize subcommand - open the 3D view of a landscape file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::models::LandscapeData;
use crate::visualization::{run_visualizer, VisualizerInput};

/// Visualize a landscape from a JSON file.
#[derive(Parser)]
pub struct VisualizeCommand {
    /// Path to a JSON file with `entities` and `connections` arrays.
    pub input: PathBuf,

    /// Built-in theme name (overrides config).
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Re-read the file every SECS seconds when it changes (overrides config).
    #[arg(short, long, value_name = "SECS")]
    pub watch: Option<u64>,
}

impl VisualizeCommand {
    /// Run the visualize command.
    pub fn run(self) -> color_eyre::Result<()> {
        let mut config = Config::load()?;
        if let Some(secs) = self.watch {
            config.render.refresh_interval_secs = secs;
        }
        let theme = config.resolve_theme(self.theme.as_deref())?;

        let data = LandscapeData::load(&self.input)?;
        tracing::info!(
            "Loaded {} entities and {} connections from {} (theme '{}')",
            data.entities.len(),
            data.connections.len(),
            self.input.display(),
            theme.name
        );

        run_visualizer(VisualizerInput {
            config,
            theme,
            data,
            source: self.input,
        });
        Ok(())
    }
}
