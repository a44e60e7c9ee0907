//! CLI module for Landscape.
//!
//! Subcommands:
//! - `visualize`: Open the interactive 3D view of a landscape file
//! - `layout`: Run the layout headless and print the settled positions
//! - `themes`: List the built-in themes

mod layout;
mod visualize;

use clap::{Parser, Subcommand};

pub use layout::{LayoutCommand, LayoutReport, NodePlacement};
pub use visualize::VisualizeCommand;

use crate::theme::{Theme, PRESET_NAMES};

/// Landscape - competitive landscape graph in 3D
#[derive(Parser)]
#[command(name = "landscape")]
#[command(about = "Force-directed 3D layout of companies and their relationships")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Visualize a landscape JSON file in 3D
    Visualize(VisualizeCommand),

    /// Lay out a landscape headless and print positions as JSON
    Layout(LayoutCommand),

    /// List built-in themes
    Themes,
}

impl App {
    /// Run the CLI application.
    pub fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Visualize(cmd) => cmd.run(),
            Command::Layout(cmd) => cmd.run(),
            Command::Themes => {
                for name in PRESET_NAMES {
                    let description = Theme::preset_description(name).unwrap_or_default();
                    println!("{name:<12} {description}");
                }
                Ok(())
            }
        }
    }
}
