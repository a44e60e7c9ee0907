//! Landscape - competitive landscape graph in 3D
//!
//! Maps companies and their relationships to visual primitives with a
//! swappable theme, lays them out with a force-directed 3D simulation, and
//! frames the result around the dominant company.
//!
//! ```no_run
//! use landscape::models::LandscapeData;
//! use landscape::simulation::Simulation;
//! use landscape::theme::{apply_standard_theme, Theme};
//!
//! let data = LandscapeData::load("landscape.json".as_ref())?;
//! let scene = apply_standard_theme(&Theme::market(), &data.entities, &data.connections);
//! let mut sim = Simulation::default();
//! sim.start(&scene.nodes, &scene.edges);
//! sim.run_until_settled(3000);
//! # Ok::<(), landscape::error::AppError>(())
//! ```

pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod simulation;
pub mod theme;
pub mod visualization;
