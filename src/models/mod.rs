//! Domain models: raw landscape records and derived visual primitives.

mod entity;
mod scene;

pub use entity::{Connection, ConnectionKind, Entity, LandscapeData};
pub use scene::{Background, EdgeMeta, NodeMeta, Rgb, ThemedScene, VisualEdge, VisualNode};
