//! Theme mapper: raw entities and connections to visual primitives.
//!
//! [`apply_theme`] is pure. It uses no randomness, so identical inputs always
//! produce identical nodes and edges, seed positions included. The callbacks
//! that make a theme swappable (palette lookup, normalization, colour key and
//! edge value) live behind [`ThemeHooks`].

mod definition;
mod palette;

pub use definition::{ColorBy, EdgeColorBy, EdgeValue, GlowBy, Theme, PRESET_NAMES};
pub use palette::Palette;

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::{
    Connection, EdgeMeta, Entity, NodeMeta, Rgb, ThemedScene, VisualEdge, VisualNode,
};
use palette::stable_signed_unit;

/// Radius of the sphere category anchors sit on, inside the unit cube.
const ANCHOR_RADIUS: f64 = 0.3;
/// Per-axis jitter added around a category anchor.
const JITTER: f64 = 0.15;
/// Per-axis drift; keeps the drift vector under 0.05 in length.
const DRIFT: f64 = 0.028;

const SENTIMENT_NEGATIVE: Rgb = Rgb(0xE5484D);
const SENTIMENT_POSITIVE: Rgb = Rgb(0x30A46C);

/// Observed range of a positive numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range over the finite, strictly positive values; `None` if there are none.
    pub fn observe(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(None, |acc: Option<ValueRange>, v| match acc {
                None => Some(ValueRange { min: v, max: v }),
                Some(r) => Some(ValueRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }
}

/// Callbacks parameterizing a mapping pass.
pub trait ThemeHooks {
    /// Colour for a compound key; `None` falls back to a neutral colour.
    fn palette(&self, key: &str) -> Option<Rgb>;

    /// Map a raw attribute onto [0, 1] given the observed range.
    fn normalize(&self, value: f64, range: Option<&ValueRange>) -> f64;

    /// Colour-selection key for an entity.
    fn compound(&self, theme: &Theme, entity: &Entity) -> Option<String>;

    /// Strength/style value in [0, 1] for a connection.
    fn connection_value(&self, theme: &Theme, connection: &Connection) -> f64;
}

/// Default hooks: categorical palette plus log-scaled normalization.
#[derive(Debug, Clone, Default)]
pub struct StandardHooks {
    palette: Palette,
}

impl StandardHooks {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Hooks using the theme's explicit palette over the categorical default.
    pub fn for_theme(theme: &Theme) -> Self {
        Self::new(Palette::default().with_entries(theme.palette.iter()))
    }
}

impl ThemeHooks for StandardHooks {
    fn palette(&self, key: &str) -> Option<Rgb> {
        self.palette.get(key)
    }

    fn normalize(&self, value: f64, range: Option<&ValueRange>) -> f64 {
        let Some(range) = range else {
            return 0.0;
        };
        if !value.is_finite() || value <= 0.0 {
            return 0.0;
        }
        let (lo, hi) = (range.min.log10(), range.max.log10());
        if hi - lo <= f64::EPSILON {
            return 0.5;
        }
        ((value.log10() - lo) / (hi - lo)).clamp(0.0, 1.0)
    }

    fn compound(&self, theme: &Theme, entity: &Entity) -> Option<String> {
        match theme.color_by {
            ColorBy::Industry => entity.industry.clone(),
            ColorBy::Segment => entity.segment.clone(),
            ColorBy::Home => Some(if entity.is_home { "home" } else { "other" }.to_string()),
        }
    }

    fn connection_value(&self, theme: &Theme, connection: &Connection) -> f64 {
        match theme.edge_value {
            EdgeValue::Strength => connection
                .strength
                .unwrap_or(theme.default_strength as f64),
            EdgeValue::Sentiment => connection.sentiment.map(|s| (s + 1.0) / 2.0).unwrap_or(0.5),
        }
    }
}

/// Map entities and connections to visual nodes, edges and a background.
///
/// Every entity yields one node. Every connection whose endpoints both exist
/// yields one edge; dangling references and self-loops are dropped.
pub fn apply_theme(
    theme: &Theme,
    entities: &[Entity],
    connections: &[Connection],
    hooks: &impl ThemeHooks,
) -> ThemedScene {
    let range = ValueRange::observe(entities.iter().filter_map(|e| e.market_cap));

    // Category anchors depend only on the set of keys, not on entity order.
    let keys: Vec<Option<String>> = entities.iter().map(|e| hooks.compound(theme, e)).collect();
    let categories: BTreeSet<&str> = keys.iter().flatten().map(String::as_str).collect();
    let anchors: FxHashMap<&str, [f64; 3]> = categories
        .iter()
        .enumerate()
        .map(|(i, key)| (*key, fibonacci_anchor(i, categories.len())))
        .collect();

    // First occurrence of an id owns it; later duplicates get a suffix that
    // collides with neither an input id nor an id already emitted.
    let input_ids: FxHashSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();
    let mut emitted: FxHashSet<String> = FxHashSet::default();
    let mut nodes = Vec::with_capacity(entities.len());

    for (entity, key) in entities.iter().zip(&keys) {
        let id = if emitted.contains(&entity.id) {
            let renamed = (2..)
                .map(|n| format!("{}#{}", entity.id, n))
                .find(|c| !input_ids.contains(c.as_str()) && !emitted.contains(c))
                .unwrap_or_default();
            tracing::debug!("Duplicate entity id {}, renamed to {}", entity.id, renamed);
            renamed
        } else {
            entity.id.clone()
        };
        emitted.insert(id.clone());

        let weight = entity.market_cap.unwrap_or(0.0);
        let norm = unit(hooks.normalize(weight, range.as_ref()));
        let size = unit(theme.min_size as f64 + (1.0 - theme.min_size as f64) * norm as f64);
        let glow = match theme.glow_by {
            GlowBy::Home if entity.is_home => 1.0,
            GlowBy::Home | GlowBy::None => 0.0,
            GlowBy::Weight => unit(norm as f64 * theme.glow_scale as f64),
        };

        let color = match (entity.is_home, theme.home_color) {
            (true, Some(home)) => home,
            _ => key
                .as_deref()
                .and_then(|k| hooks.palette(k))
                .unwrap_or(Rgb::NEUTRAL),
        };

        let anchor = key
            .as_deref()
            .and_then(|k| anchors.get(k).copied())
            .unwrap_or([0.0; 3]);

        nodes.push(VisualNode {
            position: seed_position(&id, anchor),
            drift: drift(&id),
            id,
            name: entity.name.clone(),
            size,
            color,
            glow,
            meta: NodeMeta {
                weight,
                category: key.clone(),
                is_home: entity.is_home,
            },
        });
    }

    let mut edges = Vec::with_capacity(connections.len());
    for conn in connections {
        if conn.source_id == conn.target_id {
            tracing::debug!("Dropping self-loop on {}", conn.source_id);
            continue;
        }
        if !input_ids.contains(conn.source_id.as_str()) || !input_ids.contains(conn.target_id.as_str())
        {
            tracing::debug!(
                "Dropping dangling edge {} -> {}",
                conn.source_id,
                conn.target_id
            );
            continue;
        }

        let value = unit(hooks.connection_value(theme, conn));
        let kind = conn.kind.as_str();
        let color = match theme.edge_color_by {
            EdgeColorBy::Kind => theme
                .kind_colors
                .get(kind)
                .copied()
                .unwrap_or(theme.edge_color),
            EdgeColorBy::Sentiment => sentiment_color(conn.sentiment),
            EdgeColorBy::Fixed => theme.edge_color,
        };

        edges.push(VisualEdge {
            source: conn.source_id.clone(),
            target: conn.target_id.clone(),
            thickness: value,
            color,
            dashed: theme.dashed_kinds.iter().any(|k| k == kind),
            particles: value >= theme.particle_threshold,
            pulses_on_active: theme.pulse_kinds.iter().any(|k| k == kind),
            meta: EdgeMeta {
                kind: conn.kind.clone(),
                strength: value as f64,
                sentiment: conn.sentiment,
            },
        });
    }

    tracing::debug!(
        "Theme '{}' mapped {} nodes, {} of {} edges",
        theme.name,
        nodes.len(),
        edges.len(),
        connections.len()
    );

    ThemedScene {
        nodes,
        edges,
        background: theme.background,
    }
}

/// Map with the theme's [`StandardHooks`].
pub fn apply_standard_theme(
    theme: &Theme,
    entities: &[Entity],
    connections: &[Connection],
) -> ThemedScene {
    apply_theme(theme, entities, connections, &StandardHooks::for_theme(theme))
}

/// Empty scene with the theme's background.
pub fn empty_scene(theme: &Theme) -> ThemedScene {
    ThemedScene {
        nodes: Vec::new(),
        edges: Vec::new(),
        background: theme.background,
    }
}

fn unit(v: f64) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

fn sentiment_color(sentiment: Option<f64>) -> Rgb {
    match sentiment {
        Some(s) if s < 0.0 => Rgb::NEUTRAL.lerp(SENTIMENT_NEGATIVE, -s),
        Some(s) => Rgb::NEUTRAL.lerp(SENTIMENT_POSITIVE, s),
        None => Rgb::NEUTRAL,
    }
}

/// Evenly spaced anchor on a sphere of radius `ANCHOR_RADIUS`.
fn fibonacci_anchor(i: usize, total: usize) -> [f64; 3] {
    if total <= 1 {
        return [0.0; 3];
    }
    let golden_ratio = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let idx = i as f64 + 0.5;
    let theta = 2.0 * std::f64::consts::PI * idx / golden_ratio;
    let phi = (1.0 - 2.0 * idx / total as f64).acos();
    [
        ANCHOR_RADIUS * phi.sin() * theta.cos(),
        ANCHOR_RADIUS * phi.cos(),
        ANCHOR_RADIUS * phi.sin() * theta.sin(),
    ]
}

fn seed_position(id: &str, anchor: [f64; 3]) -> [f32; 3] {
    let mut out = [0.0f32; 3];
    for (axis, slot) in out.iter_mut().enumerate() {
        let jitter = stable_signed_unit(id, axis as u64 + 1) * JITTER;
        *slot = (anchor[axis] + jitter).clamp(-0.5, 0.5) as f32;
    }
    out
}

fn drift(id: &str) -> [f32; 3] {
    let mut out = [0.0f32; 3];
    for (axis, slot) in out.iter_mut().enumerate() {
        *slot = (stable_signed_unit(id, axis as u64 + 11) * DRIFT) as f32;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConnectionKind;

    fn sample_entities() -> Vec<Entity> {
        vec![
            Entity::new("a", "Acme")
                .with_market_cap(1e9)
                .with_industry("Robotics")
                .home(),
            Entity::new("b", "Globex")
                .with_market_cap(5e10)
                .with_industry("Energy"),
            Entity::new("c", "Initech").with_market_cap(2e6),
        ]
    }

    #[test]
    fn test_largest_entity_gets_full_size() {
        let scene = apply_standard_theme(&Theme::market(), &sample_entities(), &[]);
        let b = scene.nodes.iter().find(|n| n.id == "b").unwrap();
        let c = scene.nodes.iter().find(|n| n.id == "c").unwrap();
        assert_eq!(b.size, 1.0);
        assert!((c.size - Theme::market().min_size).abs() < 1e-6);
    }

    #[test]
    fn test_home_entity_glows_and_gets_home_color() {
        let scene = apply_standard_theme(&Theme::market(), &sample_entities(), &[]);
        let a = scene.nodes.iter().find(|n| n.id == "a").unwrap();
        assert_eq!(a.glow, 1.0);
        assert_eq!(a.color, Rgb(0xFFD700));
        assert!(a.meta.is_home);
    }

    #[test]
    fn test_missing_category_gets_neutral_color() {
        let scene = apply_standard_theme(&Theme::market(), &sample_entities(), &[]);
        let c = scene.nodes.iter().find(|n| n.id == "c").unwrap();
        assert_eq!(c.color, Rgb::NEUTRAL);
        assert_eq!(c.meta.category, None);
    }

    #[test]
    fn test_positions_inside_unit_cube() {
        let entities: Vec<Entity> = (0..50)
            .map(|i| {
                Entity::new(format!("e{}", i), format!("E{}", i))
                    .with_industry(format!("ind{}", i % 7))
                    .with_market_cap(10f64.powi(i % 15))
            })
            .collect();
        let scene = apply_standard_theme(&Theme::market(), &entities, &[]);
        for node in &scene.nodes {
            for c in node.position {
                assert!((-0.5..=0.5).contains(&c));
            }
            let drift_len = node.drift.iter().map(|d| d * d).sum::<f32>().sqrt();
            assert!(drift_len <= 0.05);
        }
    }

    #[test]
    fn test_duplicate_ids_stay_unique() {
        let entities = vec![Entity::new("a", "A"), Entity::new("a", "A again")];
        let scene = apply_standard_theme(&Theme::market(), &entities, &[]);
        assert_eq!(scene.nodes[0].id, "a");
        assert_eq!(scene.nodes[1].id, "a#2");

        // A real id shaped like a rename is never shadowed.
        let entities = vec![
            Entity::new("a", "A"),
            Entity::new("a", "A again"),
            Entity::new("a#2", "Literal"),
        ];
        let scene = apply_standard_theme(&Theme::market(), &entities, &[]);
        let ids: Vec<&str> = scene.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a#3", "a#2"]);

        let mut sim = crate::simulation::Simulation::default();
        sim.start(&scene.nodes, &scene.edges);
        assert_eq!(sim.nodes().len(), 3);
    }

    #[test]
    fn test_self_loop_dropped() {
        let conns = vec![Connection::new("a", "a", ConnectionKind::Partner)];
        let scene = apply_standard_theme(&Theme::market(), &sample_entities(), &conns);
        assert!(scene.edges.is_empty());
    }

    #[test]
    fn test_edge_style_flags() {
        let conns = vec![
            Connection::new("a", "b", ConnectionKind::Adjacency).with_strength(0.2),
            Connection::new("a", "c", ConnectionKind::Competitor).with_strength(0.9),
        ];
        let scene = apply_standard_theme(&Theme::market(), &sample_entities(), &conns);
        assert!(scene.edges[0].dashed);
        assert!(!scene.edges[0].particles);
        assert!(scene.edges[1].particles);
        assert!(scene.edges[1].pulses_on_active);
        assert_eq!(scene.edges[1].color, Rgb(0xFF8050));
    }

    #[test]
    fn test_sentiment_theme_colors_edges() {
        let conns = vec![
            Connection::new("a", "b", ConnectionKind::Partner).with_sentiment(1.0),
            Connection::new("a", "c", ConnectionKind::Partner).with_sentiment(-1.0),
        ];
        let scene = apply_standard_theme(&Theme::sentiment(), &sample_entities(), &conns);
        assert_eq!(scene.edges[0].color, SENTIMENT_POSITIVE);
        assert_eq!(scene.edges[1].color, SENTIMENT_NEGATIVE);
        assert_eq!(scene.edges[0].thickness, 1.0);
        assert_eq!(scene.edges[1].thickness, 0.0);
    }

    #[test]
    fn test_custom_hooks_are_used() {
        struct Flat;
        impl ThemeHooks for Flat {
            fn palette(&self, _key: &str) -> Option<Rgb> {
                Some(Rgb(0x010203))
            }
            fn normalize(&self, _value: f64, _range: Option<&ValueRange>) -> f64 {
                f64::NAN
            }
            fn compound(&self, _theme: &Theme, _entity: &Entity) -> Option<String> {
                Some("all".to_string())
            }
            fn connection_value(&self, _theme: &Theme, _connection: &Connection) -> f64 {
                7.0
            }
        }

        let conns = vec![Connection::new("b", "c", ConnectionKind::Supplier)];
        let scene = apply_theme(&Theme::segment(), &sample_entities(), &conns, &Flat);
        for node in &scene.nodes {
            assert_eq!(node.color, Rgb(0x010203));
            assert_eq!(node.glow, 0.0);
        }
        assert_eq!(scene.edges[0].thickness, 1.0);
    }

    #[test]
    fn test_value_range_ignores_non_positive() {
        let range = ValueRange::observe([0.0, -3.0, f64::NAN, 10.0, 1000.0]).unwrap();
        assert_eq!(range, ValueRange { min: 10.0, max: 1000.0 });
        assert!(ValueRange::observe([0.0]).is_none());
    }
}
