//! Theme mapper behaviour through the public API.

use std::collections::HashSet;

use landscape::error::AppError;
use landscape::models::{Connection, ConnectionKind, Entity, LandscapeData, Rgb};
use landscape::theme::{apply_standard_theme, apply_theme, StandardHooks, Theme, PRESET_NAMES};

fn entities() -> Vec<Entity> {
    vec![
        Entity::new("acme", "Acme")
            .with_market_cap(5e10)
            .with_industry("Robotics")
            .home(),
        Entity::new("globex", "Globex")
            .with_market_cap(2e9)
            .with_industry("Robotics"),
        Entity::new("initech", "Initech")
            .with_market_cap(4e7)
            .with_industry("Software"),
        Entity::new("umbrella", "Umbrella").with_industry("Biotech"),
    ]
}

fn connections() -> Vec<Connection> {
    vec![
        Connection::new("acme", "globex", ConnectionKind::Competitor).with_strength(0.9),
        Connection::new("acme", "initech", ConnectionKind::Partner).with_sentiment(0.7),
        Connection::new("globex", "ghost", ConnectionKind::Competitor),
        Connection::new("phantom", "acme", ConnectionKind::Adjacency),
    ]
}

#[test]
fn mapping_is_idempotent_including_positions() {
    for name in PRESET_NAMES {
        let theme = Theme::preset(name).unwrap();
        let first = apply_standard_theme(&theme, &entities(), &connections());
        let second = apply_standard_theme(&theme, &entities(), &connections());
        assert_eq!(first, second, "theme {name}");
    }
}

#[test]
fn dangling_connections_are_dropped_and_valid_ones_kept_once() {
    let scene = apply_standard_theme(&Theme::market(), &entities(), &connections());
    let pairs: Vec<(&str, &str)> = scene
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(pairs, vec![("acme", "globex"), ("acme", "initech")]);

    let ids: HashSet<&str> = scene.nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in &scene.edges {
        assert!(ids.contains(edge.source.as_str()));
        assert!(ids.contains(edge.target.as_str()));
    }
}

#[test]
fn single_dangling_edge_yields_no_edges() {
    let entities = vec![Entity::new("a", "A"), Entity::new("b", "B")];
    let connections = vec![Connection::new("a", "c", ConnectionKind::Competitor)];
    let scene = apply_standard_theme(&Theme::market(), &entities, &connections);
    assert_eq!(scene.nodes.len(), 2);
    assert!(scene.edges.is_empty());
}

#[test]
fn sizes_and_glow_stay_in_unit_range_for_extreme_weights() {
    let entities = vec![
        Entity::new("zero", "Zero").with_market_cap(0.0),
        Entity::new("tiny", "Tiny").with_market_cap(1e-9),
        Entity::new("huge", "Huge").with_market_cap(1e15),
        Entity::new("none", "None"),
    ];
    for name in PRESET_NAMES {
        let scene = apply_standard_theme(&Theme::preset(name).unwrap(), &entities, &[]);
        for node in &scene.nodes {
            assert!((0.0..=1.0).contains(&node.size), "{} size {}", node.id, node.size);
            assert!((0.0..=1.0).contains(&node.glow), "{} glow {}", node.id, node.glow);
            for c in node.position {
                assert!((-0.5..=0.5).contains(&c));
            }
        }
    }
    let scene = apply_standard_theme(&Theme::market(), &entities, &[]);
    let huge = scene.nodes.iter().find(|n| n.id == "huge").unwrap();
    assert_eq!(huge.size, 1.0);
}

#[test]
fn empty_input_maps_to_empty_scene_with_background() {
    let theme = Theme::market();
    let scene = apply_standard_theme(&theme, &[], &[]);
    assert!(scene.nodes.is_empty());
    assert!(scene.edges.is_empty());
    assert_eq!(scene.background, theme.background);
}

#[test]
fn home_entity_gets_home_colour_and_glow() {
    let scene = apply_standard_theme(&Theme::market(), &entities(), &[]);
    let acme = scene.nodes.iter().find(|n| n.id == "acme").unwrap();
    assert_eq!(acme.color, Rgb(0xFFD700));
    assert_eq!(acme.glow, 1.0);
    let globex = scene.nodes.iter().find(|n| n.id == "globex").unwrap();
    assert_eq!(globex.glow, 0.0);
}

#[test]
fn edge_style_follows_theme_kinds() {
    let entities = entities();
    let connections = vec![
        Connection::new("acme", "globex", ConnectionKind::Competitor).with_strength(0.9),
        Connection::new("globex", "initech", ConnectionKind::Adjacency).with_strength(0.2),
    ];
    let scene = apply_standard_theme(&Theme::market(), &entities, &connections);
    let competitor = &scene.edges[0];
    assert!(competitor.pulses_on_active);
    assert!(competitor.particles);
    assert!(!competitor.dashed);
    let adjacency = &scene.edges[1];
    assert!(adjacency.dashed);
    assert!(!adjacency.particles);
    assert!((adjacency.thickness - 0.2).abs() < 1e-6);
}

#[test]
fn custom_palette_overrides_categorical_colours() {
    let mut theme = Theme::market();
    theme.home_color = None;
    theme.palette.insert("Robotics".to_string(), Rgb(0x123456));
    let hooks = StandardHooks::for_theme(&theme);
    let scene = apply_theme(&theme, &entities(), &[], &hooks);
    for node in scene.nodes.iter().filter(|n| n.meta.category.as_deref() == Some("Robotics")) {
        assert_eq!(node.color, Rgb(0x123456));
    }
}

#[test]
fn duplicate_ids_stay_unique() {
    let entities = vec![
        Entity::new("dup", "First"),
        Entity::new("dup", "Second"),
        Entity::new("dup", "Third"),
    ];
    let scene = apply_standard_theme(&Theme::market(), &entities, &[]);
    let ids: Vec<&str> = scene.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["dup", "dup#2", "dup#3"]);
}

#[test]
fn non_array_entities_are_invalid_input() {
    let err = LandscapeData::from_json(r#"{"entities": 5, "connections": []}"#).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput { ref field, .. } if field == "entities"));

    let err = LandscapeData::from_json(r#"{"entities": [], "connections": {"a": 1}}"#).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput { ref field, .. } if field == "connections"));
}

#[test]
fn malformed_optional_fields_degrade_to_defaults() {
    let data = LandscapeData::from_json(
        r#"{
            "entities": [
                {"id": "a", "marketCap": "lots", "industry": 7},
                {"id": "b", "name": "Bee", "isHome": "maybe"}
            ],
            "connections": [
                {"sourceId": "a", "targetId": "b", "strength": null, "type": 3}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(data.entities[0].market_cap, None);
    assert_eq!(data.entities[0].industry, None);
    assert_eq!(data.entities[0].name, "a");
    assert!(!data.entities[1].is_home);
    assert_eq!(data.connections[0].strength, None);

    let scene = apply_standard_theme(&Theme::market(), &data.entities, &data.connections);
    assert_eq!(scene.nodes[0].color, Rgb::NEUTRAL);
    assert_eq!(scene.edges.len(), 1);
}
