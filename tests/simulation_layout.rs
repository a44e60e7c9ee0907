//! End-to-end layout behaviour: theme mapping into the simulation, camera
//! framing and frame capture.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bevy::math::Vec3;
use landscape::camera::{CameraConfig, CameraController};
use landscape::cli::LayoutReport;
use landscape::config::Config;
use landscape::models::{Connection, ConnectionKind, Entity, LandscapeData};
use landscape::render::{pick_sphere, resolve, Pick, PickTarget, Ray, RenderFrame};
use landscape::simulation::{Simulation, SimulationConfig, SimulationState};
use landscape::theme::{apply_standard_theme, Theme};

fn landscape(n: usize) -> LandscapeData {
    let industries = ["Robotics", "Energy", "Software"];
    let entities = (0..n)
        .map(|i| {
            Entity::new(format!("co{i}"), format!("Company {i}"))
                .with_market_cap(10f64.powi(6 + i as i32))
                .with_industry(industries[i % industries.len()])
        })
        .collect();
    let connections = (1..n)
        .map(|i| {
            Connection::new("co0", format!("co{i}"), ConnectionKind::Competitor)
                .with_strength(i as f64 / n as f64)
        })
        .collect();
    LandscapeData {
        entities,
        connections,
    }
}

fn started(config: SimulationConfig, data: &LandscapeData) -> Simulation {
    let scene = apply_standard_theme(&Theme::market(), &data.entities, &data.connections);
    let mut sim = Simulation::new(config);
    sim.start(&scene.nodes, &scene.edges);
    sim
}

fn assert_no_overlap(sim: &Simulation) {
    let nodes = sim.nodes();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            let gap = a.position.distance(b.position);
            assert!(
                gap >= a.radius + b.radius - 1e-3,
                "{} and {} overlap: {} < {}",
                a.id,
                b.id,
                gap,
                a.radius + b.radius
            );
        }
    }
}

#[test]
fn settled_layout_has_no_overlapping_spheres() {
    let mut sim = started(SimulationConfig::default(), &landscape(8));
    sim.run_until_settled(5000);
    assert_eq!(sim.state(), SimulationState::Settled);
    assert_no_overlap(&sim);
}

#[test]
fn fully_linked_layout_has_no_overlapping_spheres() {
    let mut data = landscape(12);
    data.connections = (0..12)
        .flat_map(|i| ((i + 1)..12).map(move |j| (i, j)))
        .map(|(i, j)| {
            Connection::new(format!("co{i}"), format!("co{j}"), ConnectionKind::Partner)
                .with_strength(1.0)
        })
        .collect();
    let mut sim = started(SimulationConfig::default(), &data);
    assert_eq!(sim.links().len(), 66);
    sim.run_until_settled(5000);
    assert_eq!(sim.state(), SimulationState::Settled);
    assert_no_overlap(&sim);
}

#[test]
fn positions_stay_inside_max_radius_every_tick() {
    let config = SimulationConfig {
        max_radius: 6.0,
        charge_strength: -200.0,
        ..SimulationConfig::default()
    };
    let mut sim = started(config, &landscape(12));
    for _ in 0..200 {
        sim.tick();
        for node in sim.nodes() {
            assert!(node.position.is_finite());
            assert!(node.position.length() <= 6.0 + 1e-3, "{} escaped", node.id);
        }
    }
}

#[test]
fn radius_grows_with_weight() {
    let sim = started(SimulationConfig::default(), &landscape(6));
    let mut nodes: Vec<_> = sim.nodes().to_vec();
    nodes.sort_by(|a, b| a.weight.total_cmp(&b.weight));
    for pair in nodes.windows(2) {
        assert!(pair[0].radius <= pair[1].radius);
    }
    let cfg = sim.config();
    assert!((nodes[0].radius - cfg.radius_min).abs() < 1e-5);
    assert!((nodes[nodes.len() - 1].radius - cfg.radius_max).abs() < 1e-5);
}

#[test]
fn empty_start_is_settled_and_frames_fallback() {
    let mut sim = Simulation::default();
    assert_eq!(sim.start(&[], &[]), SimulationState::Settled);
    assert_eq!(sim.tick(), SimulationState::Settled);
    assert_eq!(sim.ticks(), 0);

    let mut camera = CameraController::new(CameraConfig::default());
    let framing = camera.update(&sim);
    assert_eq!(framing.target, Vec3::ZERO);
    assert!((framing.distance() - CameraConfig::default().fallback_distance).abs() < 1e-4);

    let frame = RenderFrame::capture(&sim, 10);
    assert!(frame.spheres.is_empty());
    assert!(frame.labels.is_empty());
}

#[test]
fn reheat_after_settling_resumes_motion() {
    let mut sim = started(SimulationConfig::default(), &landscape(5));
    sim.run_until_settled(5000);
    assert_eq!(sim.state(), SimulationState::Settled);

    assert!(sim.reheat("co3"));
    assert_eq!(sim.state(), SimulationState::Hot);
    assert!(sim.alpha() >= sim.config().alpha_restart);
    assert!(sim.tick().is_running());
}

#[test]
fn tick_listeners_see_every_committed_tick() {
    let mut sim = started(SimulationConfig::default(), &landscape(4));
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    sim.on_tick(move |event| {
        assert_eq!(event.nodes.len(), 4);
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let ran = sim.run_until_settled(5000);
    assert_eq!(seen.load(Ordering::SeqCst), ran);
}

#[test]
fn refresh_keeps_survivors_and_adds_newcomers() {
    let data = landscape(5);
    let mut sim = started(SimulationConfig::default(), &data);
    sim.run_until_settled(5000);
    let before = sim.node("co2").map(|n| n.position);

    let mut grown = data.clone();
    grown.entities.push(Entity::new("newco", "NewCo").with_market_cap(3e8));
    grown
        .connections
        .push(Connection::new("newco", "co2", ConnectionKind::Partner));
    let scene = apply_standard_theme(&Theme::market(), &grown.entities, &grown.connections);
    let state = sim.refresh(&scene.nodes, &scene.edges);

    assert!(state.is_running());
    assert_eq!(sim.generation(), 2);
    assert_eq!(sim.node("co2").map(|n| n.position), before);
    assert!(sim.node("newco").is_some());
    assert_eq!(sim.links().len(), 5);
}

#[test]
fn camera_targets_heaviest_node_and_sees_everything() {
    let mut sim = started(SimulationConfig::default(), &landscape(6));
    sim.run_until_settled(5000);

    let mut camera = CameraController::new(CameraConfig::default());
    let framing = camera.update(&sim);
    let heaviest = sim.node("co5").map(|n| n.position);
    assert_eq!(Some(framing.target), heaviest);

    // Camera distance covers the widest per-axis reach of any sphere.
    let reach = sim
        .nodes()
        .iter()
        .map(|n| (n.position - framing.target).abs().max_element() + n.radius)
        .fold(0.0f32, f32::max);
    assert!(framing.distance() >= reach);
}

#[test]
fn frame_capture_respects_label_budget_and_picks_nodes() {
    let mut sim = started(SimulationConfig::default(), &landscape(7));
    sim.run_until_settled(5000);

    let frame = RenderFrame::capture(&sim, 3);
    assert_eq!(frame.spheres.len(), 7);
    assert_eq!(frame.segments.len(), 6);
    assert_eq!(frame.labels.len(), 3);
    // The three heaviest companies carry labels.
    let mut labelled: Vec<&str> = frame.labels.iter().map(|l| l.text.as_str()).collect();
    labelled.sort_unstable();
    assert_eq!(labelled, vec!["Company 4", "Company 5", "Company 6"]);

    let target = frame.spheres[2].position;
    let ray = Ray::new(target + Vec3::new(0.0, 0.0, 500.0), Vec3::NEG_Z).unwrap();
    let hit = pick_sphere(&ray, &frame.spheres, 1.0);
    assert!(hit.is_some());
    let target = resolve(&sim, Pick::Node(hit.unwrap()));
    assert!(matches!(target, Some(PickTarget::Node(_))));
}

#[test]
fn layout_report_from_file_settles() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "entities": [
                {{"id": "acme", "name": "Acme", "marketCap": 5e10, "industry": "Robotics", "isHome": true}},
                {{"id": "globex", "name": "Globex", "marketCap": 2e9, "industry": "Robotics"}},
                {{"id": "initech", "name": "Initech", "marketCap": 4e7, "industry": "Software"}}
            ],
            "connections": [
                {{"sourceId": "acme", "targetId": "globex", "type": "competitor", "strength": 0.8}},
                {{"sourceId": "initech", "targetId": "nobody", "type": "partner"}}
            ]
        }}"#
    )
    .unwrap();

    let data = LandscapeData::load(file.path()).unwrap();
    let config = Config::default();
    let report = LayoutReport::compute(&config, &Theme::market(), &data, 3000);

    assert_eq!(report.state, SimulationState::Settled);
    assert!(report.ticks > 0 && report.ticks < 3000);
    let ids: Vec<&str> = report.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["acme", "globex", "initech"]);
    // Home entity is the heaviest, so the camera looks at it.
    assert_eq!(report.camera.target.to_array(), report.nodes[0].position);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["state"], "settled");
}

#[test]
fn sample_landscape_lays_out() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/sample_landscape.json");
    let data = LandscapeData::load(&path).unwrap();
    let report = LayoutReport::compute(&Config::default(), &Theme::market(), &data, 3000);
    assert_eq!(report.state, SimulationState::Settled);
    assert_eq!(report.nodes.len(), data.entities.len());
}
