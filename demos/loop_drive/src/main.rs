//! loop_drive — drive a waypoint lattice around a looping route.
//!
//! Builds a synthetic two-lane loop, snaps a start location onto it, and
//! builds a lattice ahead of it.  The ego vehicle sits half the lattice
//! range ahead of the entry; every step the lattice shifts forward and the
//! ego is re-resolved on it.  The final lattice is written to
//! `output/loop_drive/lattice_nodes.json` for visualization.
//!
//! Run with: `cargo run -p loop_drive [-- config.json]`
//!
//! Enable lattice logging with `RUST_LOG=debug`.

mod network;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use log::info;
use serde::Deserialize;
use serde_json::json;

use cl_core::{LatticeConfig, RoadId, RouteConfig};
use cl_lattice::{Lattice, LatticeNode};
use cl_spatial::{LaneMap, LoopRouter};

use network::{TOWN_LOOP, build_loop};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    lattice: LatticeConfig,
    route:   RouteConfig,
    /// Where the vehicle is placed before snapping onto the map.
    start:   [f64; 2],
    steps:   usize,
    /// Metres the lattice shifts per step.
    step_m:  f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            lattice: LatticeConfig::default(),
            route:   RouteConfig::new(TOWN_LOOP.map(RoadId)),
            start:   [5.0, 1.0],
            steps:   60,
            step_m:  12.5,
        }
    }
}

fn load_config() -> Result<DemoConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(DemoConfig::default());
    };
    let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config: DemoConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    Ok(config)
}

// ── Export ────────────────────────────────────────────────────────────────────

fn node_json(node: &LatticeNode) -> serde_json::Value {
    let p = node.position();
    let links = node.links();
    json!({
        "id":       p.id.0,
        "road":     p.road.0,
        "lane":     p.lane.0,
        "s":        p.s,
        "distance": node.distance(),
        "x":        p.transform.x,
        "y":        p.transform.y,
        "yaw":      p.transform.yaw,
        "front":    links.front.map(|id| id.0),
        "back":     links.back.map(|id| id.0),
        "left":     links.left.map(|id| id.0),
        "right":    links.right.map(|id| id.0),
    })
}

fn export(lattice: &Lattice<LaneMap, LoopRouter>, dir: &Path) -> Result<usize> {
    let mut nodes: Vec<&LatticeNode> = lattice.nodes().collect();
    nodes.sort_by(|a, b| {
        a.distance()
            .total_cmp(&b.distance())
            .then(a.position().lane.cmp(&b.position().lane))
    });
    let markers: Vec<serde_json::Value> = nodes.into_iter().map(node_json).collect();

    fs::create_dir_all(dir)?;
    let path = dir.join("lattice_nodes.json");
    fs::write(&path, serde_json::to_string_pretty(&markers)?)?;
    Ok(markers.len())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    config.lattice.validate()?;
    if !(config.step_m > 0.0) {
        return Err(anyhow!("step_m must be positive, got {}", config.step_m));
    }

    // 1. Map and route.
    let map = Arc::new(build_loop(&config.route.road_sequence)?);
    let router = Arc::new(LoopRouter::from_config(&config.route)?);
    info!(
        "loop map: {} roads, route of {} roads",
        map.road_count(),
        router.road_sequence().len()
    );

    // 2. Start at the map position closest to the requested location.
    let [sx, sy] = config.start;
    let start = map
        .snap_to_position(sx, sy)
        .ok_or_else(|| anyhow!("map has no roads"))?;
    if !router.contains(start.road) {
        return Err(anyhow!("start road {} is not on the route", start.road.0));
    }
    info!("start: road {} lane {} s {:.2}", start.road.0, start.lane.0, start.s);

    // 3. Lattice, with the ego half a range ahead of the entry.
    let t0 = Instant::now();
    let mut lattice = Lattice::from_config(start, &config.lattice, Arc::clone(&map), Arc::clone(&router))?;
    let ego_offset = config.lattice.range / 2.0;
    let mut ego = *lattice
        .front(&start, ego_offset)
        .ok_or_else(|| anyhow!("lattice shorter than {ego_offset} m"))?
        .position();
    info!(
        "lattice: {} nodes, range {:.1} m, ego on road {} s {:.2}",
        lattice.len(),
        lattice.range(),
        ego.road.0,
        ego.s
    );

    // 4. Drive.
    for step in 1..=config.steps {
        lattice.shift(config.step_m)?;
        let entry = *lattice.entry().position();
        ego = *lattice
            .front(&entry, ego_offset)
            .ok_or_else(|| anyhow!("lattice shorter than {ego_offset} m at step {step}"))?
            .position();
        info!(
            "step {step:>3}: ego road {:>5} lane {} s {:>6.2} | entry road {:>5} | {} nodes",
            ego.road.0,
            ego.lane.0,
            ego.s,
            entry.road.0,
            lattice.len()
        );
    }
    let elapsed = t0.elapsed();

    // 5. Export.
    let dir = Path::new("output/loop_drive");
    let count = export(&lattice, dir)?;
    println!("Drove {} steps in {:.3} s", config.steps, elapsed.as_secs_f64());
    println!("Wrote {}/lattice_nodes.json ({count} nodes)", dir.display());

    Ok(())
}
