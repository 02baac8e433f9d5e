//! Synthetic loop map for the demo.
//!
//! The route alternates long roads with short junction connectors, laid out
//! as a closed polygon: each road starts where the previous one ends and
//! turns by the same angle.  A spur branches off the first road's end and is
//! declared before the on-route connector, so only the router keeps the
//! lattice on the loop.

use std::f64::consts::TAU;

use anyhow::Result;

use cl_core::{LaneId, RoadId, Transform};
use cl_spatial::{LaneMap, LaneMapBuilder};

/// Road sequence of the loop, in driving order.
pub const TOWN_LOOP: [u32; 28] = [
    47, 558, 48, 887, 49, 717, 50, 42, 276, 43, 35, 636, 36, 540, 37, 1021, 38, 678, 39, 728,
    40, 841, 41, 6, 45, 103, 46, 659,
];

/// Off-route spur attached after the first road.
pub const SPUR: RoadId = RoadId(9_000);

pub const LANES: [LaneId; 2] = [LaneId(-1), LaneId(-2)];

const ROAD_LENGTH:      f64 = 80.0;
const CONNECTOR_LENGTH: f64 = 15.0;

/// Build a two-lane loop over `route`.  Even positions in the sequence are
/// roads, odd positions are connectors.
pub fn build_loop(route: &[RoadId]) -> Result<LaneMap> {
    let mut b = LaneMapBuilder::new();

    let turn = TAU / route.len().max(1) as f64;
    let (mut x, mut y) = (0.0, 0.0);
    for (i, &road) in route.iter().enumerate() {
        let length = if i % 2 == 0 { ROAD_LENGTH } else { CONNECTOR_LENGTH };
        let yaw = turn * i as f64;
        let start = Transform::new(x, y, 0.0, yaw);
        let (fx, fy) = start.forward();
        x += fx * length;
        y += fy * length;

        if i == 1 {
            // Spur first so map successor order alone would leave the loop.
            b.add_road(SPUR, 40.0, start, LANES);
            b.connect_roads(route[0], SPUR);
        }
        b.add_road(road, length, start, LANES);
    }
    for (i, &road) in route.iter().enumerate() {
        b.connect_roads(road, route[(i + 1) % route.len()]);
    }

    Ok(b.build()?)
}
