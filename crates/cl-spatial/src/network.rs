//! Synthetic lane-level road map and builder.
//!
//! # Geometry
//!
//! Every road is a straight reference line starting at `start` and running
//! `length` metres along `start.yaw`.  Lanes are listed left to right; lane
//! `i` is centred `(i + 0.5) * lane_width` to the right of the reference
//! line.  All lanes of a road drive in the direction of the reference line.
//!
//! # Connectivity
//!
//! Successors are lane-level: `(road, lane) → [(road', lane'), …]`.  A
//! branching junction is simply a lane with more than one successor, which
//! is exactly the ambiguity a [`RouteOracle`](crate::RouteOracle) resolves.
//!
//! # Position ids
//!
//! Ids are derived from `(road, lane, s)` with `s` quantized to millimetres,
//! so walking to the same spot along two different paths yields the same id.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over lane samples maps `(x, y)` to the nearest
//! lane position.  Used to snap a requested start location onto the map.

use std::collections::HashMap;

use log::trace;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use cl_core::{LaneId, Position, PositionId, PositionSource, RoadId, Transform};

use crate::{SpatialError, SpatialResult};

/// 64-bit fractional golden-ratio constant used to mix id components.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Arc-length slack when deciding whether a target lies on the current road.
const END_EPSILON: f64 = 1e-9;

// ── R-tree lane sample ────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[x, y]` point with the
/// lane coordinates it was sampled from.
#[derive(Clone)]
struct LaneSample {
    point: [f64; 2],
    road:  RoadId,
    lane:  LaneId,
    s:     f64,
}

impl RTreeObject for LaneSample {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for LaneSample {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Road ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Road {
    id:         RoadId,
    length:     f64,
    start:      Transform,
    /// Left to right.
    lanes:      Vec<LaneId>,
    successors: HashMap<LaneId, Vec<(RoadId, LaneId)>>,
}

impl Road {
    fn lane_index(&self, lane: LaneId) -> Option<usize> {
        self.lanes.iter().position(|&l| l == lane)
    }
}

// ── LaneMap ───────────────────────────────────────────────────────────────────

/// Lane-level road map implementing [`PositionSource`].
///
/// Do not construct directly; use [`LaneMapBuilder`].
pub struct LaneMap {
    roads:       Vec<Road>,
    road_index:  HashMap<RoadId, usize>,
    lane_width:  f64,
    spatial_idx: RTree<LaneSample>,
}

impl LaneMap {
    // ── Map dimensions ────────────────────────────────────────────────────

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn lane_width(&self) -> f64 {
        self.lane_width
    }

    /// Road ids in insertion order.
    pub fn road_ids(&self) -> impl Iterator<Item = RoadId> + '_ {
        self.roads.iter().map(|r| r.id)
    }

    pub fn road_length(&self, road: RoadId) -> Option<f64> {
        self.road(road).map(|r| r.length)
    }

    /// Lanes of `road`, left to right.
    pub fn lanes(&self, road: RoadId) -> Option<&[LaneId]> {
        self.road(road).map(|r| r.lanes.as_slice())
    }

    /// Lane-level successors of `(road, lane)`.  Empty for dead ends and
    /// unknown lanes.
    pub fn successors(&self, road: RoadId, lane: LaneId) -> &[(RoadId, LaneId)] {
        self.road(road)
            .and_then(|r| r.successors.get(&lane))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ── Position lookup ───────────────────────────────────────────────────

    /// Resolve the position at arc length `s` on `(road, lane)`.
    pub fn position(&self, road: RoadId, lane: LaneId, s: f64) -> SpatialResult<Position> {
        let r = self.road(road).ok_or(SpatialError::UnknownRoad(road))?;
        let idx = r
            .lane_index(lane)
            .ok_or(SpatialError::UnknownLane { road, lane })?;
        if !(0.0..=r.length + END_EPSILON).contains(&s) {
            return Err(SpatialError::OffRoad { road, s });
        }
        Ok(self.make_position(r, idx, s.min(r.length)))
    }

    /// Return the lane position nearest to `(x, y)`.
    ///
    /// Returns `None` only if the map has no roads.
    pub fn snap_to_position(&self, x: f64, y: f64) -> Option<Position> {
        let sample = self.spatial_idx.nearest_neighbor(&[x, y])?;
        let r = self.road(sample.road)?;
        let idx = r.lane_index(sample.lane)?;
        Some(self.make_position(r, idx, sample.s))
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn road(&self, road: RoadId) -> Option<&Road> {
        self.road_index.get(&road).map(|&i| &self.roads[i])
    }

    fn make_position(&self, road: &Road, lane_idx: usize, s: f64) -> Position {
        let lane = road.lanes[lane_idx];
        Position {
            id: position_id(road.id, lane, s),
            road: road.id,
            lane,
            s,
            transform: lane_transform(&road.start, lane_idx, self.lane_width, s),
        }
    }

    /// Walk `distance` metres forward from `s` on `(road, lane)`, fanning
    /// out over every successor whenever a road end is crossed.
    fn advance(&self, road: &Road, lane_idx: usize, s: f64, distance: f64, out: &mut Vec<Position>) {
        let target = s + distance;
        if target <= road.length + END_EPSILON {
            out.push(self.make_position(road, lane_idx, target.min(road.length)));
            return;
        }

        let remaining = target - road.length;
        let lane = road.lanes[lane_idx];
        let Some(succs) = road.successors.get(&lane) else {
            trace!("dead end at road {} lane {}", road.id.0, lane.0);
            return;
        };
        for &(next_road, next_lane) in succs {
            // Connections are validated at build time.
            let Some(next) = self.road(next_road) else { continue };
            let Some(next_idx) = next.lane_index(next_lane) else { continue };
            self.advance(next, next_idx, 0.0, remaining, out);
        }
    }
}

impl PositionSource for LaneMap {
    fn next_positions(&self, position: &Position, distance: f64) -> Vec<Position> {
        let mut out = Vec::new();
        let Some(road) = self.road(position.road) else {
            return out;
        };
        let Some(idx) = road.lane_index(position.lane) else {
            return out;
        };
        self.advance(road, idx, position.s, distance.max(0.0), &mut out);
        out
    }

    fn left_position(&self, position: &Position) -> Option<Position> {
        let road = self.road(position.road)?;
        let idx = road.lane_index(position.lane)?;
        let left = idx.checked_sub(1)?;
        Some(self.make_position(road, left, position.s))
    }

    fn right_position(&self, position: &Position) -> Option<Position> {
        let road = self.road(position.road)?;
        let idx = road.lane_index(position.lane)?;
        if idx + 1 >= road.lanes.len() {
            return None;
        }
        Some(self.make_position(road, idx + 1, position.s))
    }
}

/// Deterministic id for the location `s` on `(road, lane)`.
pub fn position_id(road: RoadId, lane: LaneId, s: f64) -> PositionId {
    let s_mm = (s * 1000.0).round() as i64;
    let mut h = road.0 as u64;
    for part in [lane.0 as i64 as u64, s_mm as u64] {
        h = (h ^ part.wrapping_mul(MIXING_CONSTANT)).rotate_left(29).wrapping_mul(MIXING_CONSTANT);
    }
    PositionId(h)
}

fn lane_transform(start: &Transform, lane_idx: usize, lane_width: f64, s: f64) -> Transform {
    let (fx, fy) = start.forward();
    // Right-pointing normal of the reference line.
    let (rx, ry) = (fy, -fx);
    let offset = (lane_idx as f64 + 0.5) * lane_width;
    Transform::new(
        start.x + fx * s + rx * offset,
        start.y + fy * s + ry * offset,
        start.z,
        start.yaw,
    )
}

// ── LaneMapBuilder ────────────────────────────────────────────────────────────

/// Construct a [`LaneMap`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use cl_core::{LaneId, RoadId, Transform};
/// use cl_spatial::LaneMapBuilder;
///
/// let mut b = LaneMapBuilder::new();
/// b.add_road(RoadId(1), 100.0, Transform::default(), [LaneId(-1), LaneId(-2)]);
/// b.add_road(RoadId(2), 50.0, Transform::new(100.0, 0.0, 0.0, 0.0), [LaneId(-1), LaneId(-2)]);
/// b.connect_roads(RoadId(1), RoadId(2));
/// let map = b.build().unwrap();
/// assert_eq!(map.road_count(), 2);
/// ```
pub struct LaneMapBuilder {
    roads:           Vec<Road>,
    connections:     Vec<((RoadId, LaneId), (RoadId, LaneId))>,
    road_links:      Vec<(RoadId, RoadId)>,
    lane_width:      f64,
    sample_spacing:  f64,
}

impl LaneMapBuilder {
    pub fn new() -> Self {
        Self {
            roads:          Vec::new(),
            connections:    Vec::new(),
            road_links:     Vec::new(),
            lane_width:     3.5,
            sample_spacing: 1.0,
        }
    }

    /// Width of every lane in metres.  Default: 3.5.
    pub fn lane_width(&mut self, width: f64) -> &mut Self {
        self.lane_width = width;
        self
    }

    /// Spacing of the samples loaded into the snapping R-tree.  Default: 1.0.
    pub fn sample_spacing(&mut self, spacing: f64) -> &mut Self {
        self.sample_spacing = spacing;
        self
    }

    /// Add a straight road.  `lanes` are listed left to right.
    pub fn add_road(
        &mut self,
        id:     RoadId,
        length: f64,
        start:  Transform,
        lanes:  impl IntoIterator<Item = LaneId>,
    ) -> &mut Self {
        self.roads.push(Road {
            id,
            length,
            start,
            lanes: lanes.into_iter().collect(),
            successors: HashMap::new(),
        });
        self
    }

    /// Add a **directed** lane-level connection.
    pub fn connect(&mut self, from: (RoadId, LaneId), to: (RoadId, LaneId)) -> &mut Self {
        self.connections.push((from, to));
        self
    }

    /// Convenience: connect every lane of `from` to the lane with the same id
    /// on `to`, resolved at build time.
    pub fn connect_roads(&mut self, from: RoadId, to: RoadId) -> &mut Self {
        self.road_links.push((from, to));
        self
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    /// Consume the builder and produce a [`LaneMap`].
    ///
    /// Fails on duplicate road ids, non-positive lengths, roads without
    /// lanes, and connections naming unknown roads or lanes.
    pub fn build(self) -> SpatialResult<LaneMap> {
        if !(self.lane_width > 0.0 && self.sample_spacing > 0.0) {
            return Err(SpatialError::Geometry(
                "lane width and sample spacing must be positive".into(),
            ));
        }

        let mut roads = self.roads;
        let mut road_index = HashMap::with_capacity(roads.len());
        for (i, road) in roads.iter().enumerate() {
            if !(road.length.is_finite() && road.length > 0.0) {
                return Err(SpatialError::Geometry(format!(
                    "road {} has length {}",
                    road.id, road.length
                )));
            }
            if road.lanes.is_empty() {
                return Err(SpatialError::Geometry(format!("road {} has no lanes", road.id)));
            }
            if road_index.insert(road.id, i).is_some() {
                return Err(SpatialError::Geometry(format!("road {} added twice", road.id)));
            }
        }

        // Expand road-level links into lane-level connections.
        let mut connections = self.connections;
        for (from, to) in self.road_links {
            let fi = *road_index.get(&from).ok_or(SpatialError::UnknownRoad(from))?;
            let ti = *road_index.get(&to).ok_or(SpatialError::UnknownRoad(to))?;
            for &lane in &roads[fi].lanes {
                if roads[ti].lane_index(lane).is_some() {
                    connections.push(((from, lane), (to, lane)));
                }
            }
        }

        for ((from_road, from_lane), (to_road, to_lane)) in connections {
            let ti = *road_index.get(&to_road).ok_or(SpatialError::UnknownRoad(to_road))?;
            if roads[ti].lane_index(to_lane).is_none() {
                return Err(SpatialError::UnknownLane { road: to_road, lane: to_lane });
            }
            let fi = *road_index.get(&from_road).ok_or(SpatialError::UnknownRoad(from_road))?;
            let from = &mut roads[fi];
            if from.lane_index(from_lane).is_none() {
                return Err(SpatialError::UnknownLane { road: from_road, lane: from_lane });
            }
            let succs = from.successors.entry(from_lane).or_default();
            if !succs.contains(&(to_road, to_lane)) {
                succs.push((to_road, to_lane));
            }
        }

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let mut samples = Vec::new();
        for road in &roads {
            let steps = (road.length / self.sample_spacing).floor() as usize;
            for (lane_idx, &lane) in road.lanes.iter().enumerate() {
                for k in 0..=steps {
                    let s = (k as f64 * self.sample_spacing).min(road.length);
                    let t = lane_transform(&road.start, lane_idx, self.lane_width, s);
                    samples.push(LaneSample { point: [t.x, t.y], road: road.id, lane, s });
                }
            }
        }
        let spatial_idx = RTree::bulk_load(samples);

        Ok(LaneMap {
            roads,
            road_index,
            lane_width: self.lane_width,
            spatial_idx,
        })
    }
}

impl Default for LaneMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
