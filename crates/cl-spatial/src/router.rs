//! Route oracle trait and the cyclic loop router.
//!
//! # Pluggability
//!
//! `cl-lattice` asks for forward continuations through the [`RouteOracle`]
//! trait, so applications can swap in non-looping routes or lane-preference
//! policies without touching the lattice.  The default [`LoopRouter`] follows
//! a fixed, cyclic sequence of road ids.
//!
//! # Why a route at all
//!
//! Map providers branch at junctions: a position near a road end has one
//! continuation per outgoing connection.  The router picks the continuation
//! that stays on the intended loop so the lattice always walks one
//! deterministic path.

use std::collections::HashMap;

use log::trace;

use cl_core::{Position, PositionSource, RoadId, RouteConfig};

use crate::{SpatialError, SpatialResult};

/// Look-ahead used to find the immediate successors of a position.
const ON_ROUTE_PROBE_DISTANCE: f64 = 0.01;

// ── RouteOracle trait ─────────────────────────────────────────────────────────

/// Pluggable route policy.
///
/// The position provider is passed into every query rather than stored, the
/// same way a routing engine receives the network it searches.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a lattice holding an
/// `Arc<dyn RouteOracle>` can cross threads.
pub trait RouteOracle: Send + Sync {
    /// Among the immediate successors of `candidate`, the first whose road is
    /// on the route.  `None` if no successor is.
    fn position_on_route(
        &self,
        source:    &dyn PositionSource,
        candidate: &Position,
    ) -> Option<Position>;

    /// The road after `road` on the route.
    fn next_road(&self, road: RoadId) -> SpatialResult<RoadId>;

    /// The road before `road` on the route.
    fn prev_road(&self, road: RoadId) -> SpatialResult<RoadId>;

    fn next_road_of(&self, position: &Position) -> SpatialResult<RoadId> {
        self.next_road(position.road)
    }

    fn prev_road_of(&self, position: &Position) -> SpatialResult<RoadId> {
        self.prev_road(position.road)
    }

    /// The position `distance` metres ahead of `position` that stays on the
    /// route, or `None` if every continuation leaves it.
    ///
    /// A continuation on the same road always wins; otherwise one on
    /// [`next_road`](Self::next_road) is taken, the last listed if there are
    /// several.
    ///
    /// # Errors
    ///
    /// [`SpatialError::InvalidDistance`] if `distance <= 0`, and
    /// [`SpatialError::NotOnRoute`] if the road ends and `position` is not on
    /// the route.
    fn front_position(
        &self,
        source:   &dyn PositionSource,
        position: &Position,
        distance: f64,
    ) -> SpatialResult<Option<Position>>;
}

// ── LoopRouter ────────────────────────────────────────────────────────────────

/// Follows an ordered, cyclic list of road ids.
///
/// The successor of the last road is the first, and the predecessor of the
/// first is the last.  Immutable after construction.
///
/// # Example
///
/// ```
/// use cl_core::RoadId;
/// use cl_spatial::{LoopRouter, RouteOracle};
///
/// let router = LoopRouter::new(vec![RoadId(47), RoadId(558), RoadId(48)]).unwrap();
/// assert_eq!(router.next_road(RoadId(48)).unwrap(), RoadId(47));
/// assert_eq!(router.prev_road(RoadId(47)).unwrap(), RoadId(48));
/// ```
#[derive(Clone, Debug)]
pub struct LoopRouter {
    road_sequence: Vec<RoadId>,
    /// road → index in `road_sequence`.
    road_index:    HashMap<RoadId, usize>,
}

impl LoopRouter {
    /// Build a router over `road_sequence`.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyRoute`] for an empty sequence and
    /// [`SpatialError::DuplicateRoad`] if a road appears twice.
    pub fn new(road_sequence: Vec<RoadId>) -> SpatialResult<Self> {
        if road_sequence.is_empty() {
            return Err(SpatialError::EmptyRoute);
        }
        let mut road_index = HashMap::with_capacity(road_sequence.len());
        for (i, &road) in road_sequence.iter().enumerate() {
            if road_index.insert(road, i).is_some() {
                return Err(SpatialError::DuplicateRoad(road));
            }
        }
        Ok(Self { road_sequence, road_index })
    }

    pub fn from_config(config: &RouteConfig) -> SpatialResult<Self> {
        config.validate()?;
        Self::new(config.road_sequence.clone())
    }

    pub fn road_sequence(&self) -> &[RoadId] {
        &self.road_sequence
    }

    pub fn contains(&self, road: RoadId) -> bool {
        self.road_index.contains_key(&road)
    }

    fn index_of(&self, road: RoadId) -> SpatialResult<usize> {
        self.road_index
            .get(&road)
            .copied()
            .ok_or(SpatialError::NotOnRoute(road))
    }
}

impl RouteOracle for LoopRouter {
    fn position_on_route(
        &self,
        source:    &dyn PositionSource,
        candidate: &Position,
    ) -> Option<Position> {
        source
            .next_positions(candidate, ON_ROUTE_PROBE_DISTANCE)
            .into_iter()
            .find(|p| self.contains(p.road))
    }

    fn next_road(&self, road: RoadId) -> SpatialResult<RoadId> {
        let i = self.index_of(road)?;
        Ok(self.road_sequence[(i + 1) % self.road_sequence.len()])
    }

    fn prev_road(&self, road: RoadId) -> SpatialResult<RoadId> {
        let i = self.index_of(road)?;
        let n = self.road_sequence.len();
        Ok(self.road_sequence[(i + n - 1) % n])
    }

    fn front_position(
        &self,
        source:   &dyn PositionSource,
        position: &Position,
        distance: f64,
    ) -> SpatialResult<Option<Position>> {
        if !(distance > 0.0) {
            return Err(SpatialError::InvalidDistance(distance));
        }

        let candidates = source.next_positions(position, distance);
        if let Some(same_road) = candidates.iter().find(|c| c.road == position.road) {
            return Ok(Some(*same_road));
        }
        if candidates.is_empty() {
            return Ok(None);
        }

        let next_road = self.next_road(position.road)?;
        // A lane splitting onto the next road offers one candidate per
        // target lane; the last one listed wins.
        let found = candidates.into_iter().rev().find(|c| c.road == next_road);
        if found.is_none() {
            trace!(
                "no continuation of road {} onto road {} within {distance} m",
                position.road.0,
                next_road.0
            );
        }
        Ok(found)
    }
}
