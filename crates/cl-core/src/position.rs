//! Map positions and the provider contract the lattice consumes.
//!
//! # Pluggability
//!
//! The lattice and router never talk to a concrete map.  They go through
//! [`PositionSource`], so applications can back them with a simulator
//! client, an OpenDRIVE parser, or the synthetic `LaneMap` in `cl-spatial`
//! without touching the lattice code.

use crate::{LaneId, PositionId, RoadId, RoadLaneKey, Transform};

/// An immutable located point on the road network.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Unique id; equal ids mean the same location.
    pub id: PositionId,
    pub road: RoadId,
    pub lane: LaneId,
    /// Arc-length offset along the road, in metres.
    pub s: f64,
    pub transform: Transform,
}

impl Position {
    #[inline]
    pub fn road_lane(&self) -> RoadLaneKey {
        RoadLaneKey::new(self.road, self.lane)
    }
}

/// Position provider consumed by the router and the lattice.
///
/// Implementations are expected to answer synchronously.  The trait is
/// object-safe so it can be injected as `Arc<dyn PositionSource>`.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a lattice can be moved to (or
/// read from) a planning thread.
pub trait PositionSource: Send + Sync {
    /// Every position exactly `distance` metres ahead of `position`, one per
    /// reachable continuation.  Empty when the road network ends.
    fn next_positions(&self, position: &Position, distance: f64) -> Vec<Position>;

    /// The position at the same arc length on the lane to the left, if any.
    fn left_position(&self, position: &Position) -> Option<Position>;

    /// The position at the same arc length on the lane to the right, if any.
    fn right_position(&self, position: &Position) -> Option<Position>;
}

impl<T: PositionSource + ?Sized> PositionSource for std::sync::Arc<T> {
    fn next_positions(&self, position: &Position, distance: f64) -> Vec<Position> {
        (**self).next_positions(position, distance)
    }

    fn left_position(&self, position: &Position) -> Option<Position> {
        (**self).left_position(position)
    }

    fn right_position(&self, position: &Position) -> Option<Position> {
        (**self).right_position(position)
    }
}
