//! Spatial-subsystem error type.

use thiserror::Error;

use cl_core::{ClError, LaneId, RoadId};

/// Errors produced by `cl-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("road {0} is not on route")]
    NotOnRoute(RoadId),

    #[error("invalid distance {0} when looking for a front position")]
    InvalidDistance(f64),

    #[error("route has no roads")]
    EmptyRoute,

    #[error("road {0} appears more than once in the route")]
    DuplicateRoad(RoadId),

    #[error("road {0} not found in map")]
    UnknownRoad(RoadId),

    #[error("lane {lane} not found on road {road}")]
    UnknownLane { road: RoadId, lane: LaneId },

    #[error("s = {s} is outside road {road}")]
    OffRoad { road: RoadId, s: f64 },

    #[error("invalid road geometry: {0}")]
    Geometry(String),

    #[error(transparent)]
    Config(#[from] ClError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
