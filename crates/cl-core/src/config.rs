//! Lattice and route configuration.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature on) and passed to `Lattice::from_config` /
//! `LoopRouter::from_config`.  Both structs validate themselves so a bad
//! file is reported once at load time rather than deep inside construction.

use std::collections::HashSet;

use crate::{ClError, ClResult, RoadId};

// ── LatticeConfig ─────────────────────────────────────────────────────────────

/// Sizing of a lattice.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LatticeConfig {
    /// Requested longitudinal range in metres, measured from the entry.
    pub range: f64,

    /// Spacing between consecutive nodes on the same lane, in metres.
    pub resolution: f64,

    /// Maximum arc-length gap when snapping a query position to a node.
    /// `None` uses `resolution`.
    pub query_tolerance: Option<f64>,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            range:           100.0,
            resolution:      1.0,
            query_tolerance: None,
        }
    }
}

impl LatticeConfig {
    /// Effective snapping tolerance.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.query_tolerance.unwrap_or(self.resolution)
    }

    pub fn validate(&self) -> ClResult<()> {
        if !(self.range.is_finite() && self.range > 0.0) {
            return Err(ClError::Config(format!(
                "lattice range must be positive, got {}",
                self.range
            )));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(ClError::Config(format!(
                "lattice resolution must be positive, got {}",
                self.resolution
            )));
        }
        if let Some(tol) = self.query_tolerance {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(ClError::Config(format!(
                    "query tolerance must be non-negative, got {tol}"
                )));
            }
        }
        Ok(())
    }
}

// ── RouteConfig ───────────────────────────────────────────────────────────────

/// The ordered loop of road ids a router follows.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteConfig {
    /// Roads in driving order.  The last road is followed by the first.
    pub road_sequence: Vec<RoadId>,
}

impl RouteConfig {
    pub fn new(road_sequence: impl IntoIterator<Item = RoadId>) -> Self {
        Self { road_sequence: road_sequence.into_iter().collect() }
    }

    pub fn validate(&self) -> ClResult<()> {
        if self.road_sequence.is_empty() {
            return Err(ClError::Config("route has no roads".into()));
        }
        let mut seen = HashSet::with_capacity(self.road_sequence.len());
        for &road in &self.road_sequence {
            if !seen.insert(road) {
                return Err(ClError::Config(format!(
                    "road {road} appears more than once in the route"
                )));
            }
        }
        Ok(())
    }
}
