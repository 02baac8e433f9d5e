//! `cl-core` — foundational types for the conformal lattice workspace.
//!
//! This crate is a dependency of every other `cl-*` crate.  It intentionally
//! has no `cl-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `RoadId`, `LaneId`, `PositionId`, `RoadLaneKey`       |
//! | [`geo`]         | `Transform` (x, y, z, yaw), planar distance           |
//! | [`position`]    | `Position`, the `PositionSource` provider contract    |
//! | [`config`]      | `LatticeConfig`, `RouteConfig`                        |
//! | [`error`]       | `ClError`, `ClResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod position;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{LatticeConfig, RouteConfig};
pub use error::{ClError, ClResult};
pub use geo::Transform;
pub use ids::{LaneId, PositionId, RoadId, RoadLaneKey};
pub use position::{Position, PositionSource};
