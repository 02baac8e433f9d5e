//! `cl-spatial` — lane map, spatial snapping, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `LaneMap` (lane graph + R-tree), `LaneMapBuilder`           |
//! | [`router`]  | `RouteOracle` trait, `LoopRouter`                           |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `cl-core` types.        |

pub mod error;
pub mod network;
pub mod router;


pub use error::{SpatialError, SpatialResult};
pub use network::{LaneMap, LaneMapBuilder, position_id};
pub use router::{LoopRouter, RouteOracle};
