//! `cl-lattice` — a bounded, road-conformal graph of map positions.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`node`]    | `LatticeNode`, `Links`, `Direction`                               |
//! | `tables`    | position-id and road-lane lookup tables (private)                 |
//! | [`lattice`] | `Lattice<S, R>`: construction, `extend`, `shorten`, `shift`      |
//! | `query`     | `closest_node` and the ten directional neighbor queries           |
//! | [`error`]   | `LatticeError`, `LatticeResult<T>`                                |
//!
//! # Lattice model
//!
//! A lattice samples the road network ahead of an entry position:
//!
//! 1. Nodes on the same lane are `resolution` metres apart and linked
//!    front/back.  Forward continuations come from a pluggable
//!    [`RouteOracle`][cl_spatial::RouteOracle], so junctions follow the route.
//! 2. Nodes at the same arc length on adjacent lanes are linked left/right.
//!    Lateral positions come from the
//!    [`PositionSource`][cl_core::PositionSource].
//! 3. Every node carries its lattice distance, the arc length from the entry.
//!    The entry is always at 0 and the exit is the farthest node on the
//!    entry's front walk.
//!
//! Queries never touch the map; they only follow links.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                        |
//! |-----------|---------------------------------------------------------------|
//! | `fx-hash` | Use `rustc-hash` for the lookup tables instead of SipHash.     |
//! | `serde`   | Derives `Serialize`/`Deserialize` on `cl-core` types.          |

pub mod error;
pub mod lattice;
pub mod node;
mod query;
mod tables;

#[cfg(test)]
mod tests;

pub use error::{LatticeError, LatticeResult};
pub use lattice::Lattice;
pub use node::{Direction, LatticeNode, Links};
