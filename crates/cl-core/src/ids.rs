//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` so map
//! providers can mint them directly from their own numbering.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Identifier of a road in the map provider's numbering.
    pub struct RoadId(u32);
}

typed_id! {
    /// Lane identifier within a road.  Signed, following the OpenDRIVE
    /// convention where the sign encodes the side of the reference line.
    pub struct LaneId(i32);
}

typed_id! {
    /// Unique identifier of a position.  Two positions with the same id are
    /// the same location on the map.
    pub struct PositionId(u64);
}

/// Combined road + lane key used to group positions on the same lane.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadLaneKey {
    pub road: RoadId,
    pub lane: LaneId,
}

impl RoadLaneKey {
    #[inline]
    pub fn new(road: RoadId, lane: LaneId) -> Self {
        Self { road, lane }
    }
}

impl fmt::Display for RoadLaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.road.0, self.lane.0)
    }
}
