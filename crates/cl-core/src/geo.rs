//! Pose type carried by every position.
//!
//! The lattice itself never reads poses; they exist for callers that render
//! or spawn actors at lattice nodes.  Coordinates are map-frame metres, yaw
//! is in radians, counter-clockwise from +x.

/// A map-frame pose: location plus heading.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub x:   f64,
    pub y:   f64,
    pub z:   f64,
    pub yaw: f64,
}

impl Transform {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self { x, y, z, yaw }
    }

    /// Euclidean distance between the two locations, ignoring heading.
    pub fn distance(&self, other: &Transform) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Unit vector pointing along the heading, in the x-y plane.
    #[inline]
    pub fn forward(&self) -> (f64, f64) {
        (self.yaw.cos(), self.yaw.sin())
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}; yaw {:.3})",
            self.x, self.y, self.z, self.yaw
        )
    }
}
