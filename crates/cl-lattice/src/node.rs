//! Lattice vertices and their four-way links.

use cl_core::{Position, PositionId};

/// One of the four link directions of a lattice node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Front,
    Back,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Front,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    /// The direction that leads back.
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Front => Direction::Back,
            Direction::Back  => Direction::Front,
            Direction::Left  => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    #[inline]
    pub fn is_lateral(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Up to one neighbor per direction, addressed by position id.
///
/// Links are plain ids into the lattice's node table, so removing a node is
/// a table edit rather than a pointer-graph teardown.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Links {
    pub front: Option<PositionId>,
    pub back:  Option<PositionId>,
    pub left:  Option<PositionId>,
    pub right: Option<PositionId>,
}

impl Links {
    #[inline]
    pub fn get(&self, dir: Direction) -> Option<PositionId> {
        match dir {
            Direction::Front => self.front,
            Direction::Back  => self.back,
            Direction::Left  => self.left,
            Direction::Right => self.right,
        }
    }

    #[inline]
    pub fn slot(&mut self, dir: Direction) -> &mut Option<PositionId> {
        match dir {
            Direction::Front => &mut self.front,
            Direction::Back  => &mut self.back,
            Direction::Left  => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    /// Iterator over the populated links.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, PositionId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.get(dir).map(|id| (dir, id)))
    }
}

/// A lattice vertex: one map position, its lattice distance, and its links.
///
/// `distance` is the arc length from the lattice entry, which is not the
/// same thing as `position.s` (the offset within the position's own road).
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeNode {
    position: Position,
    distance: f64,
    links:    Links,
}

impl LatticeNode {
    pub fn new(position: Position, distance: f64) -> Self {
        Self { position, distance, links: Links::default() }
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn id(&self) -> PositionId {
        self.position.id
    }

    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[inline]
    pub fn links(&self) -> &Links {
        &self.links
    }

    #[inline]
    pub fn link(&self, dir: Direction) -> Option<PositionId> {
        self.links.get(dir)
    }

    pub fn front(&self) -> Option<PositionId> { self.links.front }
    pub fn back(&self) -> Option<PositionId> { self.links.back }
    pub fn left(&self) -> Option<PositionId> { self.links.left }
    pub fn right(&self) -> Option<PositionId> { self.links.right }

    pub(crate) fn set_distance(&mut self, distance: f64) {
        self.distance = distance;
    }

    pub(crate) fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}
