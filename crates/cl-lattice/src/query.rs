//! Neighbor queries over a built lattice.
//!
//! Every query first snaps its input position onto a node with
//! [`Lattice::closest_node`], then moves over links only.  The map provider
//! is never consulted.
//!
//! # Walking
//!
//! A walk of signed `range` metres follows front links (back links when
//! `range` is negative) toward `distance + range`.  The result is whichever
//! of the two nodes bracketing that target is nearer; on a tie the one
//! closer to the start wins.  A target beyond the last reachable node yields
//! `None`.
//!
//! # Compound queries
//!
//! `left_front` steps left once and then walks; `front_left` walks and then
//! steps left.  On a lattice whose lanes are sampled at the same arc lengths
//! both orders land on the same node.

use cl_core::{Position, PositionSource};
use cl_spatial::RouteOracle;

use crate::lattice::DISTANCE_EPSILON;
use crate::node::{Direction, LatticeNode};
use crate::Lattice;

impl<S: PositionSource + ?Sized, R: RouteOracle + ?Sized> Lattice<S, R> {
    /// The node at `position`, or failing that the node on the same road and
    /// lane whose arc length is nearest, if it is within `tolerance` metres.
    pub fn closest_node(&self, position: &Position, tolerance: f64) -> Option<&LatticeNode> {
        if let Some(node) = self.node(position.id) {
            return Some(node);
        }

        let mut best: Option<(&LatticeNode, f64)> = None;
        for &id in self.positions_on(position.road, position.lane) {
            let Some(node) = self.node(id) else { continue };
            let gap = (node.position().s - position.s).abs();
            if best.is_none_or(|(_, g)| gap < g) {
                best = Some((node, gap));
            }
        }
        best.filter(|&(_, gap)| gap <= tolerance + DISTANCE_EPSILON)
            .map(|(node, _)| node)
    }

    // ── Longitudinal ──────────────────────────────────────────────────────

    /// The node `range` metres ahead of `query` along front links.
    pub fn front(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.walk(self.resolve(query)?, range)
    }

    /// The node `range` metres behind `query` along back links.
    pub fn back(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.walk(self.resolve(query)?, -range)
    }

    // ── Step, then walk ───────────────────────────────────────────────────

    pub fn left_front(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.step_then_walk(query, Direction::Left, range)
    }

    pub fn left_back(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.step_then_walk(query, Direction::Left, -range)
    }

    pub fn right_front(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.step_then_walk(query, Direction::Right, range)
    }

    pub fn right_back(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.step_then_walk(query, Direction::Right, -range)
    }

    // ── Walk, then step ───────────────────────────────────────────────────

    pub fn front_left(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.walk_then_step(query, range, Direction::Left)
    }

    pub fn back_left(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.walk_then_step(query, -range, Direction::Left)
    }

    pub fn front_right(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.walk_then_step(query, range, Direction::Right)
    }

    pub fn back_right(&self, query: &Position, range: f64) -> Option<&LatticeNode> {
        self.walk_then_step(query, -range, Direction::Right)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn resolve(&self, query: &Position) -> Option<&LatticeNode> {
        self.closest_node(query, self.tolerance())
    }

    fn step_then_walk(&self, query: &Position, side: Direction, range: f64) -> Option<&LatticeNode> {
        let node = self.resolve(query)?;
        self.walk(self.step(node, side)?, range)
    }

    fn walk_then_step(&self, query: &Position, range: f64, side: Direction) -> Option<&LatticeNode> {
        let node = self.walk(self.resolve(query)?, range)?;
        self.step(node, side)
    }

    /// Walk `range` metres from `from`; negative walks backwards.
    fn walk<'a>(&'a self, from: &'a LatticeNode, range: f64) -> Option<&'a LatticeNode> {
        if range.is_nan() {
            return None;
        }
        let (dir, sign) = if range >= 0.0 {
            (Direction::Front, 1.0)
        } else {
            (Direction::Back, -1.0)
        };
        // Distances measured along the walk direction, so both cases read as
        // "move forward until reaching `target`".
        let target = sign * (from.distance() + range);

        let mut cur = from;
        loop {
            let here = sign * cur.distance();
            if here >= target - DISTANCE_EPSILON {
                return Some(cur);
            }
            let next = self.step(cur, dir)?;
            let there = sign * next.distance();
            if there > target + DISTANCE_EPSILON {
                return if there - target < target - here { Some(next) } else { Some(cur) };
            }
            cur = next;
        }
    }
}
