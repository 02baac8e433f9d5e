//! Lattice construction and windowed resizing.
//!
//! # Growth
//!
//! Growth is a breadth-first expansion.  Every queued node tries three
//! links:
//!
//! 1. **front**: ask the [`RouteOracle`] for the on-route position one
//!    `resolution` ahead, as long as that stays within the requested range;
//! 2. **left** / **right**: ask the [`PositionSource`] for the adjacent
//!    lane at the same arc length.
//!
//! A position whose id is already in the lattice is linked rather than
//! duplicated, which is what stitches neighbouring lanes into a grid.  New
//! nodes join the queue.
//!
//! # Window
//!
//! `entry` always has distance 0 and `exit` is the end of the front-link walk
//! from `entry`.  `extend` grows the far end, `shorten` trims it, and `shift`
//! grows the far end then trims the near end so the window slides forward.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, trace, warn};

use cl_core::{LatticeConfig, Position, PositionId, PositionSource, RoadId, LaneId, RoadLaneKey};
use cl_spatial::RouteOracle;

use crate::node::{Direction, LatticeNode};
use crate::tables::{NodeTables, Set};
use crate::{LatticeError, LatticeResult};

/// Slack used whenever two lattice distances are compared.
pub(crate) const DISTANCE_EPSILON: f64 = 1e-6;

/// Road-conformal lattice of map positions.
///
/// # Type parameters
///
/// - `S: PositionSource`: the map provider (e.g. [`cl_spatial::LaneMap`]),
///   possibly unsized as well.
/// - `R: RouteOracle`: the route policy (e.g. [`cl_spatial::LoopRouter`]),
///   possibly unsized so `Arc<dyn RouteOracle>` can be injected.
///
/// # Cloning
///
/// Nodes live in an arena of values, so `clone()` is a deep copy: mutating
/// one copy never affects the other.  The provider and router stay shared.
pub struct Lattice<S: PositionSource + ?Sized, R: RouteOracle + ?Sized> {
    source:     Arc<S>,
    router:     Arc<R>,
    entry:      PositionId,
    exit:       PositionId,
    resolution: f64,
    tolerance:  f64,
    tables:     NodeTables,
    /// Survivors of a trim that lost a lateral link; re-expanded by the next
    /// `extend`.
    unsettled:  Set<PositionId>,
}

impl<S: PositionSource + ?Sized, R: RouteOracle + ?Sized> Clone for Lattice<S, R> {
    fn clone(&self) -> Self {
        Self {
            source:     Arc::clone(&self.source),
            router:     Arc::clone(&self.router),
            entry:      self.entry,
            exit:       self.exit,
            resolution: self.resolution,
            tolerance:  self.tolerance,
            tables:     self.tables.clone(),
            unsettled:  self.unsettled.clone(),
        }
    }
}

impl<S: PositionSource + ?Sized, R: RouteOracle + ?Sized> Lattice<S, R> {
    /// Build a lattice starting at `start` and covering `range` metres, with
    /// nodes every `resolution` metres.  Query snapping uses `resolution` as
    /// tolerance.
    ///
    /// Running out of road before `range` is not an error; the lattice just
    /// ends short.
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidArgument`] for a non-positive range or
    /// resolution, and [`LatticeError::Routing`] if the router rejects a road
    /// on the way.
    pub fn new(
        start:      Position,
        range:      f64,
        resolution: f64,
        source:     Arc<S>,
        router:     Arc<R>,
    ) -> LatticeResult<Self> {
        Self::build(start, range, resolution, resolution, source, router)
    }

    /// Like [`new`](Self::new), with sizing and tolerance taken from `config`.
    pub fn from_config(
        start:  Position,
        config: &LatticeConfig,
        source: Arc<S>,
        router: Arc<R>,
    ) -> LatticeResult<Self> {
        config.validate()?;
        Self::build(start, config.range, config.resolution, config.tolerance(), source, router)
    }

    fn build(
        start:      Position,
        range:      f64,
        resolution: f64,
        tolerance:  f64,
        source:     Arc<S>,
        router:     Arc<R>,
    ) -> LatticeResult<Self> {
        if !(range.is_finite() && range > 0.0) {
            return Err(LatticeError::InvalidArgument(format!(
                "lattice range must be positive, got {range}"
            )));
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(LatticeError::InvalidArgument(format!(
                "lattice resolution must be positive, got {resolution}"
            )));
        }

        let mut tables = NodeTables::default();
        tables.insert(LatticeNode::new(start, 0.0));

        let mut lattice = Self {
            source,
            router,
            entry: start.id,
            exit: start.id,
            resolution,
            tolerance,
            tables,
            unsettled: Set::default(),
        };

        let created = lattice.expand([start.id], range)?;
        lattice.close_window();

        debug!(
            "built lattice from road {} lane {} s {:.2}: {} nodes, range {:.2} m",
            start.road.0,
            start.lane.0,
            start.s,
            created + 1,
            lattice.range()
        );
        if lattice.range() + resolution <= range + DISTANCE_EPSILON {
            warn!(
                "lattice ended short: requested {range:.2} m, reached {:.2} m",
                lattice.range()
            );
        }
        Ok(lattice)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The origin node, with distance 0.
    pub fn entry(&self) -> &LatticeNode {
        &self.tables[self.entry]
    }

    /// The end of the front-link walk from [`entry`](Self::entry).
    pub fn exit(&self) -> &LatticeNode {
        &self.tables[self.exit]
    }

    /// `exit.distance - entry.distance`.
    pub fn range(&self) -> f64 {
        self.exit().distance() - self.entry().distance()
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Tolerance used to snap query positions onto nodes.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Always `false`: a lattice holds at least its entry.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains(&self, id: PositionId) -> bool {
        self.tables.contains(id)
    }

    pub fn node(&self, id: PositionId) -> Option<&LatticeNode> {
        self.tables.get(id)
    }

    /// All nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &LatticeNode> + '_ {
        self.tables.iter()
    }

    /// Position ids on `(road, lane)` in longitudinal order.
    pub fn positions_on(&self, road: RoadId, lane: LaneId) -> &[PositionId] {
        self.tables.on_lane(RoadLaneKey::new(road, lane))
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn router(&self) -> &Arc<R> {
        &self.router
    }

    /// `true` if both lookup tables agree with the node graph.
    pub fn is_consistent(&self) -> bool {
        self.tables.is_consistent()
            && self.tables.contains(self.entry)
            && self.tables.contains(self.exit)
    }

    // ── Resizing ──────────────────────────────────────────────────────────

    /// Grow the lattice to `range` metres.  No-op if `range` does not exceed
    /// the current range.
    pub fn extend(&mut self, range: f64) -> LatticeResult<()> {
        if !(range > self.range()) {
            return Ok(());
        }

        let mut seeds: Vec<&LatticeNode> = self
            .tables
            .iter()
            .filter(|n| n.front().is_none() || self.unsettled.contains(&n.id()))
            .collect();
        // Deterministic expansion order regardless of hash iteration order.
        seeds.sort_by(|a, b| a.distance().total_cmp(&b.distance()).then(a.id().cmp(&b.id())));
        let seeds: Vec<PositionId> = seeds.into_iter().map(LatticeNode::id).collect();
        self.unsettled.clear();

        let before = self.range();
        let limit = self.entry().distance() + range;
        let created = self.expand(seeds, limit)?;
        self.close_window();

        debug!(
            "extended lattice {:.2} → {:.2} m (requested {range:.2}), {created} new nodes",
            before,
            self.range()
        );
        Ok(())
    }

    /// Trim the far end of the lattice so no node lies beyond `range`
    /// metres.  No-op if `range` is not below the current range.
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidArgument`] if `range` is negative or NaN.
    pub fn shorten(&mut self, range: f64) -> LatticeResult<()> {
        if !(range >= 0.0) {
            return Err(LatticeError::InvalidArgument(format!(
                "lattice range must be non-negative, got {range}"
            )));
        }
        if range >= self.range() {
            return Ok(());
        }

        let limit = self.entry().distance() + range + DISTANCE_EPSILON;
        let doomed: Set<PositionId> = self
            .tables
            .iter()
            .filter(|n| n.distance() > limit)
            .map(LatticeNode::id)
            .collect();
        let removed = self.remove(&doomed);
        self.close_window();

        debug!(
            "shortened lattice to {:.2} m (requested {range:.2}), {removed} nodes removed",
            self.range()
        );
        Ok(())
    }

    /// Slide the lattice `movement` metres forward, keeping its range.
    ///
    /// The far end grows by `movement`, then the node on the entry lane at
    /// the largest distance not exceeding `movement` becomes the new entry.
    /// Every node behind it is removed and all distances are rebased so the
    /// new entry sits at 0.  Unlike `extend` followed by `shorten`, which
    /// would leave the entry in place, this relocates the entry.
    ///
    /// The range only drops below its previous value when the map ends.
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidArgument`] if `movement` is negative or NaN,
    /// plus any routing error raised while extending.
    pub fn shift(&mut self, movement: f64) -> LatticeResult<()> {
        if !(movement >= 0.0 && movement.is_finite()) {
            return Err(LatticeError::InvalidArgument(format!(
                "shift movement must be non-negative, got {movement}"
            )));
        }
        if movement == 0.0 {
            return Ok(());
        }

        let range = self.range();
        self.extend(range + movement)?;

        let base = self.entry().distance();
        let mut origin = self.entry();
        while let Some(next) = self.step(origin, Direction::Front) {
            if next.distance() > base + movement + DISTANCE_EPSILON {
                break;
            }
            origin = next;
        }
        let origin_id = origin.id();
        let origin_distance = origin.distance();
        let offset = origin_distance - base;
        if offset <= DISTANCE_EPSILON {
            trace!("shift by {movement:.2} m found no node ahead of the entry");
            return Ok(());
        }

        let cutoff = origin_distance - DISTANCE_EPSILON;
        let doomed: Set<PositionId> = self
            .tables
            .iter()
            .filter(|n| n.distance() < cutoff)
            .map(LatticeNode::id)
            .collect();
        let removed = self.remove(&doomed);
        self.tables.rebase(origin_distance);
        self.entry = origin_id;
        self.close_window();
        // On a route loop shorter than the window the trim also cut the
        // wrap-around link, so grow back to the original range.
        self.extend(range)?;

        debug!(
            "shifted lattice by {offset:.2} m (requested {movement:.2}), {removed} nodes dropped, range {:.2} m",
            self.range()
        );
        Ok(())
    }

    // ── Growth internals ──────────────────────────────────────────────────

    /// Breadth-first growth from `seeds`, bounded by `limit` (absolute
    /// lattice distance).  Returns the number of nodes created.
    fn expand(
        &mut self,
        seeds: impl IntoIterator<Item = PositionId>,
        limit: f64,
    ) -> LatticeResult<usize> {
        let mut queue: VecDeque<PositionId> = seeds.into_iter().collect();
        let mut created = 0;
        while let Some(id) = queue.pop_front() {
            created += self.extend_front(id, limit, &mut queue)?;
            created += self.extend_lateral(id, Direction::Left, &mut queue);
            created += self.extend_lateral(id, Direction::Right, &mut queue);
        }
        Ok(created)
    }

    fn extend_front(
        &mut self,
        id:    PositionId,
        limit: f64,
        queue: &mut VecDeque<PositionId>,
    ) -> LatticeResult<usize> {
        let Some(node) = self.tables.get(id) else {
            return Ok(0);
        };
        if node.front().is_some() {
            return Ok(0);
        }
        let distance = node.distance() + self.resolution;
        if distance > limit + DISTANCE_EPSILON {
            return Ok(0);
        }

        let position = *node.position();
        let front = self
            .router
            .front_position(&self.source, &position, self.resolution)?;
        match front {
            Some(front) => Ok(self.attach(id, Direction::Front, front, distance, queue)),
            None => {
                trace!(
                    "no front position after road {} lane {} s {:.2}",
                    position.road.0,
                    position.lane.0,
                    position.s
                );
                Ok(0)
            }
        }
    }

    fn extend_lateral(
        &mut self,
        id:    PositionId,
        dir:   Direction,
        queue: &mut VecDeque<PositionId>,
    ) -> usize {
        let Some(node) = self.tables.get(id) else {
            return 0;
        };
        if node.link(dir).is_some() {
            return 0;
        }
        let distance = node.distance();
        let adjacent = match dir {
            Direction::Left => self.source.left_position(node.position()),
            Direction::Right => self.source.right_position(node.position()),
            Direction::Front | Direction::Back => None,
        };
        match adjacent {
            Some(position) => self.attach(id, dir, position, distance, queue),
            None => 0,
        }
    }

    /// Link `from` to `position` in direction `dir`, creating the node at
    /// `distance` if it is new.  Returns 1 if a node was created.
    fn attach(
        &mut self,
        from:     PositionId,
        dir:      Direction,
        position: Position,
        distance: f64,
        queue:    &mut VecDeque<PositionId>,
    ) -> usize {
        let created = self.tables.insert(LatticeNode::new(position, distance));
        self.tables.link(from, dir, position.id);
        if created {
            trace!(
                "node {} at road {} lane {} s {:.2}, distance {distance:.2}",
                position.id.0,
                position.road.0,
                position.lane.0,
                position.s
            );
            queue.push_back(position.id);
            1
        } else {
            0
        }
    }

    // ── Window internals ──────────────────────────────────────────────────

    /// Remove `doomed` from both tables and every link; returns the count.
    fn remove(&mut self, doomed: &Set<PositionId>) -> usize {
        let lost_lateral = self.tables.remove_all(doomed);
        self.unsettled.retain(|id| !doomed.contains(id));
        self.unsettled.extend(lost_lateral);
        doomed.len()
    }

    /// Recompute `exit`, then drop every node lying beyond it.  Only lanes
    /// that outrun the entry lane (e.g. past a lane drop) reach that far.
    fn close_window(&mut self) {
        self.update_exit();
        let limit = self.exit().distance() + DISTANCE_EPSILON;
        let beyond: Set<PositionId> = self
            .tables
            .iter()
            .filter(|n| n.distance() > limit)
            .map(LatticeNode::id)
            .collect();
        if !beyond.is_empty() {
            let removed = self.remove(&beyond);
            trace!("dropped {removed} nodes beyond the exit at {limit:.2} m");
        }
    }

    fn update_exit(&mut self) {
        let mut node = self.entry();
        while let Some(next) = self.step(node, Direction::Front) {
            node = next;
        }
        let exit = node.id();
        self.exit = exit;
    }

    /// Follow one link.  Longitudinal steps must move the lattice distance
    /// the right way, so a route that loops back onto the lattice never
    /// walks in circles.
    pub(crate) fn step(&self, node: &LatticeNode, dir: Direction) -> Option<&LatticeNode> {
        let next = self.tables.get(node.link(dir)?)?;
        match dir {
            Direction::Front if next.distance() <= node.distance() => None,
            Direction::Back if next.distance() >= node.distance() => None,
            _ => Some(next),
        }
    }
}
