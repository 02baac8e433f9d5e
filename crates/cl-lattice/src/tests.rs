//! Unit tests for cl-lattice.
//!
//! Every lattice is built over a small hand-crafted `LaneMap`.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use cl_core::{LaneId, Position, RoadId, Transform};
    use cl_spatial::{LaneMap, LaneMapBuilder, LoopRouter};

    use crate::Lattice;

    pub const L1: LaneId = LaneId(-1);
    pub const L2: LaneId = LaneId(-2);

    pub type MapLattice = Lattice<LaneMap, LoopRouter>;

    /// Road 1, 200 m along +x, carrying `lanes` left to right.
    pub fn straight_road(lanes: &[LaneId]) -> Arc<LaneMap> {
        let mut b = LaneMapBuilder::new();
        b.add_road(RoadId(1), 200.0, Transform::default(), lanes.iter().copied());
        Arc::new(b.build().unwrap())
    }

    /// ```text
    ///   47 (100 m) ──► 558 (20 m) ──► 48 (100 m) ──► 47 …
    ///        └───────► 999 (30 m) ──► 48
    /// ```
    ///
    /// The 999 branch is declared first and only carries lane -1.
    pub fn branching_map() -> Arc<LaneMap> {
        let mut b = LaneMapBuilder::new();
        b.add_road(RoadId(47), 100.0, Transform::new(0.0, 0.0, 0.0, 0.0), [L1, L2]);
        b.add_road(RoadId(558), 20.0, Transform::new(100.0, 0.0, 0.0, 0.0), [L1, L2]);
        b.add_road(RoadId(48), 100.0, Transform::new(120.0, 0.0, 0.0, 0.0), [L1, L2]);
        b.add_road(RoadId(999), 30.0, Transform::new(100.0, 0.0, 0.0, -0.5), [L1]);
        b.connect_roads(RoadId(47), RoadId(999));
        b.connect_roads(RoadId(47), RoadId(558));
        b.connect_roads(RoadId(558), RoadId(48));
        b.connect_roads(RoadId(48), RoadId(47));
        b.connect((RoadId(999), L1), (RoadId(48), L1));
        Arc::new(b.build().unwrap())
    }

    pub fn road1_router() -> Arc<LoopRouter> {
        Arc::new(LoopRouter::new(vec![RoadId(1)]).unwrap())
    }

    pub fn loop_router() -> Arc<LoopRouter> {
        Arc::new(LoopRouter::new(vec![RoadId(47), RoadId(558), RoadId(48)]).unwrap())
    }

    pub fn at(map: &LaneMap, road: u32, lane: LaneId, s: f64) -> Position {
        map.position(RoadId(road), lane, s).unwrap()
    }

    /// 100 m at 1 m on the straight road, starting at s = 0 on `lanes[0]`.
    pub fn straight_lattice(lanes: &[LaneId]) -> (Arc<LaneMap>, MapLattice) {
        let map = straight_road(lanes);
        let start = at(&map, 1, lanes[0], 0.0);
        let lattice = Lattice::new(start, 100.0, 1.0, Arc::clone(&map), road1_router()).unwrap();
        (map, lattice)
    }

    pub fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }
}

// ── Nodes & links ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod node {
    use cl_core::{Position, PositionId, RoadId, Transform};

    use crate::{Direction, LatticeNode, Links};

    use super::helpers::L1;

    fn position(id: u64) -> Position {
        Position { id: PositionId(id), road: RoadId(1), lane: L1, s: 0.0, transform: Transform::default() }
    }

    #[test]
    fn opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.is_lateral(), dir.opposite().is_lateral());
        }
    }

    #[test]
    fn links_iterate_populated_only() {
        let mut links = Links::default();
        assert_eq!(links.iter().count(), 0);
        *links.slot(Direction::Left) = Some(PositionId(7));
        *links.slot(Direction::Front) = Some(PositionId(3));
        let got: Vec<_> = links.iter().collect();
        assert_eq!(got, vec![(Direction::Front, PositionId(3)), (Direction::Left, PositionId(7))]);
        assert_eq!(links.get(Direction::Back), None);
    }

    #[test]
    fn new_node_is_unlinked() {
        let n = LatticeNode::new(position(5), 12.5);
        assert_eq!(n.id(), PositionId(5));
        assert_eq!(n.distance(), 12.5);
        assert!(n.links().iter().next().is_none());
        assert!(n.front().is_none() && n.back().is_none());
        assert!(n.left().is_none() && n.right().is_none());
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use std::sync::Arc;

    use cl_core::{LatticeConfig, RoadId};
    use cl_spatial::SpatialError;

    use crate::{Lattice, LatticeError};

    use super::helpers::*;

    #[test]
    fn single_lane_straight_road() {
        let map = straight_road(&[L1]);
        let start = at(&map, 1, L1, 0.0);
        let lattice = Lattice::new(start, 100.0, 1.0, Arc::clone(&map), road1_router()).unwrap();

        assert_eq!(lattice.len(), 101);
        assert_eq!(lattice.positions_on(RoadId(1), L1).len(), 101);
        assert_eq!(lattice.entry().id(), start.id);
        assert_eq!(lattice.entry().distance(), 0.0);
        assert!(approx(lattice.exit().distance(), 100.0));
        assert!(approx(lattice.range(), 100.0));
        assert!(lattice.is_consistent());

        let mid = lattice.front(&start, 50.0).unwrap();
        assert!(approx(mid.distance(), 50.0));
        assert!(approx(mid.position().s, 50.0));
    }

    #[test]
    fn distances_match_arc_length_on_straight_road() {
        let (_, lattice) = straight_lattice(&[L1]);
        for node in lattice.nodes() {
            assert!(approx(node.distance(), node.position().s));
        }
    }

    #[test]
    fn front_back_links_are_mutual() {
        let (_, lattice) = straight_lattice(&[L1, L2]);
        for node in lattice.nodes() {
            if let Some(f) = node.front() {
                assert_eq!(lattice.node(f).unwrap().back(), Some(node.id()));
            }
            if let Some(r) = node.right() {
                assert_eq!(lattice.node(r).unwrap().left(), Some(node.id()));
            }
        }
    }

    #[test]
    fn lanes_are_stitched_laterally() {
        let (_, lattice) = straight_lattice(&[L1, L2]);
        assert_eq!(lattice.len(), 202);
        assert_eq!(lattice.positions_on(RoadId(1), L2).len(), 101);

        for node in lattice.nodes() {
            match node.position().lane {
                l if l == L1 => {
                    assert!(node.left().is_none());
                    let right = lattice.node(node.right().unwrap()).unwrap();
                    assert!(approx(right.distance(), node.distance()));
                    assert!(approx(right.position().s, node.position().s));
                }
                _ => {
                    assert!(node.right().is_none());
                    assert!(node.left().is_some());
                }
            }
        }
    }

    #[test]
    fn ends_short_at_dead_end() {
        let map = straight_road(&[L1]);
        let start = at(&map, 1, L1, 150.0);
        let lattice = Lattice::new(start, 100.0, 1.0, map, road1_router()).unwrap();
        assert_eq!(lattice.len(), 51);
        assert!(approx(lattice.range(), 50.0));
        assert!(approx(lattice.exit().position().s, 200.0));
    }

    #[test]
    fn lane_drop_trims_lanes_beyond_exit() {
        use cl_core::Transform;
        use cl_spatial::{LaneMapBuilder, LoopRouter};

        // Lane -1 ends with road 1; lane -2 carries on along road 2.
        let mut b = LaneMapBuilder::new();
        b.add_road(RoadId(1), 50.0, Transform::default(), [L1, L2]);
        b.add_road(RoadId(2), 100.0, Transform::new(50.0, 0.0, 0.0, 0.0), [L2]);
        b.connect((RoadId(1), L2), (RoadId(2), L2));
        let map = Arc::new(b.build().unwrap());
        let router = Arc::new(LoopRouter::new(vec![RoadId(1), RoadId(2)]).unwrap());

        let start = at(&map, 1, L1, 0.0);
        let mut lattice = Lattice::new(start, 100.0, 1.0, Arc::clone(&map), router).unwrap();
        assert!(approx(lattice.range(), 50.0));
        assert_eq!(lattice.len(), 2 * 51);
        assert!(lattice.positions_on(RoadId(2), L2).is_empty());
        assert!(lattice.nodes().all(|n| n.distance() <= lattice.exit().distance() + 1e-6));
        assert!(lattice.is_consistent());

        lattice.extend(150.0).unwrap();
        assert_eq!(lattice.len(), 2 * 51);
        assert!(lattice.positions_on(RoadId(2), L2).is_empty());
        assert!(lattice.is_consistent());
    }

    #[test]
    fn fractional_resolution() {
        let map = straight_road(&[L1]);
        let start = at(&map, 1, L1, 0.0);
        let lattice = Lattice::new(start, 10.0, 2.5, map, road1_router()).unwrap();
        assert_eq!(lattice.len(), 5);
        assert!(approx(lattice.range(), 10.0));
    }

    #[test]
    fn follows_route_through_junction() {
        let map = branching_map();
        let start = at(&map, 47, L1, 90.0);
        let lattice = Lattice::new(start, 40.0, 1.0, Arc::clone(&map), loop_router()).unwrap();

        assert!(lattice.positions_on(RoadId(999), L1).is_empty());
        assert_eq!(lattice.positions_on(RoadId(558), L1).len(), 20);

        let on_558 = lattice.front(&start, 15.0).unwrap();
        assert_eq!(on_558.position().road, RoadId(558));
        assert!(approx(on_558.position().s, 5.0));

        let on_48 = lattice.front(&start, 35.0).unwrap();
        assert_eq!(on_48.position().road, RoadId(48));
        assert!(approx(on_48.position().s, 5.0));
        assert!(lattice.is_consistent());
    }

    #[test]
    fn loop_longer_than_route_terminates() {
        let map = branching_map();
        let start = at(&map, 47, L1, 0.0);
        let lattice = Lattice::new(start, 500.0, 1.0, map, loop_router()).unwrap();

        // 47: s 0..=100, 558: s 1..=20, 48: s 1..=100, on both lanes.
        assert_eq!(lattice.len(), 2 * (101 + 20 + 100));
        assert!(approx(lattice.range(), 220.0));
        assert_eq!(lattice.exit().position().road, RoadId(48));
        assert!(lattice.nodes().all(|n| n.distance() <= 220.0 + 1e-6));
        assert!(lattice.is_consistent());
    }

    #[test]
    fn invalid_arguments_rejected() {
        let map = straight_road(&[L1]);
        let start = at(&map, 1, L1, 0.0);
        for (range, resolution) in [(0.0, 1.0), (-5.0, 1.0), (100.0, 0.0), (100.0, -1.0), (f64::NAN, 1.0)] {
            let r = Lattice::new(start, range, resolution, Arc::clone(&map), road1_router());
            assert!(matches!(r, Err(LatticeError::InvalidArgument(_))), "{range} / {resolution}");
        }
    }

    #[test]
    fn off_route_road_is_reported() {
        let map = branching_map();
        let start = at(&map, 47, L1, 95.0);
        let router = Arc::new(cl_spatial::LoopRouter::new(vec![RoadId(558), RoadId(48)]).unwrap());
        let err = Lattice::new(start, 20.0, 1.0, map, router).err().unwrap();
        assert!(matches!(
            err,
            LatticeError::Routing(SpatialError::NotOnRoute(RoadId(47)))
        ));
    }

    #[test]
    fn from_config_uses_tolerance() {
        let map = straight_road(&[L1]);
        let start = at(&map, 1, L1, 0.0);
        let config = LatticeConfig { range: 30.0, resolution: 1.0, query_tolerance: Some(0.25) };
        let lattice = Lattice::from_config(start, &config, Arc::clone(&map), road1_router()).unwrap();
        assert_eq!(lattice.len(), 31);
        assert_eq!(lattice.tolerance(), 0.25);

        assert!(lattice.front(&at(&map, 1, L1, 10.2), 0.0).is_some());
        assert!(lattice.front(&at(&map, 1, L1, 10.4), 0.0).is_none());
    }

    #[test]
    fn from_config_rejects_bad_config() {
        let map = straight_road(&[L1]);
        let start = at(&map, 1, L1, 0.0);
        let config = LatticeConfig { resolution: 0.0, ..LatticeConfig::default() };
        let r = Lattice::from_config(start, &config, map, road1_router());
        assert!(matches!(r, Err(LatticeError::Config(_))));
    }

    #[test]
    fn lattice_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MapLattice>();
    }
}

// ── Pluggable route policy ────────────────────────────────────────────────────

#[cfg(test)]
mod oracle {
    use std::sync::Arc;

    use cl_core::{Position, PositionSource, RoadId};
    use cl_spatial::{LaneMap, RouteOracle, SpatialError, SpatialResult};

    use crate::Lattice;

    use super::helpers::*;

    /// Always takes the first continuation the map offers.
    struct FirstContinuation;

    impl RouteOracle for FirstContinuation {
        fn position_on_route(&self, source: &dyn PositionSource, candidate: &Position) -> Option<Position> {
            source.next_positions(candidate, 0.01).into_iter().next()
        }

        fn next_road(&self, road: RoadId) -> SpatialResult<RoadId> {
            Err(SpatialError::NotOnRoute(road))
        }

        fn prev_road(&self, road: RoadId) -> SpatialResult<RoadId> {
            Err(SpatialError::NotOnRoute(road))
        }

        fn front_position(
            &self,
            source:   &dyn PositionSource,
            position: &Position,
            distance: f64,
        ) -> SpatialResult<Option<Position>> {
            Ok(source.next_positions(position, distance).into_iter().next())
        }
    }

    #[test]
    fn dyn_router_injection() {
        let map = branching_map();
        let start = at(&map, 47, L1, 90.0);
        let router: Arc<dyn RouteOracle> = loop_router();
        let lattice: Lattice<LaneMap, dyn RouteOracle> =
            Lattice::new(start, 40.0, 1.0, map, router).unwrap();
        assert_eq!(lattice.front(&start, 15.0).unwrap().position().road, RoadId(558));
    }

    #[test]
    fn alternate_policy_takes_other_branch() {
        let map = branching_map();
        let start = at(&map, 47, L1, 90.0);
        let lattice = Lattice::new(start, 40.0, 1.0, Arc::clone(&map), Arc::new(FirstContinuation)).unwrap();

        let branch = lattice.front(&start, 15.0).unwrap();
        assert_eq!(branch.position().road, RoadId(999));
        assert!(approx(branch.position().s, 5.0));
        // 999 has no lane -2, so that lane's only continuation is 558.
        assert!(!lattice.positions_on(RoadId(558), L2).is_empty());
        assert!(lattice.is_consistent());
    }

    #[test]
    fn dyn_source_injection() {
        let map = straight_road(&[L1]);
        let start = at(&map, 1, L1, 0.0);
        let source: Arc<dyn PositionSource> = map;
        let lattice: Lattice<dyn PositionSource, _> =
            Lattice::new(start, 10.0, 1.0, source, road1_router()).unwrap();
        assert_eq!(lattice.len(), 11);
    }
}

// ── Resizing ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod resize {
    use cl_core::RoadId;

    use crate::LatticeError;

    use super::helpers::*;

    #[test]
    fn shorten_trims_far_end() {
        let (_, mut lattice) = straight_lattice(&[L1]);
        lattice.shorten(40.0).unwrap();
        assert_eq!(lattice.len(), 41);
        assert!(approx(lattice.range(), 40.0));
        assert!(lattice.exit().front().is_none());
        assert!(lattice.nodes().all(|n| n.distance() <= 40.0 + 1e-6));
        assert!(lattice.is_consistent());
    }

    #[test]
    fn shorten_severs_lateral_links() {
        let (_, mut lattice) = straight_lattice(&[L1, L2]);
        lattice.shorten(40.5).unwrap();
        assert_eq!(lattice.len(), 82);
        assert_eq!(lattice.positions_on(RoadId(1), L2).len(), 41);
        assert!(lattice.is_consistent());
    }

    #[test]
    fn shorten_noop_and_errors() {
        let (_, mut lattice) = straight_lattice(&[L1]);
        lattice.shorten(150.0).unwrap();
        assert_eq!(lattice.len(), 101);
        assert!(matches!(lattice.shorten(-1.0), Err(LatticeError::InvalidArgument(_))));
        lattice.shorten(0.0).unwrap();
        assert_eq!(lattice.len(), 1);
        assert_eq!(lattice.entry().id(), lattice.exit().id());
    }

    #[test]
    fn extend_grows_far_end() {
        let (_, mut lattice) = straight_lattice(&[L1, L2]);
        lattice.shorten(50.0).unwrap();
        lattice.extend(120.0).unwrap();
        assert_eq!(lattice.len(), 2 * 121);
        assert!(approx(lattice.range(), 120.0));
        assert!(lattice.is_consistent());
    }

    #[test]
    fn extend_noop_when_not_larger() {
        let (_, mut lattice) = straight_lattice(&[L1]);
        lattice.extend(80.0).unwrap();
        lattice.extend(100.0).unwrap();
        assert_eq!(lattice.len(), 101);
    }

    #[test]
    fn extend_stops_at_dead_end() {
        let (_, mut lattice) = straight_lattice(&[L1]);
        lattice.extend(1_000.0).unwrap();
        assert_eq!(lattice.len(), 201);
        assert!(approx(lattice.exit().position().s, 200.0));
    }

    #[test]
    fn shift_slides_window() {
        let (map, mut lattice) = straight_lattice(&[L1, L2]);
        lattice.shift(30.0).unwrap();

        assert_eq!(lattice.entry().id(), at(&map, 1, L1, 30.0).id);
        assert_eq!(lattice.entry().distance(), 0.0);
        assert!(approx(lattice.range(), 100.0));
        assert!(approx(lattice.exit().position().s, 130.0));
        assert_eq!(lattice.len(), 202);
        assert!(lattice.entry().back().is_none());
        assert!(lattice.nodes().all(|n| n.distance() >= -1e-6));
        assert!(!lattice.contains(at(&map, 1, L2, 29.0).id));
        assert!(lattice.is_consistent());
    }

    #[test]
    fn shift_snaps_to_resolution() {
        let (map, mut lattice) = straight_lattice(&[L1]);
        lattice.shift(2.5).unwrap();
        assert_eq!(lattice.entry().id(), at(&map, 1, L1, 2.0).id);

        // Less than one resolution step moves nothing.
        lattice.shift(0.5).unwrap();
        assert_eq!(lattice.entry().id(), at(&map, 1, L1, 2.0).id);
        lattice.shift(0.0).unwrap();
        assert!(matches!(lattice.shift(-1.0), Err(LatticeError::InvalidArgument(_))));
    }

    #[test]
    fn shift_near_dead_end_loses_range() {
        let (map, mut lattice) = straight_lattice(&[L1]);
        lattice.shift(150.0).unwrap();
        assert_eq!(lattice.entry().id(), at(&map, 1, L1, 150.0).id);
        assert!(approx(lattice.range(), 50.0));
        assert!(lattice.is_consistent());
    }

    #[test]
    fn repeated_shift_across_junction() {
        let map = branching_map();
        let start = at(&map, 47, L1, 0.0);
        let mut lattice =
            crate::Lattice::new(start, 50.0, 1.0, std::sync::Arc::clone(&map), loop_router()).unwrap();
        for _ in 0..10 {
            lattice.shift(10.0).unwrap();
            assert!(approx(lattice.range(), 50.0));
            assert_eq!(lattice.entry().distance(), 0.0);
            assert!(lattice.is_consistent());
        }
        // 558 at s = 0 is never sampled; 47's end is.
        assert_eq!(lattice.entry().position().road, RoadId(47));
        assert!(approx(lattice.entry().position().s, 100.0));
        lattice.shift(25.0).unwrap();
        assert_eq!(lattice.entry().position().road, RoadId(48));
        assert!(approx(lattice.entry().position().s, 5.0));
    }

    #[test]
    fn shift_on_short_loop_keeps_window() {
        let map = branching_map();
        let start = at(&map, 47, L1, 0.0);
        let mut lattice =
            crate::Lattice::new(start, 300.0, 1.0, std::sync::Arc::clone(&map), loop_router()).unwrap();
        assert!(approx(lattice.range(), 220.0));

        // Once 47 at s = 0 (off the cycle) is dropped, the window spans the
        // whole 220-node cycle: distances 0 to 219.
        for step in 1..=5 {
            lattice.shift(10.0).unwrap();
            assert!(approx(lattice.range(), 219.0), "step {step}: {}", lattice.range());
            assert_eq!(lattice.len(), 2 * 220);
            assert_eq!(lattice.entry().distance(), 0.0);
            assert!(lattice.nodes().all(|n| n.distance() <= 219.0 + 1e-6));
            assert!(lattice.is_consistent());
        }
        assert_eq!(lattice.entry().id(), at(&map, 47, L1, 50.0).id);
    }

    #[test]
    fn clone_is_deep() {
        let (_, lattice) = straight_lattice(&[L1]);
        let mut copy = lattice.clone();
        copy.shorten(10.0).unwrap();
        copy.shift(5.0).unwrap();
        assert_eq!(lattice.len(), 101);
        assert!(approx(lattice.range(), 100.0));
        assert_eq!(copy.len(), 11);
        assert!(lattice.is_consistent() && copy.is_consistent());
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use cl_core::PositionId;

    use super::helpers::*;

    #[test]
    fn closest_node_exact_and_tolerance() {
        let (map, lattice) = straight_lattice(&[L1]);

        let exact = at(&map, 1, L1, 42.0);
        assert_eq!(lattice.closest_node(&exact, 0.0).unwrap().id(), exact.id);

        let off = at(&map, 1, L1, 42.4);
        assert_eq!(lattice.closest_node(&off, 1.0).unwrap().id(), exact.id);
        assert!(lattice.closest_node(&off, 0.3).is_none());

        let beyond = at(&map, 1, L1, 150.0);
        assert!(lattice.closest_node(&beyond, 1.0).is_none());
    }

    #[test]
    fn closest_node_stays_on_road_lane() {
        let (map, lattice) = straight_lattice(&[L1, L2]);
        let q = at(&map, 1, L2, 5.3);
        let snapped = lattice.closest_node(&q, 1.0).unwrap();
        assert_eq!(snapped.position().road_lane(), q.road_lane());
        assert!(approx(snapped.position().s, 5.0));

        let elsewhere = cl_core::Position { road: cl_core::RoadId(2), id: PositionId(1), ..q };
        assert!(lattice.closest_node(&elsewhere, 10.0).is_none());
    }

    #[test]
    fn front_and_back_walk() {
        let (map, lattice) = straight_lattice(&[L1]);
        let q = at(&map, 1, L1, 20.0);

        assert!(approx(lattice.front(&q, 30.0).unwrap().distance(), 50.0));
        assert!(approx(lattice.back(&q, 15.0).unwrap().distance(), 5.0));
        assert_eq!(lattice.front(&q, 0.0).unwrap().id(), q.id);
        assert!(lattice.front(&q, 80.0).is_some());
        assert!(lattice.front(&q, 81.0).is_none());
        assert!(lattice.back(&q, 21.0).is_none());
    }

    #[test]
    fn negative_range_reverses() {
        let (map, lattice) = straight_lattice(&[L1]);
        let q = at(&map, 1, L1, 20.0);
        let id = |n: Option<&crate::LatticeNode>| n.map(|n| n.id());
        assert_eq!(id(lattice.front(&q, -7.0)), id(lattice.back(&q, 7.0)));
        assert_eq!(id(lattice.back(&q, -7.0)), id(lattice.front(&q, 7.0)));
    }

    #[test]
    fn walk_picks_nearest_with_ties_toward_start() {
        let (map, lattice) = straight_lattice(&[L1]);
        let q = at(&map, 1, L1, 10.0);
        assert!(approx(lattice.front(&q, 4.4).unwrap().distance(), 14.0));
        assert!(approx(lattice.front(&q, 4.6).unwrap().distance(), 15.0));
        assert!(approx(lattice.front(&q, 4.5).unwrap().distance(), 14.0));
        assert!(approx(lattice.back(&q, 4.5).unwrap().distance(), 6.0));
        assert!(lattice.front(&q, 90.4).is_none());
    }

    #[test]
    fn lateral_queries() {
        let (map, lattice) = straight_lattice(&[L1, L2]);
        let left = at(&map, 1, L1, 20.0);
        let right = at(&map, 1, L2, 20.0);

        let n = lattice.right_front(&left, 10.0).unwrap();
        assert_eq!(n.id(), at(&map, 1, L2, 30.0).id);
        assert_eq!(lattice.front_right(&left, 10.0).unwrap().id(), n.id());

        let n = lattice.left_back(&right, 10.0).unwrap();
        assert_eq!(n.id(), at(&map, 1, L1, 10.0).id);
        assert_eq!(lattice.back_left(&right, 10.0).unwrap().id(), n.id());

        assert!(lattice.left_front(&left, 10.0).is_none());
        assert!(lattice.front_left(&left, 10.0).is_none());
        assert!(lattice.right_back(&right, 10.0).is_none());
        assert!(lattice.back_right(&right, 10.0).is_none());
        assert!(lattice.right_front(&left, 200.0).is_none());
    }

    #[test]
    fn paired_queries_agree_randomized() {
        let map = branching_map();
        let start = at(&map, 47, L1, 60.0);
        let lattice =
            crate::Lattice::new(start, 100.0, 1.0, std::sync::Arc::clone(&map), loop_router()).unwrap();

        let mut nodes: Vec<_> = lattice.nodes().map(|n| *n.position()).collect();
        nodes.sort_by_key(|p| p.id);

        let id = |n: Option<&crate::LatticeNode>| -> Option<PositionId> { n.map(|n| n.id()) };
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut defined = 0;
        for _ in 0..500 {
            let q = nodes[rng.gen_range(0..nodes.len())];
            let r: f64 = rng.gen_range(-30.0..30.0);

            let lf = id(lattice.left_front(&q, r));
            assert_eq!(lf, id(lattice.front_left(&q, r)));
            assert_eq!(id(lattice.left_back(&q, r)), id(lattice.back_left(&q, r)));
            assert_eq!(id(lattice.right_front(&q, r)), id(lattice.front_right(&q, r)));
            assert_eq!(id(lattice.right_back(&q, r)), id(lattice.back_right(&q, r)));
            defined += usize::from(lf.is_some());
        }
        assert!(defined > 0);
    }
}
