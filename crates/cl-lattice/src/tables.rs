//! The two lookup tables behind a lattice.
//!
//! | Table        | Key           | Value                                     |
//! |--------------|---------------|-------------------------------------------|
//! | `nodes`      | `PositionId`  | the `LatticeNode` itself (node arena)     |
//! | `road_lanes` | `RoadLaneKey` | position ids on that lane, insertion order |
//!
//! Every mutation goes through [`NodeTables`] so the two tables never drift
//! apart: a node is in the arena iff its id is listed under its road-lane.

use std::ops::Index;

use cl_core::{PositionId, RoadLaneKey};

use crate::node::{Direction, LatticeNode};

#[cfg(feature = "fx-hash")]
pub(crate) type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "fx-hash")]
pub(crate) type Set<K> = rustc_hash::FxHashSet<K>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type Set<K> = std::collections::HashSet<K>;

#[derive(Clone, Debug, Default)]
pub(crate) struct NodeTables {
    nodes:      Map<PositionId, LatticeNode>,
    road_lanes: Map<RoadLaneKey, Vec<PositionId>>,
}

impl NodeTables {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: PositionId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: PositionId) -> Option<&LatticeNode> {
        self.nodes.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LatticeNode> + '_ {
        self.nodes.values()
    }

    /// Position ids on `key`, in the order they were added.
    pub fn on_lane(&self, key: RoadLaneKey) -> &[PositionId] {
        self.road_lanes.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Register `node` in both tables.  An id already present is left as is.
    pub fn insert(&mut self, node: LatticeNode) -> bool {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.road_lanes
            .entry(node.position().road_lane())
            .or_default()
            .push(id);
        self.nodes.insert(id, node);
        true
    }

    /// Point `from`'s `dir` link at `to`, and `to`'s opposite link back at
    /// `from` unless it already has one.
    pub fn link(&mut self, from: PositionId, dir: Direction, to: PositionId) {
        if let Some(node) = self.nodes.get_mut(&from) {
            *node.links_mut().slot(dir) = Some(to);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            let back = node.links_mut().slot(dir.opposite());
            if back.is_none() {
                *back = Some(from);
            }
        }
    }

    /// Remove every node in `doomed` from both tables and clear every
    /// surviving link that pointed at one of them.
    ///
    /// Returns the survivors that lost a lateral link.
    pub fn remove_all(&mut self, doomed: &Set<PositionId>) -> Vec<PositionId> {
        if doomed.is_empty() {
            return Vec::new();
        }

        for id in doomed {
            if let Some(node) = self.nodes.remove(id) {
                let key = node.position().road_lane();
                if let Some(ids) = self.road_lanes.get_mut(&key) {
                    ids.retain(|p| p != id);
                    if ids.is_empty() {
                        self.road_lanes.remove(&key);
                    }
                }
            }
        }

        let mut lost_lateral = Vec::new();
        for node in self.nodes.values_mut() {
            let id = node.id();
            let links = node.links_mut();
            for dir in Direction::ALL {
                let slot = links.slot(dir);
                if slot.is_some_and(|to| doomed.contains(&to)) {
                    *slot = None;
                    if dir.is_lateral() {
                        lost_lateral.push(id);
                    }
                }
            }
        }
        lost_lateral
    }

    /// Subtract `offset` from every node's distance.
    pub fn rebase(&mut self, offset: f64) {
        for node in self.nodes.values_mut() {
            node.set_distance(node.distance() - offset);
        }
    }

    /// `true` if the arena and road-lane table describe the same node set
    /// and every link points at a live node.
    pub fn is_consistent(&self) -> bool {
        let listed: usize = self.road_lanes.values().map(Vec::len).sum();
        if listed != self.nodes.len() {
            return false;
        }
        let lanes_ok = self.road_lanes.iter().all(|(key, ids)| {
            ids.iter().all(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|n| n.position().road_lane() == *key)
            })
        });
        let links_ok = self
            .nodes
            .values()
            .all(|n| n.links().iter().all(|(_, to)| self.nodes.contains_key(&to)));
        lanes_ok && links_ok
    }
}

impl Index<PositionId> for NodeTables {
    type Output = LatticeNode;

    /// # Panics
    /// Panics if `id` is not in the lattice.
    fn index(&self, id: PositionId) -> &LatticeNode {
        &self.nodes[&id]
    }
}
