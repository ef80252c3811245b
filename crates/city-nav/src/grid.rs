//! `GridNavigator`: a bounded tile grid with impassable tiles.
//!
//! # Resolution
//!
//! A target on an open tile resolves to itself.  A blocked or out-of-bounds
//! target resolves to the nearest open tile by Manhattan distance, searching
//! outwards ring by ring up to `search_radius`.  Within one ring the scan
//! order is fixed (by `dx`, then `dy`), so ties always pick the same tile.
//!
//! # Routing
//!
//! Breadth-first search over 4-neighbours, expanding in the fixed
//! `Position::neighbors4` order.  Every step costs the same, so BFS returns a
//! shortest path, and the fixed expansion order makes it deterministic.

use std::collections::VecDeque;

use city_core::{CitizenId, Position};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::navigator::{Navigator, Route};
use crate::{NavError, NavResult};

#[derive(Clone, Debug)]
pub struct GridNavigator {
    width:         i32,
    height:        i32,
    blocked:       FxHashSet<Position>,
    search_radius: u32,
}

impl GridNavigator {
    /// An all-open grid covering `[0, width) × [0, height)`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width:         width.min(i32::MAX as u32) as i32,
            height:        height.min(i32::MAX as u32) as i32,
            blocked:       FxHashSet::default(),
            search_radius: 4,
        }
    }

    /// Mark tiles as impassable.
    pub fn with_blocked(mut self, tiles: impl IntoIterator<Item = Position>) -> Self {
        self.blocked.extend(tiles);
        self
    }

    /// How far `resolve_position` searches for an open tile.
    pub fn search_radius(mut self, radius: u32) -> Self {
        self.search_radius = radius;
        self
    }

    pub fn block(&mut self, tile: Position) {
        self.blocked.insert(tile);
    }

    #[inline]
    pub fn in_bounds(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    #[inline]
    pub fn is_open(&self, p: Position) -> bool {
        self.in_bounds(p) && !self.blocked.contains(&p)
    }

    /// The nearest open tile to `target` within the search radius.
    pub fn nearest_open(&self, target: Position) -> Option<Position> {
        if self.is_open(target) {
            return Some(target);
        }
        (1..=self.search_radius as i32).find_map(|r| {
            (-r..=r).find_map(|dx| {
                let rest = r - dx.abs();
                let mut candidates = [Position::new(target.x + dx, target.y - rest), Position::new(target.x + dx, target.y + rest)];
                if rest == 0 {
                    candidates[1] = candidates[0];
                }
                candidates.into_iter().find(|&p| self.is_open(p))
            })
        })
    }

    fn bfs(&self, from: Position, to: Position) -> Option<Route> {
        if from == to {
            return Some(Route::default());
        }
        let mut came_from: FxHashMap<Position, Position> = FxHashMap::default();
        let mut queue = VecDeque::from([from]);
        came_from.insert(from, from);

        while let Some(cur) = queue.pop_front() {
            if cur == to {
                return Some(reconstruct(&came_from, from, to));
            }
            for next in cur.neighbors4() {
                if self.is_open(next) && !came_from.contains_key(&next) {
                    came_from.insert(next, cur);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

impl Navigator for GridNavigator {
    fn resolve_position(&self, citizen: CitizenId, target: Position) -> NavResult<Position> {
        self.nearest_open(target)
            .ok_or(NavError::Unreachable { citizen, target })
    }

    fn route(&self, from: Position, to: Position) -> NavResult<Route> {
        if !self.is_open(from) || !self.is_open(to) {
            return Err(NavError::NoRoute { from, to });
        }
        self.bfs(from, to).ok_or(NavError::NoRoute { from, to })
    }
}

fn reconstruct(came_from: &FxHashMap<Position, Position>, from: Position, to: Position) -> Route {
    let mut waypoints = Vec::new();
    let mut cur = to;
    while cur != from {
        waypoints.push(cur);
        match came_from.get(&cur) {
            Some(&prev) => cur = prev,
            None => break,
        }
    }
    waypoints.reverse();
    Route { waypoints }
}
