//! Navigation trait and the obstacle-free default.
//!
//! # Pluggability
//!
//! `city-sim` resolves every movement through [`Navigator`], so applications
//! can back it with a road graph, a tile map, or a remote service.  Both
//! methods must be pure with respect to kernel state: the same inputs always
//! give the same answer within a tick.

use city_core::{CitizenId, Position};

use crate::NavResult;

// ── Route ─────────────────────────────────────────────────────────────────────

/// Ordered waypoints from a source to a destination.
///
/// The source tile is not included; the last waypoint is the destination.
/// An empty route means source and destination coincide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub waypoints: Vec<Position>,
}

impl Route {
    /// Number of steps (tiles entered) along the route.
    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Where the route ends, or `None` for a trivial route.
    pub fn destination(&self) -> Option<Position> {
        self.waypoints.last().copied()
    }
}

// ── Navigator trait ───────────────────────────────────────────────────────────

/// Position resolution and routing, consumed by the population manager.
///
/// Implementations must be `Send + Sync`: they are shared with the parallel
/// evaluation phase.
pub trait Navigator: Send + Sync {
    /// The tile `citizen` would actually stand on when heading for `target`.
    ///
    /// Fails with [`NavError::Unreachable`](crate::NavError::Unreachable)
    /// when no usable tile is close enough.
    fn resolve_position(&self, citizen: CitizenId, target: Position) -> NavResult<Position>;

    /// Waypoints from `from` to `to`.
    ///
    /// Fails with [`NavError::NoRoute`](crate::NavError::NoRoute) when the
    /// two are not connected.
    fn route(&self, from: Position, to: Position) -> NavResult<Route>;
}

// ── OpenNavigator ─────────────────────────────────────────────────────────────

/// Unbounded plane without obstacles: every position resolves to itself and
/// routes walk along x, then y.
#[derive(Copy, Clone, Debug, Default)]
pub struct OpenNavigator;

impl Navigator for OpenNavigator {
    fn resolve_position(&self, _citizen: CitizenId, target: Position) -> NavResult<Position> {
        Ok(target)
    }

    fn route(&self, from: Position, to: Position) -> NavResult<Route> {
        let mut waypoints = Vec::with_capacity(from.manhattan(to) as usize);
        let mut cur = from;
        while cur.x != to.x {
            cur.x += (to.x - cur.x).signum();
            waypoints.push(cur);
        }
        while cur.y != to.y {
            cur.y += (to.y - cur.y).signum();
            waypoints.push(cur);
        }
        Ok(Route { waypoints })
    }
}
