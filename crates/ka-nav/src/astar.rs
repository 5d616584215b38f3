//! Bounded grid A* and the `Pathfinder` trait.
//!
//! # Search rules
//!
//! - 8-connected.  A diagonal step is allowed only when both orthogonal cells
//!   it cuts past are passable, so agents never clip a corner.
//! - Integer costs: 10 per straight step, 14 per diagonal.  The octile
//!   heuristic on the same scale never overestimates, so returned paths are
//!   shortest.
//! - A cell is passable when the terrain is walkable and no solid footprint
//!   covers it.  The goal cell is exempt from the footprint rule so a search
//!   can end on a structure.
//! - Every pop of a live heap entry is one expansion.  Once the budget is
//!   spent the search stops with [`NavError::BudgetExhausted`].
//!
//! # Determinism
//!
//! Heap entries are ordered by `(f, h, cell, seq)`, neighbors are visited in
//! a fixed order, and the score tables are never iterated, so equal inputs
//! always give the identical path.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use ka_core::GridPos;
use ka_world::{Occupancy, WorldView};

use crate::{NavError, NavResult};

pub const STRAIGHT_COST: u32 = 10;
pub const DIAGONAL_COST: u32 = 14;

// ── GridPath ──────────────────────────────────────────────────────────────────

/// A successful search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPath {
    /// Cells from start to goal inclusive.
    pub cells:      Vec<GridPos>,
    /// Total cost in search units (10 per straight step).
    pub cost:       u32,
    /// Expansions the search used.
    pub expansions: usize,
}

impl GridPath {
    /// Number of steps (cells minus one).
    #[inline]
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// How many steps are diagonal.
    pub fn diagonal_steps(&self) -> usize {
        self.cells
            .windows(2)
            .filter(|w| w[0].x != w[1].x && w[0].y != w[1].y)
            .count()
    }
}

// ── Pathfinder trait ──────────────────────────────────────────────────────────

/// Pluggable grid search.
///
/// The engine calls searches through this trait so tests and applications can
/// substitute their own (a scripted always-fail finder, a cached one, …).
pub trait Pathfinder: Send + Sync {
    fn find_path(
        &self,
        view:      &dyn WorldView,
        occupancy: &Occupancy,
        start:     GridPos,
        goal:      GridPos,
    ) -> NavResult<GridPath>;
}

/// The default A* with a per-search expansion budget.
#[derive(Debug, Clone, Copy)]
pub struct AStarPathfinder {
    pub max_expansions: usize,
}

impl AStarPathfinder {
    pub fn new(max_expansions: usize) -> Self {
        Self { max_expansions }
    }
}

impl Default for AStarPathfinder {
    fn default() -> Self {
        Self::new(8_000)
    }
}

impl Pathfinder for AStarPathfinder {
    fn find_path(
        &self,
        view:      &dyn WorldView,
        occupancy: &Occupancy,
        start:     GridPos,
        goal:      GridPos,
    ) -> NavResult<GridPath> {
        find_path(view, occupancy, start, goal, self.max_expansions)
    }
}

// ── Open list entry ───────────────────────────────────────────────────────────

#[derive(Debug)]
struct OpenNode {
    f:    u32,
    h:    u32,
    g:    u32,
    cell: GridPos,
    seq:  u64,
}

impl OpenNode {
    fn key(&self) -> (u32, u32, GridPos, u64) {
        (self.f, self.h, self.cell, self.seq)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest key.
        other.key().cmp(&self.key())
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Octile distance scaled to the step costs.
#[inline]
pub fn heuristic(a: GridPos, b: GridPos) -> u32 {
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    STRAIGHT_COST * hi + (DIAGONAL_COST - STRAIGHT_COST) * lo
}

/// Whether a search for `goal` may enter `cell`.
#[inline]
pub fn is_passable<V: WorldView + ?Sized>(
    view:      &V,
    occupancy: &Occupancy,
    cell:      GridPos,
    goal:      GridPos,
) -> bool {
    view.is_walkable(cell) && (cell == goal || !occupancy.is_blocked(cell))
}

/// Shortest path from `start` to `goal`, expanding at most `max_expansions`
/// nodes.
pub fn find_path<V: WorldView + ?Sized>(
    view:           &V,
    occupancy:      &Occupancy,
    start:          GridPos,
    goal:           GridPos,
    max_expansions: usize,
) -> NavResult<GridPath> {
    if !view.in_bounds(start) {
        return Err(NavError::StartOutOfBounds(start));
    }
    if start == goal {
        return Ok(GridPath { cells: vec![start], cost: 0, expansions: 0 });
    }
    if !view.is_walkable(goal) {
        return Err(NavError::NoPath { from: start, to: goal });
    }

    // cell → (best g, parent)
    let mut best: FxHashMap<GridPos, (u32, Option<GridPos>)> = FxHashMap::default();
    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;
    let mut expansions = 0usize;

    best.insert(start, (0, None));
    let h0 = heuristic(start, goal);
    open.push(OpenNode { f: h0, h: h0, g: 0, cell: start, seq });
    seq += 1;

    while let Some(node) = open.pop() {
        if best.get(&node.cell).is_some_and(|&(g, _)| g != node.g) {
            continue;
        }

        if expansions >= max_expansions {
            return Err(NavError::BudgetExhausted { from: start, to: goal, expansions });
        }
        expansions += 1;

        if node.cell == goal {
            return Ok(GridPath {
                cells: reconstruct(&best, goal),
                cost:  node.g,
                expansions,
            });
        }

        let passable = |c: GridPos| is_passable(view, occupancy, c, goal);

        let orthogonal = GridPos::ORTHOGONAL.iter().map(|&d| (d, STRAIGHT_COST));
        let diagonal = GridPos::DIAGONAL.iter().map(|&d| (d, DIAGONAL_COST));

        for ((dx, dy), step) in orthogonal.chain(diagonal) {
            let next = node.cell.offset(dx, dy);
            if !passable(next) {
                continue;
            }
            if dx != 0 && dy != 0
                && !(passable(node.cell.offset(dx, 0)) && passable(node.cell.offset(0, dy)))
            {
                continue;
            }

            let g = node.g.saturating_add(step);
            if best.get(&next).is_some_and(|&(old, _)| g >= old) {
                continue;
            }
            best.insert(next, (g, Some(node.cell)));
            let h = heuristic(next, goal);
            open.push(OpenNode { f: g.saturating_add(h), h, g, cell: next, seq });
            seq += 1;
        }
    }

    Err(NavError::NoPath { from: start, to: goal })
}

fn reconstruct(best: &FxHashMap<GridPos, (u32, Option<GridPos>)>, goal: GridPos) -> Vec<GridPos> {
    let mut cells = vec![goal];
    let mut cur = goal;
    while let Some(&(_, Some(prev))) = best.get(&cur) {
        cells.push(prev);
        cur = prev;
    }
    cells.reverse();
    cells
}

/// The nearest cell to `cell` that a search could end on, scanning square
/// rings outwards up to `radius`.  Within a ring the scan is row-major.
pub fn snap_to_passable<V: WorldView + ?Sized>(
    view:      &V,
    occupancy: &Occupancy,
    cell:      GridPos,
    radius:    i32,
) -> Option<GridPos> {
    if view.is_walkable(cell) && !occupancy.is_blocked(cell) {
        return Some(cell);
    }
    for r in 1..=radius.max(0) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx.abs() != r && dy.abs() != r {
                    continue;
                }
                let c = cell.offset(dx, dy);
                if view.is_walkable(c) && !occupancy.is_blocked(c) {
                    return Some(c);
                }
            }
        }
    }
    None
}
