//! A* over `(cell, facing)` states.
//!
//! Each turn and each step costs one. A step may cost more when a [`StepCost`]
//! rule prices risk into it. The heuristic is the Manhattan distance to the nearest
//! goal, which never overestimates because every step costs at least one. Heap
//! ties are broken by insertion order so the same inputs always yield the same
//! plan.

use crate::world::components::{Action, Direction, Point};
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

/// Decides which cells a plan may enter and at what price.
pub trait StepCost {
    /// Cost of stepping into `cell`, or `None` if the plan must not enter it.
    fn enter_cost(&self, cell: Point, goals: &BTreeSet<Point>) -> Option<f64>;
}

/// Only goal, visited or proven-safe cells may be entered.
#[derive(Debug, Clone, Copy)]
pub struct SafeCells<'a> {
    pub visited: &'a BTreeSet<Point>,
    pub safe: &'a BTreeSet<Point>,
}

impl StepCost for SafeCells<'_> {
    fn enter_cost(&self, cell: Point, goals: &BTreeSet<Point>) -> Option<f64> {
        (goals.contains(&cell) || self.visited.contains(&cell) || self.safe.contains(&cell))
            .then_some(1.0)
    }
}

/// Any cell but a proven pit, priced by `1 + risk × weight`.
#[derive(Debug, Clone, Copy)]
pub struct RiskWeighted<'a> {
    pub proven_pits: &'a BTreeSet<Point>,
    /// Row-major risk score per cell.
    pub risk: &'a [f64],
    pub size: usize,
    pub weight: f64,
}

impl StepCost for RiskWeighted<'_> {
    fn enter_cost(&self, cell: Point, _: &BTreeSet<Point>) -> Option<f64> {
        if self.proven_pits.contains(&cell) {
            return None;
        }
        let risk = self.risk.get(cell.index(self.size)).copied().unwrap_or(0.0);
        Some(risk.mul_add(self.weight, 1.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct State {
    at: Point,
    facing: Direction,
}

struct Node {
    state: State,
    parent: Option<(usize, Action)>,
}

fn heuristic(at: Point, goals: &BTreeSet<Point>) -> f64 {
    f64::from(goals.iter().map(|&g| at.manhattan(g)).min().unwrap_or(0))
}

/// Cheapest action sequence from `(from, facing)` to any cell in `goals`.
///
/// Returns an empty plan when `from` is already a goal and `None` when no goal
/// is reachable.
pub fn plan<C: StepCost>(
    size: usize,
    from: Point,
    facing: Direction,
    goals: &BTreeSet<Point>,
    cost: &C,
) -> Option<Vec<Action>> {
    if goals.is_empty() {
        return None;
    }

    let start = State { at: from, facing };
    let mut nodes = vec![Node {
        state: start,
        parent: None,
    }];
    let mut best: FxHashMap<State, f64> = FxHashMap::default();
    best.insert(start, 0.0);

    let mut open = BinaryHeap::new();
    open.push(Reverse((
        OrderedFloat(heuristic(from, goals)),
        OrderedFloat(0.0),
        0usize,
    )));

    while let Some(Reverse((_, OrderedFloat(g), idx))) = open.pop() {
        let state = nodes[idx].state;
        if best.get(&state).is_some_and(|&b| g > b) {
            continue;
        }

        if goals.contains(&state.at) {
            return Some(reconstruct(&nodes, idx));
        }

        for action in [Action::MoveForward, Action::TurnLeft, Action::TurnRight] {
            let (next, step) = match action {
                Action::MoveForward => {
                    let cell = state.at + state.facing.vector();
                    if !cell.in_bounds(size) {
                        continue;
                    }
                    let Some(step) = cost.enter_cost(cell, goals) else {
                        continue;
                    };
                    (State { at: cell, ..state }, step)
                }
                Action::TurnLeft => (
                    State {
                        facing: state.facing.turn_left(),
                        ..state
                    },
                    1.0,
                ),
                _ => (
                    State {
                        facing: state.facing.turn_right(),
                        ..state
                    },
                    1.0,
                ),
            };

            let next_g = g + step;
            if best.get(&next).is_none_or(|&b| next_g < b) {
                best.insert(next, next_g);
                nodes.push(Node {
                    state: next,
                    parent: Some((idx, action)),
                });
                open.push(Reverse((
                    OrderedFloat(next_g + heuristic(next.at, goals)),
                    OrderedFloat(next_g),
                    nodes.len() - 1,
                )));
            }
        }
    }

    None
}

fn reconstruct(nodes: &[Node], mut idx: usize) -> Vec<Action> {
    let mut actions = Vec::new();
    while let Some((parent, action)) = nodes[idx].parent {
        actions.push(action);
        idx = parent;
    }
    actions.reverse();
    actions
}

/// Replays `actions` and returns the final cell and facing, or `None` if a step
/// leaves the grid.
pub fn replay(
    size: usize,
    mut at: Point,
    mut facing: Direction,
    actions: &[Action],
) -> Option<(Point, Direction)> {
    for action in actions {
        match action {
            Action::MoveForward => {
                at += facing.vector();
                if !at.in_bounds(size) {
                    return None;
                }
            }
            Action::TurnLeft => facing = facing.turn_left(),
            Action::TurnRight => facing = facing.turn_right(),
            _ => {}
        }
    }
    Some((at, facing))
}
