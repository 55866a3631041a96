//! Exhaustive depth-first enumeration of the paths that reach an exit.

use std::collections::HashSet;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::rules::{Edge, edges};
use crate::state::State;

/// The edges taken from the initial state to a terminal state, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    steps: Vec<Edge>,
}

impl Path {
    pub fn new(steps: Vec<Edge>) -> Self {
        Path { steps }
    }

    pub fn steps(&self) -> &[Edge] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The state after the last step.
    pub fn final_state(&self) -> Option<&State> {
        self.steps.last().map(|edge| &edge.state)
    }

    /// Sum of the informational step costs.
    pub fn total_cost(&self) -> u32 {
        self.steps.iter().map(|edge| edge.cost).sum()
    }

    /// `(state, label)` pairs, ready for rendering.
    pub fn labelled_steps(&self) -> impl Iterator<Item = (&State, String)> {
        self.steps.iter().map(|edge| (&edge.state, edge.label()))
    }
}

impl IntoIterator for Path {
    type Item = Edge;
    type IntoIter = std::vec::IntoIter<Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

/// Depth-first explorer with one visited set for the whole run.
///
/// A state is expanded only by the first path that reaches it. Later paths
/// into the same state are dropped, even if they would score better.
#[derive(Debug, Default)]
pub struct Explorer {
    visited: HashSet<State>,
}

impl Explorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct states discovered so far. The initial state is not counted.
    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    pub fn has_visited(&self, state: &State) -> bool {
        self.visited.contains(state)
    }

    /// Collects every path from `initial` that ends on an exit, in discovery order.
    ///
    /// Runs on an explicit stack: `frames[i]` holds the remaining edges out of
    /// the state reached by `trail[..i]`.
    pub fn search(&mut self, initial: &State) -> Vec<Path> {
        let mut paths = Vec::new();
        let mut trail: Vec<Edge> = Vec::new();
        let mut frames = vec![edges(initial).into_iter()];

        while let Some(frame) = frames.last_mut() {
            let Some(edge) = frame.next() else {
                frames.pop();
                trail.pop();
                continue;
            };
            if !self.visited.insert(edge.state.clone()) {
                continue;
            }

            let terminal = edge.state.is_terminal();
            trail.push(edge);
            if terminal {
                debug!(
                    "Found solution #{} with {} steps, cost {}",
                    paths.len() + 1,
                    trail.len(),
                    trail.iter().map(|edge| edge.cost).sum::<u32>()
                );
                paths.push(Path::new(trail.clone()));
                trail.pop();
            } else if let Some(last) = trail.last() {
                frames.push(edges(&last.state).into_iter());
            }
        }

        info!(
            "Search finished: {} solutions, {} states visited",
            paths.len(),
            self.visited.len()
        );
        paths
    }
}

/// Runs a fresh [`Explorer`] from `initial`.
pub fn search(initial: &State) -> Vec<Path> {
    Explorer::new().search(initial)
}
