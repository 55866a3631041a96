use log::debug;

use crate::KeyColor;
use crate::explore::Path;
use crate::state::State;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("No solution found.")]
    NoSolutionFound,
}

/// Scores the final state of a path; higher is better.
pub trait Objective {
    fn score(&self, state: &State) -> i64;
}

impl<F> Objective for F
where
    F: Fn(&State) -> i64,
{
    fn score(&self, state: &State) -> i64 {
        self(state)
    }
}

/// Scores a state by how many keys of one color it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCount(pub KeyColor);

impl Objective for KeyCount {
    fn score(&self, state: &State) -> i64 {
        i64::from(state.keys().get(self.0))
    }
}

/// Score of `path` under `objective`; a path with no steps scores as `i64::MIN`.
pub fn score_path<O: Objective + ?Sized>(path: &Path, objective: &O) -> i64 {
    path.final_state()
        .map_or(i64::MIN, |state| objective.score(state))
}

/// The path whose final state scores highest. Ties go to the earliest path.
pub fn select_best<'a, O: Objective + ?Sized>(
    paths: &'a [Path],
    objective: &O,
) -> Result<&'a Path, SelectError> {
    let mut best: Option<(&Path, i64)> = None;
    for path in paths {
        let score = score_path(path, objective);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((path, score));
        }
    }
    let (path, score) = best.ok_or(SelectError::NoSolutionFound)?;
    debug!("Selected a {}-step path scoring {score}", path.len());
    Ok(path)
}

/// [`select_best`] scoring by the final count of `color`.
pub fn select_best_by_key(paths: &[Path], color: KeyColor) -> Result<&Path, SelectError> {
    select_best(paths, &KeyCount(color))
}
