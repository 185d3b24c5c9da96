use super::{Candidate, PlacementError};
use crate::geometry::Rect;
use crate::log::debug;

/// The winning assignment: one candidate index per tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub choices: Vec<usize>,
    pub total_penalty: f32,
    /// Candidates examined during the search.
    pub visited: usize,
}

/// Pick one candidate per tooltip so that no two chosen rectangles overlap and
/// the summed penalty is minimal.
///
/// Each list must be sorted by ascending penalty, as
/// [`search_candidates`](super::search_candidates) returns it. The result is
/// the first minimum in Cartesian-product order, found by depth-first
/// branch-and-bound: a branch is cut as soon as its running penalty reaches the
/// best complete total, which can only discard assignments that are worse or
/// that tie later in product order.
pub fn select_assignment(
    candidates: &[Vec<Candidate>],
    budget: Option<usize>,
) -> Result<Selection, PlacementError> {
    debug_assert!(candidates.iter().all(|list| list
        .windows(2)
        .all(|w| w[0].penalty <= w[1].penalty)));

    if candidates.iter().any(Vec::is_empty) {
        return Err(PlacementError::NoValidDocumentLayout {
            tooltips: candidates.len(),
        });
    }

    let mut search = Search {
        candidates,
        budget,
        visited: 0,
        chosen: Vec::with_capacity(candidates.len()),
        placed: Vec::with_capacity(candidates.len()),
        best: None,
    };
    search.descend(0, 0.0)?;
    let visited = search.visited;
    let Some((total_penalty, choices)) = search.best else {
        return Err(PlacementError::NoValidDocumentLayout {
            tooltips: candidates.len(),
        });
    };
    debug!(total_penalty, visited, "selected tooltip assignment");
    Ok(Selection {
        choices,
        total_penalty,
        visited,
    })
}

struct Search<'a> {
    candidates: &'a [Vec<Candidate>],
    budget: Option<usize>,
    visited: usize,
    chosen: Vec<usize>,
    placed: Vec<Rect>,
    best: Option<(f32, Vec<usize>)>,
}

impl Search<'_> {
    fn descend(&mut self, depth: usize, running: f32) -> Result<(), PlacementError> {
        if depth == self.candidates.len() {
            let improves = match &self.best {
                Some((best, _)) => running < *best,
                None => true,
            };
            if improves {
                self.best = Some((running, self.chosen.clone()));
            }
            return Ok(());
        }

        let candidates = self.candidates;
        for (index, candidate) in candidates[depth].iter().enumerate() {
            let total = running + candidate.penalty;
            if let Some((best, _)) = &self.best
                && total >= *best
            {
                // Lists are sorted, so every later sibling is at least as bad.
                break;
            }
            self.visited += 1;
            if let Some(budget) = self.budget
                && self.visited > budget
            {
                return Err(PlacementError::SearchBudgetExhausted { budget });
            }
            if self.placed.iter().any(|rect| rect.overlaps(&candidate.rect)) {
                continue;
            }
            self.chosen.push(index);
            self.placed.push(candidate.rect);
            self.descend(depth + 1, total)?;
            self.chosen.pop();
            self.placed.pop();
        }
        Ok(())
    }
}
