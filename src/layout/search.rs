use super::bounds::{adjust_to_bounds, fits_primary_axis};
use super::candidate::raw_candidate;
use super::{Candidate, TooltipRequest};
use crate::config::PenaltySettings;
use crate::geometry::Rect;
use crate::log::debug;

pub(crate) fn clears_obstacles(rect: &Rect, obstacles: &[Rect]) -> bool {
    !obstacles.iter().any(|obstacle| rect.overlaps(obstacle))
}

/// Every feasible placement of one tooltip, cheapest first.
///
/// Candidates with equal penalty keep enumeration order (declared positions,
/// then declared alignments). An empty result means the tooltip cannot be
/// placed at all.
pub fn search_candidates(
    request: &TooltipRequest,
    bounds: &Rect,
    obstacles: &[Rect],
    penalties: &PenaltySettings,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for &position in &request.positions {
        for &alignment in &request.alignments {
            let Some(raw) = raw_candidate(
                &request.anchor,
                request.size,
                request.margin,
                position,
                alignment,
            ) else {
                continue;
            };
            if !fits_primary_axis(&raw, position, bounds) {
                continue;
            }
            let Some(adjusted) = adjust_to_bounds(
                &raw,
                position.adjust_axis(),
                bounds,
                request.margin,
                penalties,
            ) else {
                continue;
            };
            if !clears_obstacles(&adjusted.rect, obstacles) {
                continue;
            }
            candidates.push(Candidate {
                rect: adjusted.rect,
                penalty: adjusted.penalty,
                position,
                alignment,
            });
        }
    }
    // Stable sort keeps enumeration order among equal penalties.
    candidates.sort_by(|a, b| a.penalty.total_cmp(&b.penalty));
    debug!(
        tooltip = %request.id,
        count = candidates.len(),
        "feasible tooltip candidates"
    );
    candidates
}

/// Least-bad placements for a forced tooltip that has no feasible candidate:
/// every compatible pair, slid into bounds where that is possible, all with
/// infinite penalty so the selector only takes them when nothing else exists.
pub(crate) fn fallback_candidates(
    request: &TooltipRequest,
    bounds: &Rect,
    penalties: &PenaltySettings,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for &position in &request.positions {
        for &alignment in &request.alignments {
            let Some(raw) = raw_candidate(
                &request.anchor,
                request.size,
                request.margin,
                position,
                alignment,
            ) else {
                continue;
            };
            let rect = adjust_to_bounds(
                &raw,
                position.adjust_axis(),
                bounds,
                request.margin,
                penalties,
            )
            .map_or(raw, |adjusted| adjusted.rect);
            candidates.push(Candidate {
                rect,
                penalty: f32::INFINITY,
                position,
                alignment,
            });
        }
    }
    candidates
}
