mod bounds;
mod candidate;
pub mod crop;
mod error;
mod search;
mod select;
pub(crate) mod types;
pub use crop::{content_extent, placement_bounds, resolve_crop};
pub use error::PlacementError;
pub use search::search_candidates;
pub use select::{Selection, select_assignment};
pub use types::*;

use crate::config::{ForceMode, PlacementConfig};
use crate::geometry::{Rect, Size};
use crate::ir::Document;
use crate::log::{debug, warn};
use crate::text_metrics::TooltipMeasure;
use search::fallback_candidates;

/// One request per tooltip, in anchor order then tooltip order.
pub fn build_requests<M>(
    document: &Document,
    measure: &M,
    config: &PlacementConfig,
) -> Vec<TooltipRequest>
where
    M: TooltipMeasure + ?Sized,
{
    let mut requests = Vec::with_capacity(document.tooltip_count());
    for (anchor_idx, anchor) in document.anchors.iter().enumerate() {
        for (tooltip_idx, tooltip) in anchor.tooltips.iter().enumerate() {
            requests.push(TooltipRequest {
                id: TooltipId {
                    anchor: anchor_idx,
                    tooltip: tooltip_idx,
                },
                anchor: anchor.rect,
                size: measure.tooltip_size(tooltip),
                margin: tooltip.margin.unwrap_or(config.margin),
                positions: tooltip.candidate_positions().to_vec(),
                alignments: tooltip.candidate_alignments().to_vec(),
                force: tooltip.force,
            });
        }
    }
    requests
}

/// Anchors a tooltip of `anchor_idx` must stay clear of: every other anchor
/// that does not allow being drawn over.
fn anchor_obstacles(document: &Document, anchor_idx: usize) -> Vec<Rect> {
    document
        .anchors
        .iter()
        .enumerate()
        .filter(|(idx, anchor)| *idx != anchor_idx && !anchor.allow_overwrite)
        .map(|(_, anchor)| anchor.rect)
        .collect()
}

/// Place every tooltip of `document` on an image of `image` size.
///
/// Each tooltip is searched independently against the canvas bounds and the
/// other anchors, then one candidate per tooltip is chosen jointly so that no
/// two tooltips overlap and the total penalty is minimal.
pub fn compute_layout<M>(
    document: &Document,
    image: Size,
    measure: &M,
    config: &PlacementConfig,
) -> Result<DocumentLayout, PlacementError>
where
    M: TooltipMeasure + ?Sized,
{
    let bounds = placement_bounds(document.crop.as_ref(), image);
    let requests = build_requests(document, measure, config);

    let mut candidate_lists = Vec::with_capacity(requests.len());
    let mut infeasible = Vec::new();
    for request in &requests {
        let obstacles = anchor_obstacles(document, request.id.anchor);
        let mut candidates =
            search_candidates(request, &bounds, &obstacles, &config.penalties);
        if candidates.is_empty() && request.force && config.force_mode == ForceMode::Relaxed {
            debug!(tooltip = %request.id, "forcing tooltip without a feasible placement");
            candidates = fallback_candidates(request, &bounds, &config.penalties);
        }
        if candidates.is_empty() {
            warn!(
                document = %document.name,
                tooltip = %request.id,
                "tooltip has no feasible placement"
            );
            infeasible.push(request.id);
        }
        candidate_lists.push(candidates);
    }
    if !infeasible.is_empty() {
        return Err(PlacementError::NoFeasiblePlacement {
            tooltips: infeasible,
        });
    }

    let selection = select_assignment(&candidate_lists, config.search_budget)?;
    let tooltips: Vec<PlacedTooltip> = requests
        .iter()
        .zip(&candidate_lists)
        .zip(&selection.choices)
        .map(|((request, candidates), &choice)| {
            let chosen = candidates[choice];
            PlacedTooltip {
                id: request.id,
                rect: chosen.rect,
                position: chosen.position,
                alignment: chosen.alignment,
                penalty: chosen.penalty,
            }
        })
        .collect();

    let crop = document.crop.as_ref().map(|crop| {
        let content = content_extent(
            document
                .anchors
                .iter()
                .map(|anchor| &anchor.rect)
                .chain(tooltips.iter().map(|placed| &placed.rect)),
        );
        resolve_crop(crop, content, config.margin, image)
    });

    debug!(
        document = %document.name,
        tooltips = tooltips.len(),
        total_penalty = selection.total_penalty,
        "document placed"
    );
    Ok(DocumentLayout {
        name: document.name.clone(),
        bounds,
        tooltips,
        total_penalty: selection.total_penalty,
        crop,
    })
}
