use thiserror::Error;

use super::TooltipId;

/// Document-level placement failures. Incompatible position/alignment pairs
/// and individual rejected candidates are not errors; they are dropped during
/// the search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("no feasible placement for {}", format_ids(.tooltips))]
    NoFeasiblePlacement { tooltips: Vec<TooltipId> },
    #[error("no overlap-free layout exists for {tooltips} tooltips")]
    NoValidDocumentLayout { tooltips: usize },
    #[error("layout search gave up after visiting {budget} assignments")]
    SearchBudgetExhausted { budget: usize },
}

fn format_ids(ids: &[TooltipId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_tooltips() {
        let err = PlacementError::NoFeasiblePlacement {
            tooltips: vec![
                TooltipId { anchor: 0, tooltip: 1 },
                TooltipId { anchor: 2, tooltip: 0 },
            ],
        };
        assert_eq!(
            err.to_string(),
            "no feasible placement for anchor 0 tooltip 1, anchor 2 tooltip 0"
        );
    }
}
