use std::fmt;

use serde::Serialize;

use crate::geometry::{Rect, Size};
use crate::ir::{Alignment, Position};

/// Identifies a tooltip by its anchor index and its index on that anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TooltipId {
    pub anchor: usize,
    pub tooltip: usize,
}

impl fmt::Display for TooltipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor {} tooltip {}", self.anchor, self.tooltip)
    }
}

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub line_sizes: Vec<Size>,
    pub width: f32,
    pub height: f32,
}

impl TextBlock {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Everything the search needs to know about one tooltip.
#[derive(Debug, Clone)]
pub struct TooltipRequest {
    pub id: TooltipId,
    pub anchor: Rect,
    /// Outer box size, padding included.
    pub size: Size,
    pub margin: f32,
    pub positions: Vec<Position>,
    pub alignments: Vec<Alignment>,
    pub force: bool,
}

/// A scored proposal for one tooltip. `penalty` is `f32::INFINITY` only for
/// fallback candidates of forced tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub rect: Rect,
    pub penalty: f32,
    pub position: Position,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedTooltip {
    pub id: TooltipId,
    pub rect: Rect,
    pub position: Position,
    pub alignment: Alignment,
    pub penalty: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentLayout {
    pub name: String,
    /// The rectangle placements were constrained to.
    pub bounds: Rect,
    pub tooltips: Vec<PlacedTooltip>,
    pub total_penalty: f32,
    /// Final crop rectangle when the document asked for one.
    pub crop: Option<Rect>,
}

impl DocumentLayout {
    pub fn tooltip(&self, id: TooltipId) -> Option<&PlacedTooltip> {
        self.tooltips.iter().find(|placed| placed.id == id)
    }
}
