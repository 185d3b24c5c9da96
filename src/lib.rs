//! Tooltip placement for annotated screenshots.
//!
//! Anchors on a screenshot carry tooltip requests; [`compute_layout`] places
//! every tooltip of a document so that none overlap each other or foreign
//! anchors, all stay inside the canvas and the summed penalty is minimal.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod log;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, ForceMode, PenaltySettings, PlacementConfig};
pub use geometry::{Point, Rect, Size};
pub use ir::{Alignment, Anchor, Crop, CropEdge, Document, Position, Screenshot, TooltipSpec};
pub use layout::{DocumentLayout, PlacedTooltip, PlacementError, TooltipId, compute_layout};
pub use parser::{ParseError, parse_screenshot};
pub use text_metrics::{TextMeasurer, TooltipMeasure};
