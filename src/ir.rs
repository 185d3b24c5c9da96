use crate::geometry::{Rect, Size};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Side of the anchor a tooltip attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Over,
    Under,
    Left,
    Right,
}

impl Position {
    /// Enumeration order used when a tooltip does not restrict its positions.
    pub const ALL: [Position; 4] = [
        Position::Over,
        Position::Under,
        Position::Left,
        Position::Right,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "over" => Some(Self::Over),
            "under" => Some(Self::Under),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Over => "over",
            Self::Under => "under",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Whether `alignment` is meaningful for this side. Left/right tooltips
    /// align vertically, over/under tooltips align horizontally.
    pub fn accepts(self, alignment: Alignment) -> bool {
        match self {
            Self::Left | Self::Right => matches!(
                alignment,
                Alignment::Top | Alignment::Bottom | Alignment::Center
            ),
            Self::Over | Self::Under => matches!(
                alignment,
                Alignment::Left | Alignment::Right | Alignment::Center
            ),
        }
    }

    /// The axis the bounds adjuster may slide a tooltip along.
    pub fn adjust_axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::Vertical,
            Self::Over | Self::Under => Axis::Horizontal,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

impl Alignment {
    pub const ALL: [Alignment; 5] = [
        Alignment::Top,
        Alignment::Bottom,
        Alignment::Left,
        Alignment::Right,
        Alignment::Center,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" => Some(Self::Center),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipSpec {
    pub lines: Vec<String>,
    /// Allowed sides; empty means every side.
    pub positions: Vec<Position>,
    /// Allowed alignments; empty means every alignment.
    pub alignments: Vec<Alignment>,
    pub margin: Option<f32>,
    pub force: bool,
    /// Wrap width for the text, in pixels.
    pub width: Option<f32>,
}

impl TooltipSpec {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_positions(mut self, positions: &[Position]) -> Self {
        self.positions = positions.to_vec();
        self
    }

    pub fn with_alignments(mut self, alignments: &[Alignment]) -> Self {
        self.alignments = alignments.to_vec();
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn candidate_positions(&self) -> &[Position] {
        if self.positions.is_empty() {
            &Position::ALL
        } else {
            &self.positions
        }
    }

    pub fn candidate_alignments(&self) -> &[Alignment] {
        if self.alignments.is_empty() {
            &Alignment::ALL
        } else {
            &self.alignments
        }
    }
}

/// A screenshot element that tooltips annotate.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub rect: Rect,
    /// Other anchors' tooltips may cover this element.
    pub allow_overwrite: bool,
    pub tooltips: Vec<TooltipSpec>,
}

impl Anchor {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            allow_overwrite: false,
            tooltips: Vec::new(),
        }
    }

    pub fn with_tooltip(mut self, tooltip: TooltipSpec) -> Self {
        self.tooltips.push(tooltip);
        self
    }
}

/// One crop edge before resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropEdge {
    Fixed(f32),
    /// Shrink to the placed content plus margin.
    FitContent,
    /// Use the full image edge.
    FitImage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crop {
    pub left: CropEdge,
    pub top: CropEdge,
    pub right: CropEdge,
    pub bottom: CropEdge,
}

impl Crop {
    pub fn fit_content() -> Self {
        Self {
            left: CropEdge::FitContent,
            top: CropEdge::FitContent,
            right: CropEdge::FitContent,
            bottom: CropEdge::FitContent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub anchors: Vec<Anchor>,
    pub crop: Option<Crop>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchors: Vec::new(),
            crop: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    pub fn tooltip_count(&self) -> usize {
        self.anchors.iter().map(|anchor| anchor.tooltips.len()).sum()
    }
}

/// A captured screenshot and the documents drawn on top of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    pub name: String,
    pub path: PathBuf,
    pub image_size: Option<Size>,
    pub documents: Vec<Document>,
}

impl Screenshot {
    pub fn image_path(&self) -> PathBuf {
        self.path.join(format!("{}.png", self.name))
    }

    pub fn meta_path(&self) -> PathBuf {
        self.path.join(format!("{}.json", self.name))
    }
}
