use crate::geometry::{Point, Rect, Size};
use crate::ir::{Alignment, Anchor, Crop, CropEdge, Document, Position, Screenshot, TooltipSpec};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

static TAG_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,]+").unwrap());

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown position `{0}`")]
    UnknownPosition(String),
    #[error("unknown alignment `{0}`")]
    UnknownAlignment(String),
    #[error("invalid crop edge `{0}`")]
    InvalidCropEdge(String),
    #[error("invalid geometry in document `{document}`: {reason}")]
    InvalidGeometry { document: String, reason: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPair {
    List([f32; 2]),
    Point { x: f32, y: f32 },
    Size { width: f32, height: f32 },
}

impl RawPair {
    fn values(&self) -> (f32, f32) {
        match *self {
            RawPair::List([a, b]) => (a, b),
            RawPair::Point { x, y } => (x, y),
            RawPair::Size { width, height } => (width, height),
        }
    }
}

/// Either `"left right"` or `["left", "right"]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTags {
    Text(String),
    List(Vec<String>),
}

impl RawTags {
    fn tokens(&self) -> Vec<&str> {
        match self {
            RawTags::Text(text) => TAG_SEPARATOR_RE
                .split(text.trim())
                .filter(|token| !token.is_empty())
                .collect(),
            RawTags::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLines {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawTooltip {
    #[serde(default)]
    lines: Option<RawLines>,
    #[serde(default)]
    positions: Option<RawTags>,
    #[serde(default)]
    alignments: Option<RawTags>,
    #[serde(default)]
    margin: Option<f32>,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    width: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    location: RawPair,
    size: RawPair,
    #[serde(default)]
    allow_overwrite: bool,
    #[serde(default)]
    tooltips: Vec<RawTooltip>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCropEdge {
    Number(f32),
    Keyword(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCrop {
    All(RawCropEdge),
    Edges {
        #[serde(default)]
        left: Option<RawCropEdge>,
        #[serde(default)]
        top: Option<RawCropEdge>,
        #[serde(default)]
        right: Option<RawCropEdge>,
        #[serde(default)]
        bottom: Option<RawCropEdge>,
    },
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default, alias = "anchors")]
    elements: Vec<RawElement>,
    #[serde(default)]
    crop: Option<RawCrop>,
}

#[derive(Debug, Deserialize)]
struct RawScreenshot {
    name: String,
    #[serde(default)]
    path: PathBuf,
    #[serde(default)]
    image_size: Option<RawPair>,
    #[serde(default)]
    documents: Vec<RawDocument>,
}

/// Parse screenshot metadata.
pub fn parse_screenshot(input: &str) -> Result<Screenshot, ParseError> {
    let raw: RawScreenshot = serde_json::from_str(input)?;
    let image_size = raw.image_size.as_ref().map(|pair| {
        let (width, height) = pair.values();
        Size::new(width, height)
    });
    let documents = raw
        .documents
        .into_iter()
        .map(convert_document)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Screenshot {
        name: raw.name,
        path: raw.path,
        image_size,
        documents,
    })
}

/// Read a metadata file. A missing or relative `path` is always resolved
/// against the metadata file's own directory, never the working directory.
pub fn load_screenshot(meta_path: &Path) -> anyhow::Result<Screenshot> {
    let contents = std::fs::read_to_string(meta_path)
        .with_context(|| format!("failed to read {}", meta_path.display()))?;
    let mut screenshot = parse_screenshot(&contents)
        .with_context(|| format!("failed to parse {}", meta_path.display()))?;
    let base = meta_path.parent().unwrap_or_else(|| Path::new(""));
    if screenshot.path.as_os_str().is_empty() {
        screenshot.path = base.to_path_buf();
    } else if screenshot.path.is_relative() {
        screenshot.path = base.join(&screenshot.path);
    }
    Ok(screenshot)
}

fn convert_document(raw: RawDocument) -> Result<Document, ParseError> {
    let mut anchors = Vec::with_capacity(raw.elements.len());
    for element in raw.elements {
        let (x, y) = element.location.values();
        let (width, height) = element.size.values();
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return Err(invalid_geometry(&raw.name, "non-finite element geometry"));
        }
        if width < 0.0 || height < 0.0 {
            return Err(invalid_geometry(
                &raw.name,
                format!("negative element size {width}x{height}"),
            ));
        }
        let tooltips = element
            .tooltips
            .into_iter()
            .map(|tooltip| convert_tooltip(tooltip, &raw.name))
            .collect::<Result<Vec<_>, _>>()?;
        anchors.push(Anchor {
            rect: Rect::from_position_size(Point::new(x, y), Size::new(width, height)),
            allow_overwrite: element.allow_overwrite,
            tooltips,
        });
    }
    let crop = raw.crop.map(convert_crop).transpose()?;
    Ok(Document {
        name: raw.name,
        anchors,
        crop,
    })
}

fn convert_tooltip(raw: RawTooltip, document: &str) -> Result<TooltipSpec, ParseError> {
    let lines = match raw.lines {
        Some(RawLines::One(text)) => text.lines().map(str::to_string).collect(),
        Some(RawLines::Many(lines)) => lines,
        None => Vec::new(),
    };
    let positions = match &raw.positions {
        Some(tags) => parse_tags(tags, Position::from_token, ParseError::UnknownPosition)?,
        None => Vec::new(),
    };
    let alignments = match &raw.alignments {
        Some(tags) => parse_tags(tags, Alignment::from_token, ParseError::UnknownAlignment)?,
        None => Vec::new(),
    };
    if let Some(margin) = raw.margin
        && (margin < 0.0 || !margin.is_finite())
    {
        return Err(invalid_geometry(document, format!("invalid tooltip margin {margin}")));
    }
    if let Some(width) = raw.width
        && (width <= 0.0 || !width.is_finite())
    {
        return Err(invalid_geometry(document, format!("invalid tooltip width {width}")));
    }
    Ok(TooltipSpec {
        lines,
        positions,
        alignments,
        margin: raw.margin,
        force: raw.force,
        width: raw.width,
    })
}

/// Declared order is kept; repeated tags are dropped.
fn parse_tags<T: PartialEq>(
    tags: &RawTags,
    parse: impl Fn(&str) -> Option<T>,
    unknown: impl Fn(String) -> ParseError,
) -> Result<Vec<T>, ParseError> {
    let mut values = Vec::new();
    for token in tags.tokens() {
        let value = parse(token).ok_or_else(|| unknown(token.to_string()))?;
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Ok(values)
}

fn convert_crop(raw: RawCrop) -> Result<Crop, ParseError> {
    match raw {
        RawCrop::All(edge) => {
            let edge = convert_crop_edge(&edge)?;
            Ok(Crop {
                left: edge,
                top: edge,
                right: edge,
                bottom: edge,
            })
        }
        RawCrop::Edges {
            left,
            top,
            right,
            bottom,
        } => {
            let edge = |raw: Option<RawCropEdge>| match raw {
                Some(raw) => convert_crop_edge(&raw),
                None => Ok(CropEdge::FitImage),
            };
            Ok(Crop {
                left: edge(left)?,
                top: edge(top)?,
                right: edge(right)?,
                bottom: edge(bottom)?,
            })
        }
    }
}

fn convert_crop_edge(raw: &RawCropEdge) -> Result<CropEdge, ParseError> {
    match raw {
        RawCropEdge::Number(value) if value.is_finite() => Ok(CropEdge::Fixed(*value)),
        RawCropEdge::Number(value) => Err(ParseError::InvalidCropEdge(value.to_string())),
        RawCropEdge::Keyword(word) => match word.trim().to_ascii_lowercase().as_str() {
            "content" | "fit" | "fit_content" => Ok(CropEdge::FitContent),
            "image" | "full" | "fit_image" => Ok(CropEdge::FitImage),
            _ => Err(ParseError::InvalidCropEdge(word.clone())),
        },
    }
}

fn invalid_geometry(document: &str, reason: impl Into<String>) -> ParseError {
    ParseError::InvalidGeometry {
        document: document.to_string(),
        reason: reason.into(),
    }
}
