use crate::geometry::Rect;
use crate::ir::Document;
use crate::layout::DocumentLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub document: String,
    pub bounds: [f32; 4],
    pub crop: Option<[f32; 4]>,
    /// `None` when a forced tooltip fell back to an infinite-penalty placement.
    pub total_penalty: Option<f32>,
    pub tooltips: Vec<TooltipDump>,
}

#[derive(Debug, Serialize)]
pub struct TooltipDump {
    pub anchor: usize,
    pub tooltip: usize,
    pub position: String,
    pub alignment: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub penalty: Option<f32>,
    pub lines: Vec<String>,
}

fn edges(rect: &Rect) -> [f32; 4] {
    [rect.left(), rect.top(), rect.right(), rect.bottom()]
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

impl LayoutDump {
    pub fn from_layout(layout: &DocumentLayout, document: &Document) -> Self {
        let tooltips = layout
            .tooltips
            .iter()
            .map(|placed| {
                let lines = document
                    .anchors
                    .get(placed.id.anchor)
                    .and_then(|anchor| anchor.tooltips.get(placed.id.tooltip))
                    .map(|spec| spec.lines.clone())
                    .unwrap_or_default();
                TooltipDump {
                    anchor: placed.id.anchor,
                    tooltip: placed.id.tooltip,
                    position: placed.position.to_string(),
                    alignment: placed.alignment.to_string(),
                    x: placed.rect.left(),
                    y: placed.rect.top(),
                    width: placed.rect.width(),
                    height: placed.rect.height(),
                    penalty: finite(placed.penalty),
                    lines,
                }
            })
            .collect();

        LayoutDump {
            document: layout.name.clone(),
            bounds: edges(&layout.bounds),
            crop: layout.crop.as_ref().map(edges),
            total_penalty: finite(layout.total_penalty),
            tooltips,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &DocumentLayout,
    document: &Document,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, document);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
