use crate::geometry::{Point, Rect, Size};
use crate::ir::Document;
use crate::layout::{DocumentLayout, PlacedTooltip, TextBlock};
use crate::text_metrics::TextMeasurer;
use crate::theme::{TextAlign, Theme};
use anyhow::{Context, Result};
use std::path::Path;

/// Overlay the placed tooltips on the screenshot at `image_href`.
///
/// The screenshot is referenced, not embedded. When the layout carries a crop
/// rectangle the view box is narrowed to it.
pub fn render_svg(
    layout: &DocumentLayout,
    document: &Document,
    image_href: &str,
    image: Size,
    measurer: &TextMeasurer,
) -> String {
    let theme = measurer.theme();
    let view = layout.crop.unwrap_or_else(|| Rect::from_size(image));
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.2}\" height=\"{:.2}\" viewBox=\"{:.2} {:.2} {:.2} {:.2}\">",
        view.width(),
        view.height(),
        view.left(),
        view.top(),
        view.width(),
        view.height(),
    ));
    svg.push_str(&format!(
        "<image href=\"{}\" x=\"0\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\"/>",
        escape_xml(image_href),
        image.width,
        image.height
    ));

    for placed in &layout.tooltips {
        let Some(spec) = document
            .anchors
            .get(placed.id.anchor)
            .and_then(|anchor| anchor.tooltips.get(placed.id.tooltip))
        else {
            continue;
        };
        let block = measurer.measure_lines(spec);
        svg.push_str(&tooltip_svg(placed, &block, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn tooltip_svg(placed: &PlacedTooltip, block: &TextBlock, theme: &Theme) -> String {
    let rect = placed.rect;
    let mut out = String::new();
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" fill-opacity=\"{:.3}\"/>",
        rect.left(),
        rect.top(),
        rect.width(),
        rect.height(),
        theme.tooltip_color.to_svg(),
        theme.tooltip_color.opacity()
    ));
    for (line, offset) in block.lines.iter().zip(line_offsets(block, theme)) {
        let origin = rect.position() + offset;
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"hanging\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" fill-opacity=\"{:.3}\">{}</text>",
            origin.x,
            origin.y,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.font_color.to_svg(),
            theme.font_color.opacity(),
            escape_xml(line)
        ));
    }
    out
}

/// Top-left corner of each line relative to the tooltip box.
pub fn line_offsets(block: &TextBlock, theme: &Theme) -> Vec<Point> {
    let mut offsets = Vec::with_capacity(block.line_sizes.len());
    let mut y = theme.padding;
    for line in &block.line_sizes {
        let slack = block.width - line.width;
        let x = theme.padding
            + match theme.text_align {
                TextAlign::Left => 0.0,
                TextAlign::Center => slack / 2.0,
                TextAlign::Right => slack,
            };
        offsets.push(Point::new(x, y));
        y += line.height + theme.line_spacing;
    }
    offsets
}

/// Write `svg` to `output`, or to stdout without one.
pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, svg)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
