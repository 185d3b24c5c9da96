//! Text measurement for tooltip boxes.
//!
//! The placement engine only consumes the outer [`Size`] of each tooltip via
//! [`TooltipMeasure`]; this module is the default implementation, backed by a
//! real font when one can be found and by a width estimate otherwise.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use ttf_parser::Face;

use crate::geometry::Size;
use crate::ir::TooltipSpec;
use crate::layout::TextBlock;
use crate::log::warn;
use crate::theme::Theme;

/// Supplies the outer size of a tooltip box, padding included.
pub trait TooltipMeasure {
    fn tooltip_size(&self, tooltip: &TooltipSpec) -> Size;
}

impl<F> TooltipMeasure for F
where
    F: Fn(&TooltipSpec) -> Size,
{
    fn tooltip_size(&self, tooltip: &TooltipSpec) -> Size {
        self(tooltip)
    }
}

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

/// Measures tooltip text with the theme's font.
#[derive(Debug, Clone)]
pub struct TextMeasurer {
    theme: Theme,
    /// Skip font lookup and always estimate.
    fast: bool,
}

impl TextMeasurer {
    pub fn new(theme: &Theme) -> Self {
        Self {
            theme: theme.clone(),
            fast: false,
        }
    }

    /// A measurer that never touches font files.
    pub fn estimating(theme: &Theme) -> Self {
        Self {
            theme: theme.clone(),
            fast: true,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn measure_lines(&self, tooltip: &TooltipSpec) -> TextBlock {
        let mut lines = Vec::new();
        for line in &tooltip.lines {
            match tooltip.width {
                Some(max_width) => lines.extend(self.wrap_line(line, max_width)),
                None => lines.push(line.clone()),
            }
        }
        if lines.is_empty() {
            lines.push(String::new());
        }

        let line_height = self.line_height();
        let line_sizes: Vec<Size> = lines
            .iter()
            .map(|line| Size::new(self.text_width(line), line_height))
            .collect();
        let width = line_sizes.iter().map(|size| size.width).fold(0.0, f32::max);
        let height = line_sizes.iter().map(|size| size.height).sum::<f32>()
            + (line_sizes.len().saturating_sub(1)) as f32 * self.theme.line_spacing;

        TextBlock {
            lines,
            line_sizes,
            width,
            height,
        }
    }

    fn wrap_line(&self, line: &str, max_width: f32) -> Vec<String> {
        if self.text_width(line) <= max_width {
            return vec![line.to_string()];
        }
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in line.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.text_width(&candidate) > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn text_width(&self, text: &str) -> f32 {
        let font_size = self.theme.font_size;
        if text.is_empty() || font_size <= 0.0 {
            return 0.0;
        }
        if self.fast {
            return estimate_text_width(text, font_size);
        }
        with_font(&self.theme, |face| face.measure_width(text, font_size))
            .flatten()
            .unwrap_or_else(|| estimate_text_width(text, font_size))
    }

    fn line_height(&self) -> f32 {
        let font_size = self.theme.font_size.max(0.0);
        if self.fast {
            return font_size * DEFAULT_LINE_HEIGHT;
        }
        with_font(&self.theme, |face| face.line_height(font_size))
            .unwrap_or(font_size * DEFAULT_LINE_HEIGHT)
    }
}

impl TooltipMeasure for TextMeasurer {
    fn tooltip_size(&self, tooltip: &TooltipSpec) -> Size {
        self.measure_lines(tooltip).size().padded(self.theme.padding)
    }
}

const DEFAULT_LINE_HEIGHT: f32 = 1.2;

fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.32,
        'i' | 'j' | 'l' | '|' | '!' | '.' | ',' | ':' | ';' | '\'' => 0.28,
        'f' | 'r' | 't' | '(' | ')' | '[' | ']' => 0.38,
        'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.9,
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.64,
        c if c.is_ascii() => 0.56,
        // CJK and other wide scripts.
        _ => 1.0,
    }
}

fn with_font<T>(theme: &Theme, f: impl FnOnce(&FontFace) -> T) -> Option<T> {
    let mut cache = FONT_CACHE.lock().ok()?;
    let face = cache.face(theme)?;
    Some(f(face))
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn face(&mut self, theme: &Theme) -> Option<&FontFace> {
        let key = match &theme.font_path {
            Some(path) => format!("path:{}", path.display()),
            None => format!("family:{}", theme.font_family.trim()),
        };
        if !self.faces.contains_key(&key) {
            let face = match &theme.font_path {
                Some(path) => load_font_file(path),
                None => self.load_family(&theme.font_family),
            };
            self.faces.insert(key.clone(), face);
        }
        self.faces.get(&key).and_then(Option::as_ref)
    }

    fn load_family(&mut self, font_family: &str) -> Option<FontFace> {
        let mut names: Vec<&str> = Vec::new();
        let mut generic: Vec<Family<'static>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            match raw.to_ascii_lowercase().as_str() {
                "" => {}
                "serif" => generic.push(Family::Serif),
                "sans-serif" | "system-ui" => generic.push(Family::SansSerif),
                "monospace" => generic.push(Family::Monospace),
                _ => names.push(raw),
            }
        }
        let mut families: Vec<Family<'_>> = names.into_iter().map(Family::Name).collect();
        families.extend(generic);
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

fn load_font_file(path: &Path) -> Option<FontFace> {
    match std::fs::read(path) {
        Ok(bytes) => FontFace::parse(bytes, 0),
        Err(err) => {
            warn!(path = %path.display(), %err, "cannot read font file");
            None
        }
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    /// Ascender minus descender plus line gap, in font units.
    line_units: f32,
    ascii_advances: [u16; 128],
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1) as f32;
        let line_units =
            face.ascender() as f32 - face.descender() as f32 + face.line_gap() as f32;
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            line_units,
            ascii_advances,
        })
    }

    fn line_height(&self, font_size: f32) -> f32 {
        if self.line_units <= 0.0 {
            return font_size * DEFAULT_LINE_HEIGHT;
        }
        self.line_units * font_size / self.units_per_em
    }

    fn measure_width(&self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * 0.56;
        if text.is_ascii() {
            let width = text
                .bytes()
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => fallback,
                    advance => advance as f32 * scale,
                })
                .sum::<f32>();
            return Some(width);
        }
        let face = Face::parse(&self.data, self.index).ok()?;
        let width = text
            .chars()
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map_or(fallback, |advance| advance as f32 * scale)
            })
            .sum::<f32>();
        Some(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurer() -> TextMeasurer {
        TextMeasurer::estimating(&Theme::skald_default())
    }

    #[test]
    fn block_height_includes_line_spacing() {
        let theme = Theme::skald_default();
        let block = measurer().measure_lines(&TooltipSpec::new(["one", "two", "three"]));
        let line = theme.font_size * DEFAULT_LINE_HEIGHT;
        assert_eq!(block.lines.len(), 3);
        assert!((block.height - (line * 3.0 + theme.line_spacing * 2.0)).abs() < 1e-4);
    }

    #[test]
    fn block_width_is_widest_line() {
        let block = measurer().measure_lines(&TooltipSpec::new(["a", "a much longer line"]));
        assert_eq!(block.width, block.line_sizes[1].width);
        assert!(block.line_sizes[0].width < block.width);
    }

    #[test]
    fn width_override_wraps() {
        let mut tooltip = TooltipSpec::new(["this is a rather long line that should wrap"]);
        tooltip.width = Some(80.0);
        let block = measurer().measure_lines(&tooltip);
        assert!(block.lines.len() > 1, "expected wrapping, got {:?}", block.lines);
        assert!(block.lines.iter().all(|line| !line.is_empty()));
    }

    #[test]
    fn empty_tooltip_has_one_empty_line() {
        let block = measurer().measure_lines(&TooltipSpec::default());
        assert_eq!(block.lines, vec![String::new()]);
        assert_eq!(block.width, 0.0);
    }

    #[test]
    fn tooltip_size_adds_padding() {
        let theme = Theme::skald_default();
        let measurer = measurer();
        let tooltip = TooltipSpec::new(["Save"]);
        let block = measurer.measure_lines(&tooltip);
        let size = measurer.tooltip_size(&tooltip);
        assert_eq!(size.width, block.width + theme.padding * 2.0);
        assert_eq!(size.height, block.height + theme.padding * 2.0);
    }

    #[test]
    fn closures_are_measures() {
        let fixed = |_: &TooltipSpec| Size::new(40.0, 20.0);
        assert_eq!(fixed.tooltip_size(&TooltipSpec::default()), Size::new(40.0, 20.0));
    }

    #[test]
    fn estimate_scales_with_font_size() {
        let w16 = estimate_text_width("Hello", 16.0);
        let w32 = estimate_text_width("Hello", 32.0);
        assert!((w32 - w16 * 2.0).abs() < 0.01);
    }
}
