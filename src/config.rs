use crate::theme::{Color, TextAlign, Theme};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "skald.json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltySettings {
    /// Cost per pixel a tooltip is slid to stay inside the bounds.
    #[serde(rename = "move")]
    pub movement: f32,
}

impl Default for PenaltySettings {
    fn default() -> Self {
        Self { movement: 1.0 }
    }
}

/// What `force: true` on a tooltip does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceMode {
    /// The flag is carried but ignored; an unplaceable tooltip fails the document.
    #[default]
    Strict,
    /// A forced tooltip with no feasible candidate falls back to infinite-penalty
    /// placements that may leave the bounds or cover other anchors.
    Relaxed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Gap between a tooltip and its anchor, and between a tooltip and the edge.
    pub margin: f32,
    pub penalties: PenaltySettings,
    pub force_mode: ForceMode,
    /// Upper bound on candidates the global search may visit per document.
    pub search_budget: Option<usize>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            margin: 10.0,
            penalties: PenaltySettings::default(),
            force_mode: ForceMode::default(),
            search_budget: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub placement: PlacementConfig,
    /// Folder holding screenshots and their metadata.
    pub input: PathBuf,
    /// Folder the annotated documents are written to.
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::skald_default(),
            placement: PlacementConfig::default(),
            input: PathBuf::from("skald"),
            output: PathBuf::from("skald-docs"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Hex(String),
    Channels(Vec<u8>),
}

impl ColorValue {
    fn to_color(&self) -> anyhow::Result<Color> {
        let color = match self {
            ColorValue::Hex(value) => Color::from_hex(value),
            ColorValue::Channels(channels) => Color::from_channels(channels),
        };
        color.ok_or_else(|| anyhow::anyhow!("invalid color: {:?}", self))
    }
}

#[derive(Debug, Deserialize, Default)]
struct FontConfigFile {
    path: Option<PathBuf>,
    family: Option<String>,
    size: Option<f32>,
    color: Option<ColorValue>,
}

#[derive(Debug, Deserialize, Default)]
struct TooltipConfigFile {
    line_spacing: Option<f32>,
    padding: Option<f32>,
    margin: Option<f32>,
    color: Option<ColorValue>,
    text_align: Option<TextAlign>,
}

#[derive(Debug, Deserialize, Default)]
struct PenaltiesConfigFile {
    #[serde(rename = "move")]
    movement: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct PlacementConfigFile {
    force_mode: Option<ForceMode>,
    search_budget: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    font: Option<FontConfigFile>,
    tooltip: Option<TooltipConfigFile>,
    penalties: Option<PenaltiesConfigFile>,
    placement: Option<PlacementConfigFile>,
    folder: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

/// Resolve where the configuration lives: `None` means the working directory,
/// a directory means `skald.json` inside it.
pub fn config_path(path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let base = match path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if base.is_dir() {
        Ok(base.join(CONFIG_FILE_NAME))
    } else {
        Ok(base)
    }
}

/// Load the configuration, falling back to defaults when no file exists.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = config_path(path)?;
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    parse_config(&contents)
        .map_err(|err| anyhow::anyhow!("failed to read config {}: {err}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    // Plain JSON first; json5 accepts comments and trailing commas.
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|err| anyhow::anyhow!("{json_err}; json5: {err}"))?,
    };
    apply_config_file(Config::default(), parsed)
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> anyhow::Result<Config> {
    if let Some(font) = parsed.font {
        if let Some(v) = font.path {
            config.theme.font_path = Some(v);
        }
        if let Some(v) = font.family {
            config.theme.font_family = v;
        }
        if let Some(v) = font.size {
            config.theme.font_size = v;
        }
        if let Some(v) = font.color {
            config.theme.font_color = v.to_color()?;
        }
    }

    if let Some(tooltip) = parsed.tooltip {
        if let Some(v) = tooltip.line_spacing {
            config.theme.line_spacing = v;
        }
        if let Some(v) = tooltip.padding {
            config.theme.padding = v;
        }
        if let Some(v) = tooltip.margin {
            if v < 0.0 || !v.is_finite() {
                anyhow::bail!("tooltip.margin must be a non-negative number, got {v}");
            }
            config.placement.margin = v;
        }
        if let Some(v) = tooltip.color {
            config.theme.tooltip_color = v.to_color()?;
        }
        if let Some(v) = tooltip.text_align {
            config.theme.text_align = v;
        }
    }

    if let Some(penalties) = parsed.penalties
        && let Some(v) = penalties.movement
    {
        if v < 0.0 || !v.is_finite() {
            anyhow::bail!("penalties.move must be a non-negative number, got {v}");
        }
        config.placement.penalties.movement = v;
    }

    if let Some(placement) = parsed.placement {
        if let Some(v) = placement.force_mode {
            config.placement.force_mode = v;
        }
        if placement.search_budget.is_some() {
            config.placement.search_budget = placement.search_budget;
        }
    }

    if let Some(folder) = parsed.folder {
        config.input = folder;
    }
    if let Some(input) = parsed.input {
        config.input = input;
    }
    if let Some(output) = parsed.output {
        config.output = output;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_keeps_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.placement.margin, 10.0);
        assert_eq!(config.placement.penalties.movement, 1.0);
        assert_eq!(config.placement.force_mode, ForceMode::Strict);
        assert_eq!(config.theme.font_size, 15.0);
        assert_eq!(config.theme.tooltip_color, Color::rgba(50, 50, 185, 255));
        assert_eq!(config.input, PathBuf::from("skald"));
    }

    #[test]
    fn reads_sections() {
        let config = parse_config(
            r##"{
                "font": {"size": 12, "color": [0, 0, 0]},
                "tooltip": {"margin": 4, "padding": 2, "color": "#10203040"},
                "penalties": {"move": 0.5},
                "placement": {"force_mode": "relaxed", "search_budget": 5000},
                "folder": "shots"
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.font_size, 12.0);
        assert_eq!(config.theme.font_color, Color::rgba(0, 0, 0, 255));
        assert_eq!(config.theme.tooltip_color, Color::rgba(16, 32, 48, 64));
        assert_eq!(config.theme.padding, 2.0);
        assert_eq!(config.placement.margin, 4.0);
        assert_eq!(config.placement.penalties.movement, 0.5);
        assert_eq!(config.placement.force_mode, ForceMode::Relaxed);
        assert_eq!(config.placement.search_budget, Some(5000));
        assert_eq!(config.input, PathBuf::from("shots"));
    }

    #[test]
    fn accepts_json5() {
        let config = parse_config(
            r#"{
                // lenient syntax
                tooltip: { margin: 6, },
            }"#,
        )
        .unwrap();
        assert_eq!(config.placement.margin, 6.0);
    }

    #[test]
    fn rejects_bad_color() {
        assert!(parse_config(r#"{"font": {"color": "blue"}}"#).is_err());
    }

    #[test]
    fn rejects_negative_move_penalty() {
        assert!(parse_config(r#"{"penalties": {"move": -1}}"#).is_err());
    }

    #[test]
    fn rejects_negative_margin() {
        assert!(parse_config(r#"{"tooltip": {"margin": -20}}"#).is_err());
        assert!(parse_config(r#"{"tooltip": {"margin": 0}}"#).is_ok());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = std::env::temp_dir().join("skald-config-test-missing");
        let config = load_config(Some(&dir.join("nope.json"))).unwrap();
        assert_eq!(config.placement.margin, 10.0);
    }
}
