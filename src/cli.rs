use crate::config::{Config, ForceMode, load_config};
use crate::geometry::Size;
use crate::ir::Screenshot;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::log::{debug, warn};
use crate::parser::load_screenshot;
use crate::render::{render_svg, write_output_svg};
use crate::text_metrics::TextMeasurer;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

#[derive(Parser, Debug)]
#[command(name = "skald", version, about = "Annotate screenshots with tooltips")]
pub struct Args {
    /// Screenshot folder, or a single metadata .json file
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Folder the annotated documents are written to
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config file, or a folder containing skald.json
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Gap between tooltip and anchor, and between tooltip and edge
    #[arg(long = "margin")]
    pub margin: Option<f32>,

    /// Penalty per pixel a tooltip is moved to stay in bounds
    #[arg(long = "move-penalty")]
    pub move_penalty: Option<f32>,

    /// How `force: true` tooltips are treated
    #[arg(long = "force-mode", value_enum)]
    pub force_mode: Option<ForceModeArg>,

    /// Give up on a document after visiting this many candidates
    #[arg(long = "search-budget")]
    pub search_budget: Option<usize>,

    /// Also write the placement result as JSON next to each SVG
    #[arg(long = "dump-layout")]
    pub dump_layout: bool,

    /// Estimate text widths instead of loading fonts
    #[arg(long = "fast-text")]
    pub fast_text: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ForceModeArg {
    Strict,
    Relaxed,
}

impl From<ForceModeArg> for ForceMode {
    fn from(value: ForceModeArg) -> Self {
        match value {
            ForceModeArg::Strict => ForceMode::Strict,
            ForceModeArg::Relaxed => ForceMode::Relaxed,
        }
    }
}

/// A metadata file and the screenshot it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotFiles {
    pub image: PathBuf,
    pub metadata: PathBuf,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = resolve_config(&args)?;

    let inputs = if config.input.is_file() {
        vec![config.input.clone()]
    } else {
        discover_screenshots(&config.input)?
            .into_iter()
            .map(|files| files.metadata)
            .collect()
    };
    if inputs.is_empty() {
        return Err(anyhow::anyhow!(
            "No screenshots with metadata found in {}",
            config.input.display()
        ));
    }

    let measurer = if args.fast_text {
        TextMeasurer::estimating(&config.theme)
    } else {
        TextMeasurer::new(&config.theme)
    };
    let mut total = 0;
    let mut failed = 0;
    for meta_path in &inputs {
        let screenshot = match load_screenshot(meta_path) {
            Ok(screenshot) => screenshot,
            Err(err) => {
                eprintln!("error: {err:#}");
                failed += 1;
                total += 1;
                continue;
            }
        };
        let (documents, errors) = process_screenshot(&screenshot, &config, &measurer, &args);
        total += documents;
        failed += errors;
    }

    if failed > 0 {
        return Err(anyhow::anyhow!("{failed} of {total} documents failed"));
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(input) = &args.input {
        config.input = input.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(margin) = args.margin {
        if margin < 0.0 || !margin.is_finite() {
            anyhow::bail!("--margin must be a non-negative number, got {margin}");
        }
        config.placement.margin = margin;
    }
    if let Some(movement) = args.move_penalty {
        if movement < 0.0 || !movement.is_finite() {
            anyhow::bail!("--move-penalty must be a non-negative number, got {movement}");
        }
        config.placement.penalties.movement = movement;
    }
    if let Some(mode) = args.force_mode {
        config.placement.force_mode = mode.into();
    }
    if args.search_budget.is_some() {
        config.placement.search_budget = args.search_budget;
    }
    Ok(config)
}

/// Place and render every document of one screenshot, returning the number of
/// documents and how many of them failed.
fn process_screenshot(
    screenshot: &Screenshot,
    config: &Config,
    measurer: &TextMeasurer,
    args: &Args,
) -> (usize, usize) {
    let image_path = screenshot.image_path();
    let image = match image_size(&image_path, screenshot.image_size) {
        Ok(size) => size,
        Err(err) => {
            eprintln!("error: {err:#}");
            return (screenshot.documents.len(), screenshot.documents.len());
        }
    };
    let href = std::fs::canonicalize(&image_path).unwrap_or_else(|_| image_path.clone());
    let href = href.to_string_lossy();

    let outputs = output_files(&image_path, screenshot, config);
    let mut failed = 0;
    for (document, output) in screenshot.documents.iter().zip(outputs) {
        let result = compute_layout(document, image, measurer, &config.placement)
            .with_context(|| {
                format!(
                    "screenshot {} document {}",
                    screenshot.name, document.name
                )
            })
            .and_then(|layout| {
                let svg = render_svg(&layout, document, &href, image, measurer);
                write_output_svg(&svg, Some(output.as_path()))?;
                if args.dump_layout {
                    write_layout_dump(&output.with_extension("layout.json"), &layout, document)?;
                }
                Ok(())
            });
        match result {
            Ok(()) => {
                debug!(output = %output.display(), "wrote document");
            }
            Err(err) => {
                warn!(document = %document.name, "document failed");
                eprintln!("error: {err:#}");
                failed += 1;
            }
        }
    }
    (screenshot.documents.len(), failed)
}

/// Pair every `.json` file under `root` with a `.png` of the same stem in the
/// same folder. Results are sorted by metadata path.
pub fn discover_screenshots(root: &Path) -> Result<Vec<ScreenshotFiles>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("failed to read {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                let image = path.with_extension("png");
                if image.is_file() {
                    found.push(ScreenshotFiles {
                        image,
                        metadata: path,
                    });
                }
            }
        }
    }
    found.sort_by(|a, b| a.metadata.cmp(&b.metadata));
    Ok(found)
}

/// `<output>/<image dir relative to input>/<image stem>_<document>.svg`
pub fn output_file(image_path: &Path, document: &str, config: &Config) -> PathBuf {
    let relative_dir = image_path
        .parent()
        .and_then(|dir| dir.strip_prefix(&config.input).ok())
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let stem = image_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "screenshot".to_string());
    let document = UNSAFE_FILE_CHARS_RE.replace_all(document.trim(), "_");
    config
        .output
        .join(relative_dir)
        .join(format!("{stem}_{document}.svg"))
}

/// Output paths for every document of `screenshot`. Names that sanitize to the
/// same file get a numeric suffix so no document overwrites another.
fn output_files(image_path: &Path, screenshot: &Screenshot, config: &Config) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    let mut outputs = Vec::with_capacity(screenshot.documents.len());
    for document in &screenshot.documents {
        let base = output_file(image_path, &document.name, config);
        let stem = base
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut output = base.clone();
        let mut suffix = 2;
        // Compare case-insensitively for case-folding file systems.
        while !taken.insert(output.to_string_lossy().to_lowercase()) {
            output = base.with_file_name(format!("{stem}_{suffix}.svg"));
            suffix += 1;
        }
        if output != base {
            warn!(
                document = %document.name,
                output = %output.display(),
                "document file name already used"
            );
        }
        outputs.push(output);
    }
    outputs
}

/// Screenshot size from the image header, or `image_size` from the metadata
/// when the image cannot be read.
fn image_size(image_path: &Path, declared: Option<Size>) -> Result<Size> {
    match image::image_dimensions(image_path) {
        Ok((width, height)) => Ok(Size::new(width as f32, height as f32)),
        Err(err) => declared.ok_or_else(|| {
            anyhow::anyhow!(
                "cannot determine the size of {}: {err} (and no image_size in metadata)",
                image_path.display()
            )
        }),
    }
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
fn init_tracing() {}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::new(width, height).save(path).unwrap();
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("skald-cli-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn image_size_prefers_the_image_header() {
        let dir = temp_dir("size");
        let path = dir.join("shot.png");
        write_png(&path, 64, 48);
        let declared = Some(Size::new(1.0, 1.0));
        assert_eq!(image_size(&path, declared).unwrap(), Size::new(64.0, 48.0));

        let missing = dir.join("missing.png");
        assert_eq!(image_size(&missing, declared).unwrap(), Size::new(1.0, 1.0));
        assert!(image_size(&missing, None).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn colliding_document_names_get_distinct_files() {
        let config = Config {
            input: PathBuf::from("shots"),
            output: PathBuf::from("docs"),
            ..Config::default()
        };
        let mut screenshot = Screenshot {
            name: "page".to_string(),
            path: PathBuf::from("shots"),
            image_size: None,
            documents: Vec::new(),
        };
        for name in ["a b", "a_b", "A b", "c"] {
            screenshot.documents.push(crate::ir::Document::new(name));
        }
        let outputs = output_files(Path::new("shots/page.png"), &screenshot, &config);
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("docs/page_a_b.svg"),
                PathBuf::from("docs/page_a_b_2.svg"),
                PathBuf::from("docs/page_A_b_3.svg"),
                PathBuf::from("docs/page_c.svg"),
            ]
        );
    }

    #[test]
    fn rejects_negative_margin_flag() {
        let args = Args::parse_from(["skald", "--margin=-20", "-c", "/nonexistent/skald.json"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn output_file_mirrors_input_tree() {
        let config = Config {
            input: PathBuf::from("shots"),
            output: PathBuf::from("docs"),
            ..Config::default()
        };
        let output = output_file(Path::new("shots/settings/page.png"), "First run", &config);
        assert_eq!(output, PathBuf::from("docs/settings/page_First_run.svg"));
    }

    #[test]
    fn cli_overrides_config() {
        let args = Args::parse_from([
            "skald",
            "--margin",
            "4",
            "--move-penalty",
            "0.5",
            "--force-mode",
            "relaxed",
            "--search-budget",
            "100",
            "-c",
            "/nonexistent/skald.json",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.placement.margin, 4.0);
        assert_eq!(config.placement.penalties.movement, 0.5);
        assert_eq!(config.placement.force_mode, ForceMode::Relaxed);
        assert_eq!(config.placement.search_budget, Some(100));
    }

    #[test]
    fn discovery_pairs_json_with_png() {
        let dir = temp_dir("discover");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("a.json"), "{}").unwrap();
        write_png(&dir.join("a.png"), 10, 10);
        std::fs::write(dir.join("lonely.json"), "{}").unwrap();
        std::fs::write(dir.join("nested/b.json"), "{}").unwrap();
        write_png(&dir.join("nested/b.png"), 10, 10);

        let found = discover_screenshots(&dir).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].metadata, dir.join("a.json"));
        assert_eq!(found[1].image, dir.join("nested/b.png"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn renders_a_screenshot_folder() {
        let dir = temp_dir("render");
        write_png(&dir.join("login.png"), 400, 300);
        std::fs::write(
            dir.join("login.json"),
            r#"{"name": "login", "documents": [
                {"name": "ok", "elements": [{"location": [100, 100], "size": [50, 20],
                  "tooltips": [{"lines": ["Sign in"], "positions": "right"}]}]},
                {"name": "impossible", "elements": [{"location": [380, 100], "size": [20, 20],
                  "tooltips": [{"lines": ["Nope"], "positions": "right"}]}]}
            ]}"#,
        )
        .unwrap();
        let config = Config {
            input: dir.clone(),
            output: dir.join("out"),
            ..Config::default()
        };
        let args = Args::parse_from(["skald", "--dump-layout"]);
        let screenshot = load_screenshot(&dir.join("login.json")).unwrap();
        let measurer = TextMeasurer::estimating(&config.theme);
        let (documents, failed) = process_screenshot(&screenshot, &config, &measurer, &args);
        assert_eq!((documents, failed), (2, 1));

        let svg = std::fs::read_to_string(dir.join("out/login_ok.svg")).unwrap();
        assert!(svg.contains("Sign in"));
        assert!(dir.join("out/login_ok.layout.json").is_file());
        assert!(!dir.join("out/login_impossible.svg").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
