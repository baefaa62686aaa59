use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use planmark::{parse, FormatHint, MarkupOverlayEngine, Viewport};

#[derive(Parser)]
#[command(
    name = "planmark",
    about = "Inspect and project markup overlay documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show layers, items, and warnings of a markup file
    Info {
        /// Input markup file (.xml or .json)
        input: PathBuf,

        /// List every item of every layer
        #[arg(short, long)]
        detailed: bool,
    },

    /// Parse only; exit nonzero on structural failure
    Validate {
        /// Input markup file
        input: PathBuf,
    },

    /// Project one page's overlay to screen space and emit it as JSON
    Render {
        /// Input markup file
        input: PathBuf,

        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Zoom factor
        #[arg(short, long, default_value = "1.0")]
        zoom: f64,

        /// Native page width in base-document units
        #[arg(long, default_value = "612.0")]
        page_width: f64,

        /// Native page height in base-document units
        #[arg(long, default_value = "792.0")]
        page_height: f64,

        /// Output JSON file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Info { input, detailed } => {
            print!("{}", info_report(&input, detailed)?);
        }
        Commands::Validate { input } => {
            let report = validate_report(&input)?;
            print!("{report}");
        }
        Commands::Render {
            input,
            page,
            zoom,
            page_width,
            page_height,
            output,
        } => {
            let json = render_overlay(&input, page, zoom, page_width, page_height)?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<(Vec<u8>, Option<FormatHint>)> {
    let raw = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let hint = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(FormatHint::from_extension);
    Ok((raw, hint))
}

fn info_report(path: &Path, detailed: bool) -> Result<String> {
    let (raw, hint) = load(path)?;
    let output = parse(&raw, hint)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mut report = String::new();
    report.push_str(&format!("Format: {:?}\n", output.format));
    report.push_str(&format!("Layers: {}\n", output.document.layers.len()));
    report.push_str(&format!("Items: {}\n", output.document.item_count()));
    for layer in &output.document.layers {
        report.push_str(&format!(
            "  {} ({}): {} items, default color {}\n",
            layer.name,
            layer.id,
            layer.items.len(),
            layer.default_color
        ));
        if detailed {
            for item in &layer.items {
                report.push_str(&format!(
                    "    {} [{}] page {} ({} points){}\n",
                    item.id,
                    item.kind.as_str(),
                    item.page_number,
                    item.geometry.len(),
                    item.label
                        .as_deref()
                        .map(|l| format!(" label \"{l}\""))
                        .unwrap_or_default()
                ));
            }
        }
    }
    if !output.warnings.is_empty() {
        report.push_str(&format!("Warnings: {}\n", output.warnings.len()));
        for warning in &output.warnings {
            report.push_str(&format!("  {warning}\n"));
        }
    }
    Ok(report)
}

fn validate_report(path: &Path) -> Result<String> {
    let (raw, hint) = load(path)?;
    let output = parse(&raw, hint)
        .with_context(|| format!("{} is not a valid markup document", path.display()))?;
    let mut report = format!(
        "OK: {} layers, {} items\n",
        output.document.layers.len(),
        output.document.item_count()
    );
    for warning in &output.warnings {
        report.push_str(&format!("warning: {warning}\n"));
    }
    Ok(report)
}

fn render_overlay(
    path: &Path,
    page: u32,
    zoom: f64,
    page_width: f64,
    page_height: f64,
) -> Result<String> {
    let (raw, hint) = load(path)?;
    let mut engine = MarkupOverlayEngine::new();
    engine
        .load_markup(&raw, hint)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let viewport = Viewport::new(
        zoom,
        page_width,
        page_height,
        page_width * zoom,
        page_height * zoom,
    )?;
    let shapes = engine.overlay_for_page(page, &viewport);
    Ok(serde_json::to_string_pretty(&shapes)?)
}
