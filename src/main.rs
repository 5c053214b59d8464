mod app;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use hop_radar::capture::DirectorySource;
use hop_radar::config::RadarConfig;
use hop_radar::render::{Surface, plan_capture_cycle, plan_tree_cycle, tree_root, write_svg};
use hop_radar::snapshot::Snapshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{RadarApp, ViewMode};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding `<timestamp>-<name>.csv` hop tables.
    #[arg(long, default_value = "uploads")]
    captures_dir: PathBuf,
    /// Directory holding `<name>.trace` files; defaults to `traces` next to the captures.
    #[arg(long)]
    traces_dir: Option<PathBuf>,
    /// JSON file with radar settings.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ViewMode::Path)]
    mode: ViewMode,
    /// Hop address the tree view starts from.
    #[arg(long)]
    root: Option<String>,
    /// Write the print-size radar as SVG and exit.
    #[arg(long)]
    export_svg: Option<PathBuf>,
    /// Capture to export in path mode, by position.
    #[arg(long, default_value_t = 0)]
    capture: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RadarConfig::load(path)?,
        None => RadarConfig::default(),
    };
    if let Some(root) = &args.root {
        config.root_address = Some(root.clone());
    }
    if let Some(dir) = &args.traces_dir {
        config.traces_dir = Some(dir.clone());
    }

    let source = DirectorySource::new(&args.captures_dir, config.traces_dir_for(&args.captures_dir))
        .with_limit(config.capture_limit);

    if let Some(path) = &args.export_svg {
        return export_svg(&source, &config, &args, path);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1680.0, 1000.0]),
        ..Default::default()
    };
    let mode = args.mode;

    eframe::run_native(
        "hop-radar",
        options,
        Box::new(move |cc| Ok(Box::new(RadarApp::new(cc, source, config, mode)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hop_radar=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn export_svg(
    source: &DirectorySource,
    config: &RadarConfig,
    args: &Args,
    path: &Path,
) -> Result<()> {
    let snapshot = Snapshot::collect(source)?;
    let surface = Surface::PRINT;

    let plan = match args.mode {
        ViewMode::Tree => {
            let root = tree_root(&snapshot.graph, config)
                .ok_or_else(|| anyhow!("no capture has a usable hop to root the tree"))?;
            plan_tree_cycle(&snapshot.graph, root, config, &surface)
        }
        ViewMode::Path => {
            let capture = snapshot.captures.get(args.capture).ok_or_else(|| {
                anyhow!(
                    "capture {} requested but only {} loaded",
                    args.capture,
                    snapshot.captures.len()
                )
            })?;
            plan_capture_cycle(capture, config, &surface, Some(&snapshot.geocoder))
        }
    };

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_svg(plan.draw_instructions(), &surface, &mut writer)
        .and_then(|()| writer.flush().map_err(Into::into))
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), cues = plan.len(), "exported radar");
    Ok(())
}
