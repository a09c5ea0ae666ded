mod host;
mod replay;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use pdfpick_core::{
    CoordinateMapper, DocumentEngine, DocumentRect, Link, PixelRect, PixelSize,
    SelectionController, ViewerConfig,
};
use pdfpick_render::{PdfiumEngine, PdfiumEngineFactory};
use serde::Serialize;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::host::{CliHost, HostOptions};
use crate::replay::Replayer;

#[derive(Debug, Parser)]
#[command(
    name = "pdfpick",
    version,
    about = "Text selection and link inspection for PDF documents"
)]
struct Args {
    /// Configuration file [default: config.toml in the platform config directory]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the text of one page or of the whole document
    Text {
        file: PathBuf,

        /// Page to select (0-based); the whole document when omitted
        #[arg(short = 'p', long = "page")]
        page: Option<usize>,

        /// Also copy the text to the system clipboard
        #[arg(long)]
        copy: bool,
    },

    /// List links as JSON lines, with bounds in view pixels
    Links {
        file: PathBuf,

        /// Page to inspect (0-based); every page when omitted
        #[arg(short = 'p', long = "page")]
        page: Option<usize>,

        /// View width in pixels [default: the page width in points]
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// View height in pixels [default: the page height in points]
        #[arg(long, requires = "width")]
        height: Option<u32>,
    },

    /// Feed a JSON-lines script of input events through the selection engine
    Replay {
        file: PathBuf,

        script: PathBuf,

        /// Override the configured link following
        #[arg(long)]
        follow_links: Option<bool>,

        /// Write copied text to the system clipboard for as long as the replay runs
        #[arg(long)]
        clipboard: bool,

        /// Open activated link URIs with the platform opener
        #[arg(long)]
        launch: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let project_dirs = ProjectDirs::from("net", "pdfpick", "pdfpick")
        .ok_or_else(|| anyhow!("unable to resolve platform data directories"))?;
    let _log_guard = init_logging(&project_dirs)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| project_dirs.config_dir().join("config.toml"));
    let mut config = ViewerConfig::load(&config_path)
        .with_context(|| format!("failed to load configuration from {:?}", config_path))?;

    let factory = PdfiumEngineFactory::new()?;
    match args.command {
        Command::Text { file, page, copy } => {
            let engine = open(&factory, &file)?;
            print_text(config, engine, page, copy)
        }
        Command::Links {
            file,
            page,
            width,
            height,
        } => {
            let engine = open(&factory, &file)?;
            let view = width.zip(height).map(|(w, h)| PixelSize::new(w, h));
            print_links(&config, &engine, page, view)
        }
        Command::Replay {
            file,
            script,
            follow_links,
            clipboard,
            launch,
        } => {
            if let Some(follow) = follow_links {
                config.follow_links = follow;
            }
            let script = fs::read_to_string(&script)
                .with_context(|| format!("failed to read script {:?}", script))?;
            let engine = open(&factory, &file)?;
            let zoom = config.zoom;
            let mut replayer = Replayer::new(SelectionController::with_document(config, engine), zoom);
            let mut host = CliHost::new(HostOptions {
                clipboard,
                launch,
                wait_for_handoff: false,
            });
            replay::run(&mut replayer, &mut host, &script, io::stdout().lock())?;
            info!(
                page = host.current_page(),
                selected = replayer.controller().is_text_selected(),
                "replay finished"
            );
            Ok(())
        }
    }
}

fn open(factory: &PdfiumEngineFactory, path: &Path) -> Result<PdfiumEngine> {
    factory
        .open(path)
        .with_context(|| format!("failed to open {:?}", path))
}

fn print_text(config: ViewerConfig, engine: PdfiumEngine, page: Option<usize>, copy: bool) -> Result<()> {
    let page_count = engine.page_count();
    let mut controller = SelectionController::with_document(config, engine);
    let selected = match page {
        Some(page) => controller.select_page(page),
        None => controller.select_all(),
    };
    if !selected {
        bail!(
            "page {} is out of range ({} pages)",
            page.unwrap_or_default(),
            page_count
        );
    }

    let text = controller.selected_text().unwrap_or_default();
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")?;

    if copy {
        let mut host = CliHost::new(HostOptions::one_shot_copy());
        if !controller.copy_selection(&mut host) {
            warn!("nothing selected to copy");
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct LinkRecord {
    page: usize,
    bounds: DocumentRect,
    view: PixelSize,
    view_bounds: Option<PixelRect>,
    #[serde(flatten)]
    target: LinkTarget,
}

#[derive(Debug, Serialize)]
struct LinkTarget {
    target_page: Option<usize>,
    uri: Option<String>,
}

fn print_links(
    config: &ViewerConfig,
    engine: &PdfiumEngine,
    page: Option<usize>,
    view: Option<PixelSize>,
) -> Result<()> {
    let page_count = engine.page_count();
    let pages = match page {
        Some(page) if page >= page_count => {
            bail!("page {} is out of range ({} pages)", page, page_count)
        }
        Some(page) => page..page + 1,
        None => 0..page_count,
    };

    let mapper = CoordinateMapper::new(config.rotation);
    let mut stdout = io::stdout().lock();
    for page in pages {
        let view = match view {
            Some(view) => view,
            None => natural_view_size(engine, page),
        };
        for link in engine.links(page, view) {
            let Link {
                bounds,
                target_page,
                uri,
            } = link;
            let record = LinkRecord {
                page,
                bounds,
                view,
                view_bounds: mapper.rect_to_viewport(Some(engine), page, view, bounds),
                target: LinkTarget { target_page, uri },
            };
            serde_json::to_writer(&mut stdout, &record)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// One pixel per point.
fn natural_view_size(engine: &PdfiumEngine, page: usize) -> PixelSize {
    engine
        .page_size(page)
        .map(|size| PixelSize::new(size.width as u32, size.height as u32))
        .unwrap_or_default()
}

fn init_logging(project_dirs: &ProjectDirs) -> Result<WorkerGuard> {
    let log_dir = project_dirs.data_local_dir().join("logs");
    fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, "pdfpick.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);
    // stdout carries command output.
    let console_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}
