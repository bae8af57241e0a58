use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use doc_model::{PagePayload, Preferences, ViewMode};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::{load_preferences, reset_preferences, FileStore, KeyValueStore};
use tracing_subscriber::EnvFilter;
use viewer_core::{Cursor, Size, Viewer, ViewerConfig, NO_IMAGES_MESSAGE};

mod host;
mod script;

pub use host::SimulatedHost;
pub use script::{parse_script, ScriptCommand};

#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(about = "Folio page viewer CLI")]
pub struct Cli {
    /// Enable verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding stored preferences (defaults to the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    prefs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print machine-readable metadata for a page payload.
    Info {
        #[arg(value_name = "PAYLOAD")]
        payload: PathBuf,
    },
    /// Replay a script of interactions against a viewer session.
    Replay(ReplayArgs),
    /// Inspect or clear stored preferences.
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Args)]
struct ReplayArgs {
    #[arg(value_name = "PAYLOAD")]
    payload: PathBuf,
    #[arg(long, value_name = "FILE")]
    script: PathBuf,
    #[arg(long, default_value_t = 15_000)]
    load_timeout_ms: u64,
    #[arg(long, default_value = "1000x800", value_parser = parse_viewport)]
    viewport: Size,
    /// Height of every page in the continuous strip
    #[arg(long, default_value_t = 1000.0)]
    page_height: f64,
}

#[derive(Debug, Subcommand)]
enum PrefsAction {
    /// Print the stored preference record as JSON.
    Show,
    /// Remove the stored preference record.
    Reset,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    title: Option<String>,
    page_count: usize,
    pages: Vec<PageInfoOutput>,
}

#[derive(Debug, Serialize)]
struct PageInfoOutput {
    index: usize,
    id: String,
    label: String,
    src: String,
    kind: &'static str,
    size: Option<SizeOutput>,
}

#[derive(Debug, Serialize)]
struct SizeOutput {
    width: f64,
    height: f64,
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    title: Option<String>,
    total: usize,
    current_page: usize,
    counter: String,
    mode: &'static str,
    fit_width: bool,
    lock_zoom: bool,
    sidebar_collapsed: bool,
    sidebar_glyph: &'static str,
    zoom: f64,
    pan: [f64; 2],
    cursor: &'static str,
    image_src: Option<String>,
    loading: Option<String>,
    strip_scroll: Option<f64>,
    viewport_scroll: f64,
    page_list_height: Option<f64>,
    thumbnail_in_view: usize,
    fullscreen_requests: usize,
    preference_writes: usize,
    pending_timers: usize,
    elapsed_ms: u128,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Info { payload } => run_info(&payload),
        Commands::Replay(args) => run_replay(&args, cli.prefs_dir.as_deref()),
        Commands::Prefs { action } => run_prefs(action, cli.prefs_dir.as_deref()),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_info(path: &Path) -> Result<()> {
    let payload = read_payload(path)?;
    let base_dir = payload_dir(path);

    let pages = payload
        .images
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let kind = host::source_kind(&page.src);
            let size = (kind == "file")
                .then(|| host::probe_image(&base_dir, &page.src))
                .flatten()
                .map(|size| SizeOutput { width: size.width, height: size.height });

            PageInfoOutput {
                index,
                id: page.id.clone(),
                label: page.label.clone(),
                src: page.src.clone(),
                kind,
                size,
            }
        })
        .collect();

    let output = InfoOutput {
        path: path.display().to_string(),
        title: payload.title.clone(),
        page_count: payload.page_count(),
        pages,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_replay(args: &ReplayArgs, prefs_dir: Option<&Path>) -> Result<()> {
    let payload = read_payload(&args.payload)?;
    let source = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script {}", args.script.display()))?;
    let commands = parse_script(&source)?;

    let store = open_store(prefs_dir)?;
    let preferences = stored_preferences(&store);
    let config =
        ViewerConfig::default().with_load_timeout(Duration::from_millis(args.load_timeout_ms));

    let viewer = Viewer::start(payload, preferences, args.viewport, config)
        .map_err(|_| anyhow::anyhow!(NO_IMAGES_MESSAGE))?;

    let mut host = SimulatedHost::new(viewer, store, payload_dir(&args.payload), args.page_height);
    for command in &commands {
        script::execute(&mut host, command);
    }

    let output = replay_output(&host);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_prefs(action: PrefsAction, prefs_dir: Option<&Path>) -> Result<()> {
    let mut store = open_store(prefs_dir)?;

    match action {
        PrefsAction::Show => {
            let preferences = load_preferences(&store).context("stored preferences are malformed")?;
            println!("{}", serde_json::to_string_pretty(&preferences)?);
        }
        PrefsAction::Reset => {
            reset_preferences(&mut store).context("failed to reset preferences")?;
            println!("reset");
        }
    }

    Ok(())
}

fn read_payload(path: &Path) -> Result<PagePayload> {
    if !path.is_file() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("invalid page payload {}", path.display()))
}

fn payload_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn open_store(prefs_dir: Option<&Path>) -> Result<FileStore> {
    match prefs_dir {
        Some(dir) => Ok(FileStore::with_root(dir)),
        None => FileStore::from_default_project().context("failed to locate preference storage"),
    }
}

/// Falls back to defaults when the stored record cannot be read.
fn stored_preferences(store: &impl KeyValueStore) -> Preferences {
    match load_preferences(store) {
        Ok(preferences) => preferences,
        Err(error) => {
            tracing::warn!(%error, "ignoring unreadable stored preferences");
            Preferences::default()
        }
    }
}

fn parse_viewport(value: &str) -> Result<Size, String> {
    let (width, height) =
        value.split_once(['x', 'X']).ok_or_else(|| format!("expected WxH, got `{value}`"))?;
    let width: f64 = width.trim().parse().map_err(|_| format!("invalid width `{width}`"))?;
    let height: f64 = height.trim().parse().map_err(|_| format!("invalid height `{height}`"))?;

    if width <= 0.0 || height <= 0.0 {
        return Err("viewport dimensions must be positive".to_owned());
    }

    Ok(Size::new(width, height))
}

fn replay_output<S: KeyValueStore>(host: &SimulatedHost<S>) -> ReplayOutput {
    let viewer = host.viewer();
    let surface = viewer.surface();
    let state = viewer.state();

    ReplayOutput {
        title: surface.title.clone(),
        total: surface.total,
        current_page: surface.current_page,
        counter: surface.counter_text(),
        mode: match state.mode {
            ViewMode::Paged => "paged",
            ViewMode::Continuous => "continuous",
        },
        fit_width: surface.fit_width_checked,
        lock_zoom: surface.lock_zoom_checked,
        sidebar_collapsed: surface.sidebar_collapsed,
        sidebar_glyph: surface.sidebar_glyph(),
        zoom: surface.zoom,
        pan: [surface.pan.x, surface.pan.y],
        cursor: match surface.cursor {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        },
        image_src: surface.image_src().map(str::to_owned),
        loading: surface.loading_text().map(str::to_owned),
        strip_scroll: host.strip_scroll(),
        viewport_scroll: host.viewport_scroll(),
        page_list_height: surface.page_list_height,
        thumbnail_in_view: host.thumbnail_in_view(),
        fullscreen_requests: host.fullscreen_requests(),
        preference_writes: host.saves(),
        pending_timers: host.pending_timers(),
        elapsed_ms: host.now().as_millis(),
    }
}
