use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use desktop_pet::app::{PetApp, PetSetup};
use desktop_pet::config::load_settings;
use desktop_pet::engine::PetEngine;
use desktop_pet::scheduler::TickScheduler;
use desktop_pet::terminal::{self, TerminalRenderer};
use desktop_pet::{providers, speech};

/// An animated pet that wanders around the terminal and talks back.
#[derive(Debug, Parser)]
#[command(name = "desktop-pet", version, about)]
struct Cli {
    /// Asset directory containing config.json and the frame files
    #[arg(default_value = "assets/bonzi")]
    assets: String,

    /// Settings file (defaults to the per-user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Validate the asset pack and settings, then exit
    #[arg(long)]
    check: bool,

    /// Seed for the transition sampler
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file while the pet is on screen
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    debug: bool,
}

fn install_subscriber<W>(filter: EnvFilter, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

/// Logs cannot go to the terminal the pet is drawn on, so they go to the
/// log file, to stderr for `--check`, or nowhere.
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    let filter = EnvFilter::from_default_env().add_directive(log_level.into());

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        install_subscriber(filter, Mutex::new(file));
    } else if cli.check {
        install_subscriber(filter, std::io::stderr);
    } else {
        install_subscriber(filter, std::io::sink);
    }
    Ok(())
}

#[allow(clippy::print_stderr)]
fn check(setup: &PetSetup) {
    let dangling = setup.config.dangling_event_states();
    for name in &dangling {
        tracing::warn!("Event refers to unknown state '{}'", name);
    }
    eprintln!(
        "ok: {} states, {} events, starting in '{}'",
        setup.graph.len(),
        setup.router().len(),
        setup.graph.initial_state()
    );
    if !dangling.is_empty() {
        eprintln!("warning: events refer to unknown states: {}", dangling.join(", "));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    tracing::info!("Starting desktop-pet version {}", env!("CARGO_PKG_VERSION"));

    let settings = load_settings(cli.settings.as_deref()).context("Failed to load settings")?;
    let assets = shellexpand::tilde(&cli.assets).into_owned();
    let setup = PetSetup::load(Path::new(&assets))
        .with_context(|| format!("Failed to load asset pack {assets}"))?;

    if cli.check {
        check(&setup);
        return Ok(());
    }

    let mut engine = PetEngine::new(setup.graph.clone(), settings.start_position());
    if let Some(seed) = cli.seed {
        engine = engine.with_seed(seed);
    }

    let provider = providers::from_settings(&settings.query);
    let speech = speech::from_settings(&settings.speech);
    let scheduler = TickScheduler::new(settings.tick_period());

    let tui = terminal::init().context("Failed to initialize terminal")?;
    let mut app = PetApp::new(
        engine,
        setup.router(),
        scheduler,
        TerminalRenderer::new(tui),
        provider,
        speech,
    );

    let result = app.run().await;
    drop(app.into_renderer().into_terminal());
    terminal::restore().context("Failed to restore terminal")?;

    result.context("Pet loop failed")
}
