//! Command-line front end: play, render and inspect music notation from the terminal.

use std::cell::RefCell;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notaphone::audio::{AudioError, OfflineRenderer};
use notaphone::config::{ConfigError, Settings};
use notaphone::dsl::{to_notation, Compiler, Composition};
use notaphone::event::{PlaybackStatus, RenderScheduler};
use notaphone::text::notation_or_fallback;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "notaphone")]
#[command(about = "Compile compact music notation into timed synthesis")]
#[command(version)]
struct Cli {
    /// Settings file (default: ~/.notaphone/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Master volume, 0.0 to 1.0
    #[arg(long, global = true)]
    volume: Option<f32>,

    /// Seed for noise sources
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play notation through the default sound device
    Play {
        /// A file path, `-` for stdin, or inline notation
        input: String,
    },

    /// Render notation to a WAV file
    Render {
        input: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        sample_rate: Option<u32>,
    },

    /// Print the compiled composition and any dropped fragments
    Parse {
        input: String,
        #[arg(long)]
        json: bool,
    },

    /// Turn prose into notation
    FromText {
        text: String,
        /// Notation produced elsewhere, used when it looks valid
        #[arg(long)]
        generated: Option<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read input: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("cannot encode json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot install ctrl-c handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("playback unavailable: {0}")]
    Unavailable(String),
}

fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("notaphone: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("notaphone=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::load_default()?,
    };
    if let Some(volume) = cli.volume {
        settings.master_volume = volume;
    }
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    let settings = settings.sanitized();

    match cli.command {
        Commands::Play { input } => play(&load_composition(&input)?, settings),
        Commands::Render {
            input,
            output,
            sample_rate,
        } => {
            let mut settings = settings;
            if sample_rate.is_some() {
                settings.sample_rate = sample_rate;
            }
            render(&load_composition(&input)?, settings.sanitized(), &output)
        }
        Commands::Parse { input, json } => parse(&read_input(&input)?, json),
        Commands::FromText { text, generated } => {
            println!("{}", notation_or_fallback(generated.as_deref(), &text));
            Ok(())
        }
    }
}

/// `-` reads stdin, an existing path reads the file, anything else is the
/// text itself.
fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    let path = Path::new(input);
    if path.is_file() {
        return Ok(std::fs::read_to_string(path)?);
    }
    Ok(input.to_string())
}

/// Text with no `:` cannot hold a track, so it is treated as prose and
/// played from its written notation, exactly as `from-text` prints it.
fn load_composition(input: &str) -> Result<Composition, CliError> {
    let text = read_input(input)?;
    if text.contains(':') {
        Ok(Compiler::compile(&text))
    } else {
        tracing::info!("input has no tracks, converting it as prose");
        Ok(Compiler::compile(&notation_or_fallback(None, &text)))
    }
}

fn play(composition: &Composition, settings: Settings) -> Result<(), CliError> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let mut scheduler = RenderScheduler::with_device(settings);
    let handle = scheduler.render(composition);
    let ends_at = match handle.status() {
        PlaybackStatus::Scheduled { ends_at, .. } => *ends_at,
        PlaybackStatus::Unavailable(reason) => return Err(CliError::Unavailable(reason.clone())),
    };

    println!(
        "playing {} notes at {} BPM ({:.1}s)",
        composition.note_count(),
        composition.tempo,
        composition.duration_secs()
    );
    while !interrupted.load(Ordering::SeqCst) {
        match scheduler.current_time() {
            Some(now) if now < ends_at => thread::sleep(POLL_INTERVAL),
            _ => break,
        }
    }
    scheduler.stop(&handle);
    Ok(())
}

fn render(composition: &Composition, settings: Settings, output: &Path) -> Result<(), CliError> {
    let renderer = Rc::new(RefCell::new(OfflineRenderer::new(
        settings.offline_sample_rate(),
        2,
        settings.seed,
    )));
    let mut scheduler = RenderScheduler::with_shared(settings, Rc::clone(&renderer));
    let handle = scheduler.render(composition);
    if let PlaybackStatus::Unavailable(reason) = handle.status() {
        return Err(CliError::Unavailable(reason.clone()));
    }

    let frames = renderer.borrow_mut().render_to_wav(output)?;
    println!(
        "wrote {} ({:.2}s)",
        output.display(),
        frames as f64 / renderer.borrow().sample_rate() as f64
    );
    Ok(())
}

fn parse(text: &str, json: bool) -> Result<(), CliError> {
    let (composition, diagnostics) = Compiler::compile_with_diagnostics(text);
    if json {
        println!("{}", serde_json::to_string_pretty(&composition)?);
    } else {
        println!("{}", to_notation(&composition));
        println!(
            "-- {} tracks, {} notes, {:.2}s",
            composition.tracks.len(),
            composition.note_count(),
            composition.duration_secs()
        );
    }
    for diagnostic in &diagnostics {
        eprintln!("dropped: {diagnostic}");
    }
    Ok(())
}
