use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use flightlog_common::{BlockKind, GridDimensions};
use flightlog_grid::CellCoord;
use flightlog_log::{
    FlightlogConfig, LogAssembler, MapBuilder, SceneModel, ScriptedTransport, gzip, validate_log,
};
use glam::IVec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flightlog", about = "Decode, check and build flight logs")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a log and summarize the scene
    Inspect {
        file: PathBuf,
        /// Print the whole scene as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a map against the submission rules
    Validate {
        file: PathBuf,
        /// Largest allowed extent on any axis
        #[arg(long)]
        max_width: Option<usize>,
    },
    /// Write a new map log
    Build {
        #[arg(short, long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [6, 3, 3])]
        dimensions: Vec<usize>,
        #[arg(short, long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [0, 0, 0])]
        initial_position: Vec<usize>,
        /// Full block: kind code and cell
        #[arg(short, long = "block", num_args = 4, value_names = ["KIND", "X", "Y", "Z"], action = ArgAction::Append)]
        blocks: Vec<u8>,
        /// Block reaching equally far both ways on each axis
        #[arg(short, long = "block-symmetric", num_args = 7, action = ArgAction::Append)]
        symmetric: Vec<u8>,
        /// Block with independent insets: kind, cell, pos, neg
        #[arg(short, long = "block-asymmetric", num_args = 10, action = ArgAction::Append)]
        asymmetric: Vec<u8>,
        #[arg(short, long)]
        title: Option<String>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Gzip the output file
        #[arg(long, requires = "output")]
        gzip: bool,
    },
    /// Replay accelerations against scripted endpoint responses
    Replay {
        file: PathBuf,
        /// Responses separated by lines of `---`
        #[arg(short, long)]
        script: PathBuf,
        #[arg(short, long, num_args = 3, value_names = ["AX", "AY", "AZ"], action = ArgAction::Append, allow_negative_numbers = true)]
        acc: Vec<i32>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => FlightlogConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FlightlogConfig::default(),
    };

    match cli.command {
        Commands::Inspect { file, json } => {
            let scene = decode(&config, &file)?.1;
            if json {
                println!("{}", serde_json::to_string_pretty(&scene)?);
            } else {
                print_summary(&scene)?;
            }
        }
        Commands::Validate { file, max_width } => {
            let mut rules = config.validation.clone();
            if let Some(width) = max_width {
                rules.max_width = width;
            }
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            match validate_log(&bytes, &rules) {
                Ok(()) => println!("{}: valid", file.display()),
                Err(e) => {
                    println!("{}: {e}", file.display());
                    std::process::exit(1);
                }
            }
        }
        Commands::Build {
            dimensions,
            initial_position,
            blocks,
            symmetric,
            asymmetric,
            title,
            output,
            gzip: compress,
        } => {
            let dims = GridDimensions::new(dimensions[0], dimensions[1], dimensions[2])?;
            let start = CellCoord::new(initial_position[0], initial_position[1], initial_position[2]);
            tracing::info!(%dims, ?start, "new map");
            let mut builder = MapBuilder::new(dims, start)?;
            if let Some(title) = title {
                builder = builder.with_title(title);
            }
            for v in blocks.chunks_exact(4) {
                builder.add_full(BlockKind::from_code(v[0])?, cell(&v[1..4]))?;
            }
            for v in symmetric.chunks_exact(7) {
                builder.add_symmetric(BlockKind::from_code(v[0])?, cell(&v[1..4]), [v[4], v[5], v[6]])?;
            }
            for v in asymmetric.chunks_exact(10) {
                builder.add_block(
                    BlockKind::from_code(v[0])?,
                    cell(&v[1..4]),
                    [v[4], v[5], v[6]],
                    [v[7], v[8], v[9]],
                )?;
            }
            let text = builder.to_log_text()?;
            match output {
                Some(path) => {
                    let bytes = if compress {
                        gzip(text.as_bytes())?
                    } else {
                        text.into_bytes()
                    };
                    std::fs::write(&path, bytes)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{text}"),
            }
        }
        Commands::Replay { file, script, acc } => {
            let (mut asm, scene) = decode(&config, &file)?;
            println!("Loaded {} with {} points", file.display(), scene.path.len());
            let script = std::fs::read_to_string(&script)
                .with_context(|| format!("reading {}", script.display()))?;
            let mut transport = ScriptedTransport::from_script(&script);
            for a in acc.chunks_exact(3) {
                let accel = IVec3::new(a[0], a[1], a[2]);
                let path = asm.play(&mut transport, accel)?;
                let last = path.last().map(|p| (p.action_index, p.position));
                println!("ACC {} {} {} -> {} points, last {:?}", a[0], a[1], a[2], path.len(), last);
            }
            match asm.scene().and_then(|s| s.outcome) {
                Some(end) => println!(
                    "Flight ended: {} after {} moves",
                    if end.ok { "OK" } else { "KO" },
                    end.moves
                ),
                None => println!("Flight still open"),
            }
        }
    }

    Ok(())
}

fn decode(config: &FlightlogConfig, file: &Path) -> anyhow::Result<(LogAssembler, SceneModel)> {
    let mut asm = LogAssembler::new(config.decode.clone());
    let scene = asm
        .decode_file(file)
        .with_context(|| format!("decoding {}", file.display()))?;
    Ok((asm, scene))
}

fn cell(v: &[u8]) -> CellCoord {
    CellCoord::new(v[0] as usize, v[1] as usize, v[2] as usize)
}

fn print_summary(scene: &SceneModel) -> anyhow::Result<()> {
    let d = &scene.directives;
    println!("Title: {}", d.title.as_deref().unwrap_or("-"));
    println!("Grid: {} ({} tokens, {} blocks)", scene.dims(), scene.body_tokens, scene.grid.len());
    for (kind, count) in scene.grid.kind_counts() {
        println!("  {kind:?}: {count}");
    }
    println!("Cell size: {}", scene.cell_size);
    println!("Path: {} points", scene.path.len());
    if let Some(end) = scene.outcome {
        println!("End: {} at {}", if end.ok { "OK" } else { "KO" }, end.moves);
    }
    if let Some(url) = &d.playable_url {
        println!("Playable: {url}");
    }
    if let Some(autoload) = &d.autoload {
        println!(
            "Autoload: {} after {}s",
            autoload.target,
            autoload.effective_delay().as_secs()
        );
    }
    println!("Digest: {}", scene.digest()?);
    Ok(())
}
