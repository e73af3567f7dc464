//! FOXHOUNDS - CLI Entry Point
//!
//! Concurrent fox and hound simulation.

use clap::{Parser, Subcommand};
use foxhounds::{render, Config, World};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "foxhounds")]
#[command(version)]
#[command(about = "Concurrent fox and hound population simulation on a toroidal grid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Grid width
        #[arg(long)]
        width: Option<usize>,

        /// Grid height
        #[arg(long)]
        height: Option<usize>,

        /// Hound starvation threshold (hunger units)
        #[arg(long)]
        starve_time: Option<i64>,

        /// Probability of seeding a fox in a cell
        #[arg(long)]
        fox: Option<f64>,

        /// Probability of seeding a hound in a cell without a fox
        #[arg(long)]
        hound: Option<f64>,

        /// Seconds to run before shutting down
        #[arg(short, long, default_value = "30")]
        seconds: u64,

        /// Random seed for reproducible placement
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (no grid output)
        #[arg(short, long)]
        quiet: bool,

        /// Print final stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

/// Command-line values that override the configuration file
struct Overrides {
    width: Option<usize>,
    height: Option<usize>,
    starve_time: Option<i64>,
    fox: Option<f64>,
    hound: Option<f64>,
    seed: Option<u64>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(width) = self.width {
            config.grid.width = width;
        }
        if let Some(height) = self.height {
            config.grid.height = height;
        }
        if let Some(starve_time) = self.starve_time {
            config.hounds.starve_time = starve_time;
        }
        if let Some(fox) = self.fox {
            config.seeding.fox_probability = fox;
        }
        if let Some(hound) = self.hound {
            config.seeding.hound_probability = hound;
        }
        if self.seed.is_some() {
            config.seeding.seed = self.seed;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            width,
            height,
            starve_time,
            fox,
            hound,
            seconds,
            seed,
            quiet,
            json,
        } => {
            let overrides = Overrides {
                width,
                height,
                starve_time,
                fox,
                hound,
                seed,
            };
            run_simulation(config, overrides, seconds, quiet, json)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn run_simulation(
    config_path: PathBuf,
    overrides: Overrides,
    seconds: u64,
    quiet: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let mut config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };
    overrides.apply(&mut config);
    config.validate()?;

    init_logging(&config.logging.log_level);
    if config_path.exists() {
        log::info!("Loaded config from {:?}", config_path);
    } else {
        log::info!("Using default configuration");
    }

    let render_interval = Duration::from_millis(config.timing.render_interval_ms);
    let stats_interval = Duration::from_millis(config.logging.stats_interval_ms);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let mut world = World::new(config)?;
    world.populate()?;
    world.release();

    let pacing = Pacing {
        duration: Duration::from_secs(seconds),
        render_interval,
        stats_interval,
        quiet,
    };
    match drive(&world, &pacing, &running) {
        Ending::Deadline => log::info!("Run time of {}s elapsed", seconds),
        Ending::Extinct => log::info!("Population extinct"),
        Ending::Interrupted => log::warn!("Interrupted, shutting down"),
    }

    let stats = world.stats();
    world.shutdown();

    println!();
    println!("=== Simulation Complete ===");
    println!("{}", stats.summary());
    if json {
        println!("{}", stats.to_json()?);
    }

    Ok(())
}

/// How the render loop paces itself
struct Pacing {
    duration: Duration,
    render_interval: Duration,
    stats_interval: Duration,
    quiet: bool,
}

/// Why the render loop stopped
#[derive(Debug, PartialEq, Eq)]
enum Ending {
    Deadline,
    Extinct,
    Interrupted,
}

/// Render and log until the deadline, extinction, or `running` turning false
fn drive(world: &World, pacing: &Pacing, running: &AtomicBool) -> Ending {
    let start = Instant::now();
    let deadline = start + pacing.duration;
    let mut last_stats = start;

    if !pacing.quiet {
        print!("{}", render::text(world.grid()));
    }

    loop {
        if !running.load(Ordering::SeqCst) {
            return Ending::Interrupted;
        }
        let now = Instant::now();
        if now >= deadline {
            return Ending::Deadline;
        }
        std::thread::sleep(pacing.render_interval.min(deadline - now));

        if !pacing.quiet && world.grid().take_dirty() {
            print!("{}", render::text(world.grid()));
        }

        if last_stats.elapsed() >= pacing.stats_interval {
            log::info!("{}", world.stats().summary());
            last_stats = Instant::now();
        }

        if world.is_extinct() {
            return Ending::Extinct;
        }
    }
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
