use crate::utils::parser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use voidock::engine::config::{DockingStrategy, FitnessKind};

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Daniel Schwalbe-Koda",
    version,
    about = "VOIDock CLI - Stochastic docking of guest molecules into host frameworks, with recursive loading of several guests per host.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dock guests at anchor points sampled inside the host.
    Dock(DockArgs),
    /// Dock guests with a Metropolis Monte Carlo search over guest translations and rotations.
    #[command(name = "mcdock")]
    McDock(McDockArgs),
}

/// Arguments shared by every docking subcommand.
#[derive(Args, Debug)]
pub struct CommonArgs {
    // --- Core Arguments ---
    /// Path to the host structure file (TOML site list).
    #[arg(value_name = "HOST")]
    pub host: PathBuf,

    /// Path to the guest structure file (TOML site list).
    #[arg(value_name = "GUEST")]
    pub guest: PathBuf,

    /// Directory receiving one structure file per docked pose and the run summary.
    #[arg(short, long, default_value = "docked", value_name = "DIR")]
    pub output: PathBuf,

    /// Path to a run configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Fitness Overrides ---
    /// Fitness function to rank poses with. Repeat to sum several terms.
    #[arg(short = 'f', long = "fitness", value_name = "NAME")]
    pub fitness: Vec<FitnessKind>,

    /// Override the distance threshold of every fitness term.
    #[arg(short = 't', long, value_name = "FLOAT")]
    pub threshold: Option<f64>,

    // --- Search Overrides ---
    /// Number of attempts per docking call.
    #[arg(short = 'n', long, value_name = "INT")]
    pub attempts: Option<usize>,

    /// Seed for the random number generator, for reproducible runs.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub subdock: SubdockArgs,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S docking.attempts=50
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Controls for loading several guests into the same host.
#[derive(Args, Debug, Clone, Copy)]
pub struct SubdockArgs {
    /// Keep docking new guests into the best poses of the previous round.
    #[arg(long, conflicts_with = "no_subdock")]
    pub subdock: bool,

    /// Dock a single guest, even if the config file enables subdocking.
    #[arg(long)]
    pub no_subdock: bool,

    /// Number of top poses of a round that seed the next round.
    #[arg(long, value_name = "INT")]
    pub max_subdock: Option<usize>,

    /// Stop after this many guests have been loaded.
    #[arg(long, value_name = "INT")]
    pub max_loading: Option<usize>,
}

/// Arguments for the `dock` subcommand.
#[derive(Args, Debug)]
pub struct DockArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// How candidates are generated at each anchor point (batch, serial, success).
    #[arg(long, value_name = "NAME")]
    pub strategy: Option<DockingStrategy>,

    /// How anchor points are chosen inside the host (origin, random, points).
    #[arg(long, value_name = "NAME")]
    pub sampler: Option<String>,

    /// Number of anchor points drawn by the random sampler.
    #[arg(long, value_name = "INT")]
    pub num_samples: Option<usize>,

    /// Cartesian anchor point for the points sampler. Can be used multiple times.
    #[arg(long = "point", value_name = "X,Y,Z", value_parser = parser::parse_point, allow_hyphen_values = true)]
    pub points: Vec<[f64; 3]>,
}

/// Arguments for the `mcdock` subcommand.
#[derive(Args, Debug)]
pub struct McDockArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Initial Metropolis temperature.
    #[arg(short = 'T', long, value_name = "FLOAT")]
    pub temperature: Option<f64>,

    /// Temperature schedule over the trials of one docking call (constant, linear, exponential).
    #[arg(long, value_name = "NAME")]
    pub schedule: Option<String>,

    /// Temperature reached at the last trial by the linear schedule.
    #[arg(long, value_name = "FLOAT")]
    pub final_temperature: Option<f64>,

    /// Per-trial decay factor of the exponential schedule.
    #[arg(long, value_name = "FLOAT")]
    pub decay: Option<f64>,

    /// Stop each docking call at the first pose with non-negative fitness.
    #[arg(long)]
    pub early_exit: bool,
}
