#![deny(
    // This is overly strict, of course. The intent is somewhat of a "quality seal," less to fix everything, and more to force us to add inline allows, which are even more needlessly verbose, but give us a mechanism to say "we think this is okay, but you might want to take a second look here."
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]
//! Command-line front end for the trace generator.
//!
//! Generates a landscape (or loads a previously exported one), simulates a call trace over it and
//! writes the cleaned landscape plus the span forest into a timestamped run directory.
//! See binary --help for more information

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    Context,
    Result,
};
use clap::Parser;
use tg_gen::model::Application;
use tg_gen::utils::{
    create_timestamped_output_dir,
    write_json,
};
use tg_gen::{
    clean,
    generate_landscape,
    reconstruct_landscape,
    simulate_detailed,
    CleanApplication,
    CommunicationStyle,
    GenerationParams,
    LandscapeImport,
    LandscapeStats,
    TraceParams,
};
use tracing::{
    info,
    warn,
};

/// tracegen command-line interface to generate synthetic software landscapes and simulated call
/// traces over them
#[derive(Parser)]
#[allow(clippy::struct_excessive_bools)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of applications to generate.
    #[arg(long, default_value_t = 1)]
    app_count: usize,

    /// Number of generated package layers below the `org.tracegenerator.<app>` namespace.
    #[arg(long, default_value_t = 3)]
    package_depth: usize,

    /// Minimum number of classes per application.
    #[arg(long, default_value_t = 5)]
    min_class_count: usize,

    /// Maximum number of classes per application.
    #[arg(long, default_value_t = 20)]
    max_class_count: usize,

    /// Minimum number of methods per class.
    #[arg(long, default_value_t = 1)]
    min_method_count: usize,

    /// Maximum number of methods per class.
    #[arg(long, default_value_t = 5)]
    max_method_count: usize,

    /// Share of the remaining classes a package layer may take (range 0.0-1.0).
    #[arg(long, default_value_t = 0.5, value_parser = parse_balance)]
    balance: f64,

    /// Seed for landscape generation.
    #[arg(long)]
    landscape_seed: Option<u64>,

    /// Previously exported landscape (cleaned JSON or hierarchical import shape) to use instead of
    /// generating one.
    #[arg(short, long)]
    landscape: Option<PathBuf>,

    /// Total simulated duration of the trace.
    #[arg(short, long, default_value_t = 1000)]
    duration: u64,

    /// Number of calls to simulate after the entry span.
    #[arg(short = 'n', long, default_value_t = 10)]
    call_count: usize,

    /// Maximum number of simultaneously open calls.
    #[arg(long, default_value_t = 3)]
    max_connection_depth: usize,

    /// How the next class to call is chosen.
    #[arg(short = 's', long, value_enum, default_value_t = CommunicationStyle::TrueRandom)]
    communication_style: CommunicationStyle,

    /// Allow calling a class more than once.
    #[arg(long)]
    allow_cyclic_calls: bool,

    /// Keep calling until every method in the landscape has been called at least once.
    #[arg(long)]
    visit_all_methods: bool,

    /// Attribute added to every span (format: key=value); may be repeated.
    #[arg(short = 'a', long = "fixed-attribute", value_parser = parse_key_val)]
    fixed_attributes: Vec<(String, String)>,

    /// Seed for trace simulation.
    #[arg(long)]
    trace_seed: Option<u64>,

    /// Directory under which the timestamped run directory is created.
    #[arg(short, long, default_value = "runs")]
    output_dir: PathBuf,

    /// Logging verbosity level (`trace`, `debug`, `info`, `warn`, `error`).
    #[arg(short, long, default_value = "info")]
    verbosity: String,
}

impl Cli {
    /// Landscape generation parameters from the command line.
    const fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            app_count: self.app_count,
            package_depth: self.package_depth,
            min_class_count: self.min_class_count,
            max_class_count: self.max_class_count,
            min_method_count: self.min_method_count,
            max_method_count: self.max_method_count,
            balance: self.balance,
            seed: self.landscape_seed,
        }
    }

    /// Trace simulation parameters from the command line.
    fn trace_params(&self) -> TraceParams {
        TraceParams {
            duration: self.duration,
            call_count: self.call_count,
            max_connection_depth: self.max_connection_depth,
            communication_style: self.communication_style,
            allow_cyclic_calls: self.allow_cyclic_calls,
            visit_all_methods: self.visit_all_methods,
            fixed_attributes: self.fixed_attributes.iter().cloned().collect::<BTreeMap<_, _>>(),
            seed: self.trace_seed,
        }
    }
}

/// Custom parser for `balance` to enforce range [0.0, 1.0]
fn parse_balance(s: &str) -> Result<f64, String> {
    let val: f64 = s.parse().map_err(|_| format!("'{s}' isn't a valid float number"))?;
    if (0.0..=1.0).contains(&val) {
        Ok(val)
    } else {
        Err(format!("value must be between 0.0 and 1.0, got: {val}"))
    }
}

/// Custom parser for `key=value` span attributes
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected key=value, got: '{s}'")),
    }
}

/// Loads and reconstructs a previously exported landscape
fn load_landscape(path: &Path) -> Result<Vec<Application>> {
    info!("Loading landscape from {}", path.display());
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let import: LandscapeImport = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing landscape from {}", path.display()))?;

    let rebuilt = reconstruct_landscape(import)?;
    for r in rebuilt.iter().filter(|r| r.entry_point_fallback) {
        warn!("No entry point recorded for {}, using its first class", r.application.name);
    }
    Ok(rebuilt.into_iter().map(|r| r.application).collect())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Conform to crate-standard logging.
    tg_core::logging::setup(&args.verbosity);

    let mut apps = match &args.landscape {
        Some(path) => load_landscape(path)?,
        None => generate_landscape(&args.generation_params())?,
    };
    let stats = LandscapeStats::of(&apps);
    info!(?stats, "Landscape ready");

    let outcome = simulate_detailed(&mut apps, &args.trace_params())?;
    if outcome.terminated_early {
        warn!(
            "Trace ended after {} of {} calls; allow cyclic calls or grow the landscape for longer traces",
            outcome.generated_calls, outcome.target_calls
        );
    }

    let output_dir = create_timestamped_output_dir(&args.output_dir)?;
    let cleaned: Vec<CleanApplication> = apps.iter().map(clean).collect();
    write_json(&output_dir, "landscape.json", &cleaned)?;
    write_json(&output_dir, "trace.json", &outcome.spans)?;
    info!("Run written to {}", output_dir.display());
    Ok(())
}
