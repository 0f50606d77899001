//! Native Interop Host
//!
//! Command-line host for the interop-native library. With no arguments it
//! runs the fixed demonstration sequence against the statically linked
//! library and exits with status zero. It can also:
//! - Load the library at runtime from an explicit path (`--library`)
//! - Discover the shared library in the usual locations (`--dynamic`)
//! - Take the demo inputs from a TOML/JSON file (`--config`)

use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;

mod bindings;
mod callbacks;
mod config;
mod demo;
mod error;
mod loader;
mod native;

use bindings::{FunctionTable, NativeLibrary};
use config::DemoConfig;
use native::NativeApi;

/// Native Interop Host - call into a native library and receive callbacks
#[derive(Parser, Debug)]
#[command(name = "interop-host")]
#[command(about = "Demonstrate calls and callbacks across a C ABI boundary", long_about = None)]
#[command(version)]
struct Args {
    /// Load the native library from this shared library file
    #[arg(short, long, value_name = "FILE")]
    library: Option<PathBuf>,

    /// Search for the native shared library instead of using the linked one
    #[arg(long, conflicts_with = "library")]
    dynamic: bool,

    /// Path to a demo configuration file (TOML, or JSON by extension)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Native Interop Host v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Linked against interop-native v{}", interop_native::VERSION);

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => DemoConfig::default(),
    };

    // Command-line selection overrides the config file
    if let Some(path) = &args.library {
        config = config.with_library(path);
    } else if args.dynamic {
        config = config.with_library(loader::find_library()?);
    }

    match &config.library {
        Some(path) => {
            let library = NativeLibrary::load(path)?;
            log::info!("Using dynamically loaded library: {:?}", library.path());
            run(library.table(), &config)
        }
        None => {
            log::debug!("Using statically linked library");
            run(&FunctionTable::linked(), &config)
        }
    }
}

fn run(table: &FunctionTable, config: &DemoConfig) -> Result<()> {
    let api = NativeApi::new(table);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = demo::run_demo(&api, config, &mut out)?;
    log::debug!("Demo finished: {:?}", summary);
    Ok(())
}

/// Initialize logging based on verbosity level
///
/// Logs go to stderr so the demo transcript on stdout stays clean.
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::{Builder, Target};
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .target(Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
