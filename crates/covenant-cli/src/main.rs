//! Contract check driver.
//!
//! Provides the `covenant` binary, which runs checks through the same entry
//! points application code uses, so the real failure path (diagnostic on
//! stderr, exit status 1) can be observed from outside the process.
//!
//! Exit codes: 0 = every check passed, 1 = a check failed (see
//! `covenant_check::EXIT_CODE`), 101 = a check failed under `--reporter panic`,
//! 2 = invalid arguments (clap).

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing::level_filters::LevelFilter;

use covenant_check::{check_invariant, InvariantGuard, PanicOnViolation};
use covenant_core::CheckKind;

/// Runtime contract checks from the command line.
#[derive(Parser)]
#[command(name = "covenant", about = "Runtime contract checks from the command line")]
struct Cli {
    /// What to do when a check fails.
    #[arg(long, value_enum, default_value_t = ReporterArg::Terminate, global = true)]
    reporter: ReporterArg,

    /// Most verbose log level written to stderr. Failure diagnostics are
    /// printed even at `off`.
    #[arg(long, value_enum, default_value_t = LogLevelArg::Warn, global = true)]
    log_level: LogLevelArg,

    /// Log progress at debug level on stderr (same as `--log-level debug`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Check a batch of boolean results.
    Check {
        /// Label used in the diagnostic.
        #[arg(short, long, value_enum, default_value_t = KindArg::Condition)]
        kind: KindArg,

        /// Results in declaration order (true/false, yes/no, 1/0).
        #[arg(required = true, num_args = 1.., value_parser = clap::builder::BoolishValueParser::new())]
        results: Vec<bool>,
    },
    /// Guard a sample record, optionally mutate it, then check the guard.
    Invariant {
        /// Increment the record's integer field after the guard is taken.
        #[arg(long)]
        mutate: bool,

        /// Number of times to check the guard.
        #[arg(long, default_value_t = 1)]
        checks: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReporterArg {
    /// Print the diagnostic and exit with status 1.
    Terminate,
    /// Panic with the diagnostic.
    Panic,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Off => LevelFilter::OFF,
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Precondition,
    Condition,
    Postcondition,
}

impl From<KindArg> for CheckKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Precondition => CheckKind::Precondition,
            KindArg::Condition => CheckKind::Condition,
            KindArg::Postcondition => CheckKind::Postcondition,
        }
    }
}

/// The record guarded by the `invariant` subcommand.
#[derive(Debug, Serialize)]
struct Record {
    i_value: i64,
    s_value: String,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        cli.log_level.into()
    };
    init_tracing(level);

    if let ReporterArg::Panic = cli.reporter {
        if let Err(e) = covenant_check::install(PanicOnViolation) {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }

    let exit_code = match cli.command {
        Commands::Check { kind, results } => run_check(kind.into(), &results),
        Commands::Invariant { mutate, checks } => run_invariant(mutate, checks),
    };
    process::exit(exit_code);
}

/// Logs go to stderr so stdout stays free for command output.
fn init_tracing(level: LevelFilter) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}

/// Execute the check subcommand. Returns only when every result is true.
fn run_check(kind: CheckKind, results: &[bool]) -> i32 {
    debug!(%kind, count = results.len(), "checking batch");
    covenant_check::conditions::check_in(kind, results, Some(covenant_check::function_name!()));
    println!("{} passed: {} expression(s)", kind, results.len());
    0
}

/// Execute the invariant subcommand. Returns only when the record is unchanged.
fn run_invariant(mutate: bool, checks: u32) -> i32 {
    let mut record = Record {
        i_value: 1,
        s_value: "one".into(),
    };
    let guard = InvariantGuard::new(&record);
    debug!(?guard, "guard taken");

    if mutate {
        record.i_value += 1;
        debug!(?record, "record mutated");
    }

    for n in 0..checks {
        debug!(check = n + 1, "checking guard");
        check_invariant!(guard, &record);
    }
    println!("Invariant held across {} check(s)", checks);
    0
}
