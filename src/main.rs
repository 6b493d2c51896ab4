#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use session_restore::config::load_config;
use session_restore::report::OutputFormat;
use session_restore::{RestoreResult, batch_cmd, restore_cmd, stats_cmd};

#[derive(Parser, Debug)]
#[command(name = "session-restore")]
#[command(about = "Rebuild readable transcripts from session event logs", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose logging (or set SESSION_RESTORE_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    restore: RestoreArgs,
}

#[derive(Args, Debug)]
struct RestoreArgs {
    /// Session log to restore (defaults to the configured default input)
    input: Option<PathBuf>,
    /// Restore every session log in this directory instead
    #[arg(long, conflicts_with = "input")]
    dir: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print summary counters for a session log
    Stats {
        /// Session log to summarise
        input: PathBuf,
        /// Print JSON instead of the boxed summary
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("SESSION_RESTORE_LOG").unwrap_or_else(|_| {
        if verbose { "session_restore=debug".to_string() } else { "session_restore=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn restore(args: RestoreArgs) -> RestoreResult<bool> {
    let config = load_config(args.config.as_deref())?;

    if let Some(dir) = args.dir {
        let summary = batch_cmd::run(&dir, args.format, &config.batch)?;
        println!(
            "\nProcessed {} files: {} succeeded, {} failed",
            summary.total(),
            summary.succeeded.len(),
            summary.failed.len()
        );
        return Ok(summary.failed.is_empty());
    }

    let input = args.input.unwrap_or(config.default_input);
    restore_cmd::run(&input, args.format, config.preview_lines)?;
    Ok(true)
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Some(Commands::Stats { input, json }) => stats_cmd::run(&input, json).map(|_| true),
        None => restore(cli.restore),
    };

    match result {
        Ok(true) => {}
        // Batch runs that finish with per-file failures
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
