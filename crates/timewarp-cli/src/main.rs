#![forbid(unsafe_code)]

mod cmd;
mod output;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use timewarp_core::config::{parse_utc_offset, resolve_config};
use timewarp_core::error::ErrorCode;
use timewarp_core::feed::FeedError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tw: scrub through the history of a task board",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (default: pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: ./.timewarp.toml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Zone for calendar dates, e.g. `+02:00` (overrides `timeline.utc_offset`).
    #[arg(long, global = true, value_name = "OFFSET", allow_hyphen_values = true)]
    utc_offset: Option<String>,

    /// Treat this date (YYYY-MM-DD) as today.
    #[arg(long, global = true, value_name = "DATE")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "List timeline anchor dates",
        long_about = "List the anchor dates a scrub position maps onto, with the position of each.",
        after_help = "EXAMPLES:\n    # Show the timeline for an export\n    tw index --events events.json --tasks tasks.json\n\n    # Emit machine-readable output\n    tw index -e events.json -t tasks.json --json"
    )]
    Index(cmd::index::IndexArgs),

    #[command(
        about = "Reconstruct task state at a point in time",
        long_about = "Replay the activity log onto baseline state and show every task as of the end of the selected day.",
        after_help = "EXAMPLES:\n    # State today\n    tw snapshot -e events.json -t tasks.json\n\n    # Halfway through the timeline\n    tw snapshot -e events.json -t tasks.json --position 50\n\n    # As of a calendar date\n    tw snapshot -e events.json -t tasks.json --date 2024-01-05"
    )]
    Snapshot(cmd::snapshot::SnapshotArgs),

    #[command(
        about = "Play the timeline forward",
        long_about = "Autoplay from a scrub position to today, printing one frame per timer tick.",
        after_help = "EXAMPLES:\n    # Play from the beginning\n    tw play -e events.json -t tasks.json\n\n    # Faster, from the midpoint, as JSON Lines\n    tw play -e events.json -t tasks.json --from 50 --interval-ms 20 --json"
    )]
    Play(cmd::play::PlayArgs),

    #[command(
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tw completions bash\n\n    # Generate zsh completions\n    tw completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TIMEWARP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "timewarp_core=debug,tw=debug,info"
        } else {
            "warn"
        })
    });

    let format = env::var("TIMEWARP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Map a failure to its stable code.
///
/// Typed library errors carry their own code; edges in this binary tag
/// failures by attaching an [`ErrorCode`] as context.
fn error_code(err: &anyhow::Error) -> ErrorCode {
    if let Some(code) = err.downcast_ref::<ErrorCode>() {
        return *code;
    }
    if let Some(feed) = err.downcast_ref::<FeedError>() {
        return feed.code();
    }
    ErrorCode::InternalUnexpected
}

/// Human message for a failure, without the code tag itself.
///
/// Causes whose text is already the tail of the previous message are
/// skipped, since typed errors often print their source inline.
fn error_message(err: &anyhow::Error) -> String {
    // tags are attached as the outermost context
    let tagged = err.downcast_ref::<ErrorCode>().is_some();
    let mut message = String::new();
    for cause in err.chain().skip(usize::from(tagged)).map(ToString::to_string) {
        if message.ends_with(&cause) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&cause);
    }
    if message.is_empty() {
        error_code(err).message().to_string()
    } else {
        message
    }
}

fn run(cli: Cli, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command, &mut std::io::stdout());
    }

    let project_root = env::current_dir().context(ErrorCode::InternalUnexpected)?;
    let config =
        resolve_config(cli.config.as_deref(), &project_root).context(ErrorCode::ConfigParseError)?;

    let zone = match cli.utc_offset.as_deref() {
        Some(raw) => parse_utc_offset(raw).context(ErrorCode::InvalidArgument)?,
        None => config.timeline.zone().context(ErrorCode::ConfigParseError)?,
    };

    let ctx = cmd::Context {
        config,
        zone,
        today: cli.today,
        output,
    };

    match cli.command {
        Commands::Index(ref args) => cmd::index::run_index(args, &ctx),
        Commands::Snapshot(ref args) => cmd::snapshot::run_snapshot(args, &ctx),
        Commands::Play(ref args) => cmd::play::run_play(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    match run(cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = error_code(&err);
            tracing::debug!(code = %code, error = ?err, "command failed");
            let cli_error = CliError::coded(code, error_message(&err));
            if render_error(output, &cli_error).is_err() {
                eprintln!("error[{code}]: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
