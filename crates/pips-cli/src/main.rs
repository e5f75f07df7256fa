#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pips: roll a six-sided die and track your history",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format for non-interactive commands.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Open the interactive dice view",
        long_about = "Open the full-screen dice view. Runs when no subcommand is given.",
        after_help = "KEYS:\n    space, enter, r   roll (ignored while a roll is in flight)\n    c                 clear history\n    j/k, up/down      scroll history\n    q, esc            quit"
    )]
    Tui,

    #[command(
        about = "Roll without the interactive view",
        long_about = "Roll the die one or more times and print the history and statistics.",
        after_help = "EXAMPLES:\n    # Roll once\n    pips roll\n\n    # Roll 30 times with a fixed seed\n    pips roll -n 30 --seed 7\n\n    # Emit machine-readable output\n    pips roll -n 5 --format json"
    )]
    Roll(cmd::roll::RollArgs),

    #[command(
        about = "Show the pip layout of a face",
        after_help = "EXAMPLES:\n    # Draw the five face\n    pips face 5\n\n    # List pip positions as JSON\n    pips face 6 --format json"
    )]
    Face(cmd::face::FaceArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    pips completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, interactive: bool) {
    let filter = EnvFilter::try_from_env("PIPS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if interactive {
            // stderr shares the alternate screen
            "error"
        } else if verbose || env::var("DEBUG").is_ok() {
            "pips=debug,pips_core=debug,info"
        } else {
            "pips=info,warn"
        })
    });

    let format = env::var("PIPS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    init_tracing(cli.verbose, interactive);

    let config = pips_core::config::load_user_config()?;
    debug!(?config, "loaded config");
    let output = output::resolve_output_mode(cli.format, cli.json, config.output.as_deref());

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        None | Some(Commands::Tui) => tui::run_dice_tui(&config),
        Some(Commands::Roll(ref args)) => cmd::roll::run_roll(args, &config.roll, output),
        Some(Commands::Face(ref args)) => cmd::face::run_face(args, output),
        Some(Commands::Completions(args)) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::parse_from(["pips"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn roll_defaults_to_one() {
        let cli = Cli::parse_from(["pips", "roll"]);
        match cli.command {
            Some(Commands::Roll(args)) => {
                assert_eq!(args.count, 1);
                assert!(args.seed.is_none());
            }
            other => panic!("expected roll, got {other:?}"),
        }
    }

    #[test]
    fn roll_count_and_seed() {
        let cli = Cli::parse_from(["pips", "roll", "-n", "21", "--seed", "9"]);
        match cli.command {
            Some(Commands::Roll(args)) => {
                assert_eq!(args.count, 21);
                assert_eq!(args.seed, Some(9));
            }
            other => panic!("expected roll, got {other:?}"),
        }
    }

    #[test]
    fn roll_count_must_be_positive() {
        assert!(Cli::try_parse_from(["pips", "roll", "-n", "0"]).is_err());
    }

    #[test]
    fn format_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["pips", "face", "3", "--format", "json"]);
        assert_eq!(cli.format, Some(OutputMode::Json));
    }

    #[test]
    fn hidden_json_flag() {
        let cli = Cli::parse_from(["pips", "--json", "roll"]);
        assert!(cli.json);
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["pips", "completions", "zsh"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Zsh,
            }))
        ));
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
