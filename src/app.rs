//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal voice note recorder that uploads recordings to a vnote server
/// and plays back server-generated text-to-speech audio
#[derive(Parser)]
#[command(name = "vnote")]
#[command(version)]
#[command(about = "Record voice notes and generate speech through a vnote server")]
#[command(
    long_about = "Record voice notes from your microphone and upload them to a vnote\nserver, or submit text for server-side text-to-speech synthesis and play\nback the most recently generated clip.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\nEXAMPLES:\n    # Record a voice note and upload it\n    $ vnote\n    $ vnote record\n\n    # Generate speech from text\n    $ vnote say \"Hello from the terminal\"\n\n    # Prompt interactively for the text\n    $ vnote say\n\n    # Fetch and play the most recent generated clip\n    $ vnote latest\n\n    # Edit configuration file\n    $ vnote config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/vnote/vnote.toml\n    Logs:               ~/.local/state/vnote/vnote.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a voice note and upload it to the server (default)
    ///
    /// Press Enter to start recording, Enter again to stop and upload,
    /// Escape/q to cancel. The elapsed recording time is shown while
    /// recording is in progress.
    #[command(visible_alias = "r")]
    Record,

    /// Submit text for server-side text-to-speech synthesis
    ///
    /// The text can be given as an argument or entered at an interactive
    /// prompt. After successful synthesis, the most recent generated clip
    /// is reloaded from the server.
    #[command(visible_alias = "s")]
    Say {
        /// Text to convert to speech (prompted for if omitted)
        #[arg(value_name = "TEXT")]
        text: Option<String>,
    },

    /// Fetch and play the most recently generated speech clip
    ///
    /// Asks the server for the newest synthesized audio file. If none
    /// exists yet, nothing is played. This command is best-effort and
    /// never fails hard on network errors.
    #[command(visible_alias = "l")]
    Latest,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in vnote.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Open configuration file in your preferred editor
    ///
    /// Edit the server URL, audio device, and other settings.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   vnote completions bash > vnote.bash
    ///   vnote completions zsh > _vnote
    ///   vnote completions fish > vnote.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails (e.g., recording, synthesis)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "vnote", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Record) => {
            commands::handle_record().await?;
        }
        Some(Commands::Say { text }) => {
            if let Err(e) = commands::handle_say(text).await {
                // Cancellation during the interactive prompt is not an error
                let err_msg = e.to_string();
                if err_msg.contains("cancelled") || err_msg.contains("interrupted") {
                    process::exit(0);
                } else {
                    return Err(e);
                }
            }
        }
        Some(Commands::Latest) => {
            commands::handle_latest().await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
