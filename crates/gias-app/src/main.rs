//! Give-It-A-Summary terminal front end - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing (stderr, so the transcript on stdout stays clean)
//! 3. With `--init-config`, write the effective configuration and exit
//! 4. Open a chat session
//! 5. Run the interactive loop: read commands from stdin, print every new
//!    timeline message as it is appended

mod cli;
mod commands;
mod render;

use std::path::{Path, PathBuf};

use clap::Parser;
use gias_chat::{AttachmentMeta, ChatError, ChatSession, Message};
use gias_core::{AttachmentConfig, GiasConfig};
use gias_core::Result as GiasResult;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use cli::CliArgs;
use commands::{Command, HELP};
use render::{render_attachment, render_message};

/// Expand a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(rest)
}

/// Stage the file at `path`, returning the notice to show the user.
///
/// Files outside the accepted extensions are refused the way a file picker
/// would hide them; this is a convenience filter, not validation of content.
fn stage_file(
    session: &ChatSession,
    attachments: &AttachmentConfig,
    path: &Path,
) -> Result<String, ChatError> {
    let path = expand_home(path);
    let meta = AttachmentMeta::from_path(&path)?;
    if !attachments.accepts(&meta.name) {
        return Err(ChatError::Attachment(format!(
            "{} is not a supported file type (accepted: {})",
            meta.name,
            attachments.accepted_extensions.join(" ")
        )));
    }

    let notice = format!("Attached {}", render_attachment(&meta));
    Ok(match session.attach(meta) {
        Some(previous) => format!("{} (replaces {})", notice, previous.name),
        None => notice,
    })
}

/// The transcript as pretty-printed JSON.
fn export_transcript(messages: &[Message]) -> GiasResult<String> {
    Ok(serde_json::to_string_pretty(messages)?)
}

/// Apply one command. Returns `false` when the loop should stop.
fn handle(session: &ChatSession, config: &GiasConfig, command: Command) -> bool {
    match command {
        Command::Send(text) => match session.send(&text) {
            Ok(message) => tracing::debug!(message_id = message.id, "Message sent"),
            Err(e) if e.is_validation() => tracing::debug!("Nothing to send"),
            Err(e) => eprintln!("{}", e),
        },
        Command::Attach(path) => match stage_file(session, &config.attachments, &path) {
            Ok(notice) => println!("{}", notice),
            Err(e) => eprintln!("{}", e),
        },
        Command::Detach => {
            if let Some(previous) = session.pending_attachment() {
                session.detach();
                println!("Removed {}", render_attachment(&previous));
            }
        }
        Command::History => {
            for message in session.messages() {
                println!("{}", render_message(&message));
            }
        }
        Command::Export => match export_transcript(&session.messages()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("export failed: {}", e),
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => return false,
        Command::Invalid(reason) => eprintln!("{}", reason),
    }
    true
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config_loaded = GiasConfig::load(&config_file);
    let mut config = config_loaded.as_ref().cloned().unwrap_or_default();
    if let Some(delay) = args.ack_delay_ms {
        config.chat.ack_delay_ms = delay;
    }
    if args.no_greeting {
        config.chat.greeting.clear();
    }

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Give-It-A-Summary v{}", env!("CARGO_PKG_VERSION"));
    match config_loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Using default configuration"
        ),
    }

    if args.init_config {
        config.save(&config_file)?;
        println!("Wrote {}", config_file.display());
        return Ok(());
    }

    // Session.
    let session = ChatSession::new(config.chat.clone());
    let mut updates = session.subscribe();
    for message in session.messages() {
        println!("{}", render_message(&message));
    }
    println!("(type /help for commands)");

    // Interactive loop.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !handle(&session, &config, Command::parse(&line)) {
                    break;
                }
            }
            update = updates.recv() => match update {
                Ok(message) => println!("{}", render_message(&message)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Display fell behind; use /history to catch up");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    let pending = session.outstanding();
    session.close();
    tracing::info!(pending, "Goodbye");
    Ok(())
}
