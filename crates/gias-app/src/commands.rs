//! Input line parsing for the interactive loop.

use std::path::PathBuf;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: send it with whatever file is attached.
    Send(String),
    /// `/attach <path>`: stage a file.
    Attach(PathBuf),
    /// `/detach`: drop the staged file.
    Detach,
    /// `/history`: reprint the timeline.
    History,
    /// `/export`: print the timeline as JSON.
    Export,
    Help,
    Quit,
    /// Slash command that needs fixing, with the reason.
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Send(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "attach" if arg.is_empty() => Command::Invalid("usage: /attach <path>".to_string()),
            "attach" => Command::Attach(PathBuf::from(arg)),
            "detach" => Command::Detach,
            "history" => Command::History,
            "export" => Command::Export,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Invalid(format!("unknown command: /{}", other)),
        }
    }
}

pub const HELP: &str = "\
Type a request and press Enter to send it.
  /attach <path>  stage a file (.pdf .docx .txt .xlsx .xls .csv)
  /detach         drop the staged file
  /history        show the conversation so far
  /export         print the conversation as JSON
  /help           show this help
  /quit           leave";
