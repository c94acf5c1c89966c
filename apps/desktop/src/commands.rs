//! Line commands understood by the terminal client.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Clear,
    Upload,
    Status,
    Help,
    Quit,
    Ask(String),
    Unknown(String),
    Empty,
}

pub const HELP: &str = "\
Commands:
  /open <path>   select a document to upload
  /clear         clear the current selection
  /upload        upload the selected document
  /status        show the selected document and service status
  /help          show this help
  /quit          exit
Anything else is sent as a question once a document has been uploaded.";

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Ask(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "open" if !arg.is_empty() => Command::Open(PathBuf::from(arg)),
        "open" => Command::Unknown("/open needs a path".into()),
        "clear" => Command::Clear,
        "upload" => Command::Upload,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(format!("unknown command /{other}; try /help")),
    }
}
