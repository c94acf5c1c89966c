use std::{
    io::{IsTerminal, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;
use client_core::{
    load_settings, transcript::TranscriptRow, DocChatController, DocumentBackend,
    HttpDocumentBackend, PickedFile, SelectionSource,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{parse_command, Command, HELP};

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload a document and ask questions about it")]
struct Args {
    /// Document service base url; overrides the settings file and environment
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file (defaults to ./docchat.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Per-request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    /// Select this document at startup
    #[arg(long)]
    file: Option<PathBuf>,
}

struct Terminal {
    printed: usize,
    ansi: bool,
}

impl Terminal {
    /// Prints transcript rows added since the last call, then the typing marker if shown.
    fn flush_transcript(&mut self, controller: &mut DocChatController) {
        if !controller.take_scroll_request() {
            return;
        }
        let entries = controller.transcript().entries();
        for rendered in &entries[self.printed.min(entries.len())..] {
            println!("{}", render::render_row(TranscriptRow::Entry(rendered), self.ansi));
        }
        self.printed = entries.len();
        if controller.transcript().is_typing() {
            println!("{}", render::render_row(TranscriptRow::Typing, self.ansi));
        }
    }

    fn print_status(&self, controller: &DocChatController) {
        if let Some(banner) = &controller.display().status {
            println!("{}", render::render_banner(banner.kind, &banner.message));
        }
    }

    fn prompt(&self, controller: &DocChatController) {
        let prompt = if controller.session().document_ready {
            "question> "
        } else {
            "docchat> "
        };
        print!("{prompt}");
        let _ = std::io::stdout().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url.as_deref() {
        settings.server_url = client_core::config::normalize_server_url(server_url)?;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }
    settings.validate()?;
    tracing::info!(server_url = %settings.server_url, "starting terminal client");

    let backend = HttpDocumentBackend::new(&settings)?;
    let mut controller = DocChatController::new();
    let mut terminal = Terminal {
        printed: 0,
        ansi: std::io::stdout().is_terminal(),
    };

    println!("Connected to {}. Type /help for commands.", backend.server_url());
    if let Some(path) = args.file {
        controller.select_files(SelectionSource::Chooser, vec![PickedFile::from_path(path)]);
        for line in render::render_status(controller.display()) {
            println!("{line}");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        terminal.prompt(&controller);
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Empty => {}
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(message) => println!("{message}"),
            Command::Status => {
                for line in render::render_status(controller.display()) {
                    println!("{line}");
                }
            }
            Command::Open(path) => {
                controller
                    .select_files(SelectionSource::Chooser, vec![PickedFile::from_path(path)]);
                for line in render::render_status(controller.display()) {
                    println!("{line}");
                }
            }
            Command::Clear => {
                controller.select_files(SelectionSource::Chooser, Vec::new());
                println!("Selection cleared.");
            }
            Command::Upload => {
                let Some(ticket) = controller.begin_upload() else {
                    terminal.print_status(&controller);
                    continue;
                };
                terminal.print_status(&controller);
                let result = backend.ingest(&ticket.upload).await;
                controller.finish_upload(ticket, result);
                for line in render::render_status(controller.display()) {
                    println!("{line}");
                }
                terminal.flush_transcript(&mut controller);
            }
            Command::Ask(question) => {
                if !controller.session().document_ready {
                    println!("Upload a document first (/open <path>, then /upload).");
                    continue;
                }
                let Some(ticket) = controller.begin_question(&question) else {
                    continue;
                };
                terminal.flush_transcript(&mut controller);
                let result = backend.query(&ticket.question).await;
                controller.finish_question(ticket, result);
                terminal.flush_transcript(&mut controller);
            }
        }
    }

    Ok(())
}
