//! Plain terminal rendering of transcript rows and display state.

use client_core::{
    display::{DisplayState, FileReadiness},
    markup::Span,
    transcript::{TranscriptRow, TYPING_PLACEHOLDER},
};
use shared::domain::{EntryRole, StatusKind};

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

pub fn render_row(row: TranscriptRow<'_>, ansi: bool) -> String {
    match row {
        TranscriptRow::Typing => style(&format!("... {TYPING_PLACEHOLDER}"), DIM, ansi),
        TranscriptRow::Entry(rendered) => {
            let label = format!("{}:", rendered.entry.role.label());
            let body = match rendered.entry.role {
                EntryRole::Bot => render_spans(&rendered.body.spans, ansi),
                EntryRole::User | EntryRole::System => strip_controls(&rendered.entry.text),
            };
            format!("{} {body}", style(&label, BOLD, ansi))
        }
    }
}

fn render_spans(spans: &[Span], ansi: bool) -> String {
    spans
        .iter()
        .map(|span| {
            let text = strip_controls(&span.text);
            if span.style.code_block {
                let block = text
                    .lines()
                    .map(|line| format!("    {line}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("\n{}\n", style(&block, DIM, ansi))
            } else if span.style.code {
                style(&format!("`{text}`"), DIM, ansi)
            } else if span.style.bold {
                style(&text, BOLD, ansi)
            } else if span.style.italic {
                style(&text, ITALIC, ansi)
            } else {
                text
            }
        })
        .collect()
}

/// Service text must not be able to emit escape sequences of its own.
fn strip_controls(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\n' | '\t' => ch,
            ch if ch.is_control() => '\u{FFFD}',
            ch => ch,
        })
        .collect()
}

fn style(text: &str, code: &str, ansi: bool) -> String {
    if ansi {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn render_status(display: &DisplayState) -> Vec<String> {
    let mut lines = Vec::new();
    match &display.file_info {
        Some(info) => {
            let marker = match info.readiness {
                FileReadiness::ReadyToUpload => "selected",
                FileReadiness::Processing => "uploading",
                FileReadiness::Processed => "ready",
            };
            lines.push(format!(
                "[{marker}] {} ({})",
                strip_controls(&info.file_name),
                strip_controls(&info.detail)
            ));
        }
        None => lines.push("[no document selected]".to_string()),
    }
    if let Some(banner) = &display.status {
        lines.push(render_banner(banner.kind, &banner.message));
    }
    lines
}

pub fn render_banner(kind: StatusKind, message: &str) -> String {
    let tag = match kind {
        StatusKind::Info => "info",
        StatusKind::Success => "ok",
        StatusKind::Error => "error",
    };
    format!("[{tag}] {}", strip_controls(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{
        markup::{render_bot_text, render_plain_text},
        transcript::RenderedEntry,
    };
    use shared::domain::TranscriptEntry;

    fn bot(text: &str) -> RenderedEntry {
        RenderedEntry {
            entry: TranscriptEntry::bot(text),
            body: render_bot_text(text),
        }
    }

    fn user(text: &str) -> RenderedEntry {
        RenderedEntry {
            entry: TranscriptEntry::user(text),
            body: render_plain_text(text),
        }
    }

    #[test]
    fn bot_rows_render_from_spans_without_ansi() {
        let entry = bot("**Total:** 42 via `sum`");
        let row = TranscriptRow::Entry(&entry);

        assert_eq!(render_row(row, false), "Assistant: Total: 42 via `sum`");
        assert_eq!(
            render_row(row, true),
            format!("{BOLD}Assistant:{RESET} {BOLD}Total:{RESET} 42 via {DIM}`sum`{RESET}")
        );
    }

    #[test]
    fn user_rows_are_verbatim() {
        let entry = user("what about **this**?");
        assert_eq!(
            render_row(TranscriptRow::Entry(&entry), false),
            "You: what about **this**?"
        );
    }

    #[test]
    fn escape_sequences_from_the_service_are_neutralized() {
        let entry = bot("**ok**\x1b[2J\x1b]0;pwned\x07\nnext\tline");
        let rendered = render_row(TranscriptRow::Entry(&entry), true);

        assert!(!rendered.contains("\x1b[2J"));
        assert!(!rendered.contains('\x07'));
        assert!(rendered.contains("\u{FFFD}[2J"));
        assert!(rendered.contains("\nnext\tline"));
        assert!(rendered.starts_with(&format!("{BOLD}Assistant:{RESET} {BOLD}ok{RESET}")));

        let entry = user("hi\x1b[31m");
        assert_eq!(
            render_row(TranscriptRow::Entry(&entry), false),
            "You: hi\u{FFFD}[31m"
        );
        assert_eq!(
            render_banner(StatusKind::Error, "bad\x1b[0m"),
            "[error] bad\u{FFFD}[0m"
        );
    }

    #[test]
    fn status_lists_file_and_banner() {
        let display = DisplayState::default();
        assert_eq!(render_status(&display), vec!["[no document selected]"]);
        assert_eq!(
            render_banner(StatusKind::Error, "unsupported format"),
            "[error] unsupported format"
        );
    }
}
