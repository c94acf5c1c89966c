//! Light markup for assistant replies.
//!
//! Replies are escaped first, then run through a fixed, ordered list of
//! substitutions (bold, italic, fenced code, inline code, line breaks). The
//! escaped-then-substituted HTML only ever contains the tags produced here,
//! which is what lets [`RenderedMessage::spans`] be recovered from it.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Invalid bold regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("Invalid italic regex"));
static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```([\s\S]*?)```").expect("Invalid code fence regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(.*?)`").expect("Invalid inline code regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub code_block: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

/// Presentation-ready form of one transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub html: String,
    pub spans: Vec<Span>,
}

impl RenderedMessage {
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// Renders an assistant reply.
pub fn render_bot_text(text: &str) -> RenderedMessage {
    let escaped = escape_html(text);
    let html = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let html = ITALIC.replace_all(&html, "<em>$1</em>");
    let html = FENCED_CODE.replace_all(&html, "<pre><code>$1</code></pre>");
    let html = INLINE_CODE.replace_all(&html, "<code>$1</code>");
    let html = html.replace('\n', "<br>");
    let spans = spans_from_markup(&html);
    RenderedMessage { html, spans }
}

/// Renders user and system entries: escaped, otherwise untouched.
pub fn render_plain_text(text: &str) -> RenderedMessage {
    let spans = if text.is_empty() {
        Vec::new()
    } else {
        vec![Span {
            text: text.to_string(),
            style: SpanStyle::default(),
        }]
    };
    RenderedMessage {
        html: escape_html(text),
        spans,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[derive(Default)]
struct StyleDepth {
    bold: u32,
    italic: u32,
    code: u32,
    pre: u32,
}

impl StyleDepth {
    fn style(&self) -> SpanStyle {
        SpanStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            code: self.code > 0,
            code_block: self.pre > 0,
        }
    }

    fn apply(&mut self, tag: &str) {
        fn open(depth: &mut u32) {
            *depth += 1;
        }
        fn close(depth: &mut u32) {
            *depth = depth.saturating_sub(1);
        }
        match tag {
            "strong" => open(&mut self.bold),
            "/strong" => close(&mut self.bold),
            "em" => open(&mut self.italic),
            "/em" => close(&mut self.italic),
            "code" => open(&mut self.code),
            "/code" => close(&mut self.code),
            "pre" => open(&mut self.pre),
            "/pre" => close(&mut self.pre),
            _ => {}
        }
    }
}

// Substitutions can cross each other (`**a *b** c*`), so tags are tracked as
// per-kind depths rather than a stack.
fn spans_from_markup(html: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut depth = StyleDepth::default();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(tag_start) = rest.find('<') else {
            push_span(&mut spans, &unescape_html(rest), depth.style());
            break;
        };
        if tag_start > 0 {
            push_span(&mut spans, &unescape_html(&rest[..tag_start]), depth.style());
        }
        let after = &rest[tag_start + 1..];
        let Some(tag_end) = after.find('>') else {
            push_span(&mut spans, &unescape_html(&rest[tag_start..]), depth.style());
            break;
        };
        let tag = &after[..tag_end];
        if tag == "br" {
            push_span(&mut spans, "\n", depth.style());
        } else {
            depth.apply(tag);
        }
        rest = &after[tag_end + 1..];
    }

    spans
}

fn push_span(spans: &mut Vec<Span>, text: &str, style: SpanStyle) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => spans.push(Span {
            text: text.to_string(),
            style,
        }),
    }
}

#[cfg(test)]
#[path = "tests/markup_tests.rs"]
mod tests;
