//! Markup helpers — the two-mode tag lexer used to pace reveals, and a
//! small renderer that turns response markup into styled plain-text lines
//! for terminal frontends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LexMode {
    #[default]
    InText,
    InTag,
}

/// Tracks whether the character stream is currently inside a `<...>` tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupLexer {
    mode: LexMode,
}

impl MarkupLexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> LexMode {
        self.mode
    }

    /// Feed one character and return the mode after it.
    pub fn feed(&mut self, c: char) -> LexMode {
        match c {
            '<' => self.mode = LexMode::InTag,
            '>' => self.mode = LexMode::InText,
            _ => {}
        }
        self.mode
    }
}

// ── Rendering ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
}

/// One display line made of styled runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupLine {
    pub runs: Vec<Run>,
}

impl MarkupLine {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn push(&mut self, text: &str, bold: bool) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.bold == bold => last.text.push_str(text),
            _ => self.runs.push(Run {
                text: text.to_string(),
                bold,
            }),
        }
    }
}

/// Render markup into lines. Block tags (`p`, `li`, `br`, lists) break
/// lines, `strong`/`b` toggle bold, list items get a bullet, and unknown
/// tags are dropped. A trailing unterminated tag (mid-reveal) is ignored.
pub fn render_lines(markup: &str) -> Vec<MarkupLine> {
    let mut lines: Vec<MarkupLine> = Vec::new();
    let mut current = MarkupLine::default();
    let mut bold = 0u32;
    let mut rest = markup;

    let flush = |current: &mut MarkupLine, lines: &mut Vec<MarkupLine>| {
        if !current.runs.is_empty() {
            lines.push(std::mem::take(current));
        }
    };

    while !rest.is_empty() {
        match rest.find('<') {
            Some(0) => {
                let Some(end) = rest.find('>') else {
                    break;
                };
                let tag = rest[1..end].trim();
                rest = &rest[end + 1..];
                let closing = tag.starts_with('/');
                let name = tag
                    .trim_start_matches('/')
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or("")
                    .to_ascii_lowercase();
                match name.as_str() {
                    "p" | "ul" | "ol" | "div" | "h1" | "h2" | "h3" | "h4" => {
                        flush(&mut current, &mut lines)
                    }
                    "br" => flush(&mut current, &mut lines),
                    "li" => {
                        flush(&mut current, &mut lines);
                        if !closing {
                            current.push("• ", false);
                        }
                    }
                    "strong" | "b" => {
                        if closing {
                            bold = bold.saturating_sub(1);
                        } else {
                            bold += 1;
                        }
                    }
                    _ => {}
                }
            }
            Some(idx) => {
                push_text(&mut current, &rest[..idx], bold > 0);
                rest = &rest[idx..];
            }
            None => {
                push_text(&mut current, rest, bold > 0);
                rest = "";
            }
        }
    }
    flush(&mut current, &mut lines);
    lines
}

/// Push a text span, collapsing whitespace the way a browser would and
/// turning raw newlines into spaces.
fn push_text(current: &mut MarkupLine, raw: &str, bold: bool) {
    let decoded = decode_entities(raw);
    let mut collapsed = String::with_capacity(decoded.len());
    let mut last_space = current.runs.is_empty() || current.text().ends_with(' ');
    for c in decoded.chars() {
        if c.is_whitespace() {
            if !last_space {
                collapsed.push(' ');
                last_space = true;
            }
        } else {
            collapsed.push(c);
            last_space = false;
        }
    }
    current.push(&collapsed, bold);
}

/// Decode the handful of entities canned responses use.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
