//! Plain-terminal rendering of answer markdown.
//!
//! Supports the subset answers actually use: paragraphs, headings, bullet
//! and numbered lists, emphasis, inline code, fenced code blocks and links.
//! Paragraph text is word-wrapped to the configured width. With `color`
//! off the output is plain text, so it is safe to pipe.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const UNDERLINE: &str = "\x1b[4m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

struct Renderer {
    color: bool,
    width: usize,
    out: String,
    /// Inline text of the block being built.
    line: String,
    /// One entry per open list: next item number, or `None` for bullets.
    lists: Vec<Option<u64>>,
    /// Text prepended to the first wrapped line of the current block.
    item_prefix: Option<String>,
    in_code_block: bool,
    link_url: Option<String>,
    heading: Option<HeadingLevel>,
    bold: usize,
    italic: usize,
}

impl Renderer {
    fn new(color: bool, width: usize) -> Self {
        Self {
            color,
            width,
            out: String::new(),
            line: String::new(),
            lists: Vec::new(),
            item_prefix: None,
            in_code_block: false,
            link_url: None,
            heading: None,
            bold: 0,
            italic: 0,
        }
    }

    fn style(&mut self, code: &str) {
        if self.color {
            self.line.push_str(code);
        }
    }

    /// Close the current style run and re-open whatever is still active.
    fn restyle(&mut self) {
        if !self.color {
            return;
        }
        self.line.push_str(RESET);
        if self.heading.is_some() || self.bold > 0 {
            self.line.push_str(BOLD);
        }
        if self.italic > 0 {
            self.line.push_str(ITALIC);
        }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.lists.len())
    }

    fn blank_line(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    /// Wrap and emit the pending inline text as one block.
    fn flush(&mut self) {
        let text = std::mem::take(&mut self.line);
        if text.trim().is_empty() && self.item_prefix.is_none() {
            return;
        }
        let indent = self.indent();
        let first = match self.item_prefix.take() {
            Some(prefix) => format!("{}{}", &indent[..indent.len().saturating_sub(2)], prefix),
            None => indent.clone(),
        };
        let available = self.width.saturating_sub(indent.len()).max(10);
        for (i, line) in wrap(&text, available).iter().enumerate() {
            self.out.push_str(if i == 0 { &first } else { &indent });
            self.out.push_str(line);
            self.out.push('\n');
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    let indent = format!("{}    ", self.indent());
                    for line in text.lines() {
                        self.out.push_str(&indent);
                        if self.color {
                            self.out.push_str(DIM);
                            self.out.push_str(line);
                            self.out.push_str(RESET);
                        } else {
                            self.out.push_str(line);
                        }
                        self.out.push('\n');
                    }
                } else {
                    self.line.push_str(&text);
                }
            }
            Event::Code(code) => {
                if self.color {
                    self.line.push_str(CYAN);
                    self.line.push_str(&code);
                    self.restyle();
                } else {
                    self.line.push('`');
                    self.line.push_str(&code);
                    self.line.push('`');
                }
            }
            Event::SoftBreak => self.line.push(' '),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.blank_line();
                self.out.push_str(&"-".repeat(self.width.min(40)));
                self.out.push('\n');
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            Tag::Heading { level, .. } => {
                self.flush();
                self.blank_line();
                self.heading = Some(level);
                self.style(BOLD);
                if level == HeadingLevel::H1 {
                    self.style(UNDERLINE);
                }
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.blank_line();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank_line();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.item_prefix = Some(marker);
            }
            Tag::Strong => {
                self.bold += 1;
                self.style(BOLD);
            }
            Tag::Emphasis => {
                self.italic += 1;
                self.style(ITALIC);
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.style(UNDERLINE);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush(),
            TagEnd::Heading(_) => {
                self.heading = None;
                self.restyle();
                self.flush();
            }
            TagEnd::CodeBlock => self.in_code_block = false,
            TagEnd::Item => self.flush(),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Strong => {
                self.bold = self.bold.saturating_sub(1);
                self.restyle();
            }
            TagEnd::Emphasis => {
                self.italic = self.italic.saturating_sub(1);
                self.restyle();
            }
            TagEnd::Link => {
                self.restyle();
                if let Some(url) = self.link_url.take() {
                    self.line.push_str(&format!(" ({})", url));
                }
            }
            _ => {}
        }
    }
}

/// Render markdown for a terminal `width` columns wide.
pub fn to_terminal(markdown: &str, color: bool, width: usize) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
    let mut renderer = Renderer::new(color, width);
    for event in parser {
        renderer.event(event);
    }
    renderer.flush();
    renderer.out.trim_end().to_string()
}

/// Visible width of `s`, skipping ANSI escape sequences.
fn visible_len(s: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            len += 1;
        }
    }
    len
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let len = visible_len(word);
        if current_len > 0 && current_len + 1 + len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += len;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
