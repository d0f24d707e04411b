//! Markdown parsing with comrak.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{Document, HeadingRef, LineType, RenderedLine, normalize_anchor};

/// Parse markdown source into a Document.
///
/// # Example
///
/// ```
/// use sidelegend::document::Document;
///
/// let doc = Document::parse("# Hello\n\nWorld").unwrap();
/// assert_eq!(doc.headings()[0].id.as_deref(), Some("hello"));
/// ```
impl Document {
    pub fn parse(source: &str) -> Result<Self> {
        parse(source)
    }

    pub fn parse_with_layout(source: &str, width: u16) -> Result<Self> {
        parse_with_layout(source, width)
    }
}

/// Parse markdown source into a Document.
pub fn parse(source: &str) -> Result<Document> {
    parse_with_layout(source, 80)
}

/// Parse markdown source into a Document wrapped to `width` columns.
pub fn parse_with_layout(source: &str, width: u16) -> Result<Document> {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut builder = LineBuilder::new(usize::from(width.max(1)));
    builder.process_node(root, 0, None);

    Ok(Document::new(
        source.to_string(),
        builder.lines,
        builder.headings,
    ))
}

fn create_options() -> Options {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    options
}

struct LineBuilder {
    lines: Vec<RenderedLine>,
    headings: Vec<HeadingRef>,
    /// Next suffix to try for each base id
    slug_counts: HashMap<String, usize>,
    /// Every id handed out so far, explicit ones included
    used_ids: HashSet<String>,
    wrap_width: usize,
}

impl LineBuilder {
    fn new(wrap_width: usize) -> Self {
        Self {
            lines: Vec::new(),
            headings: Vec::new(),
            slug_counts: HashMap::new(),
            used_ids: HashSet::new(),
            wrap_width,
        }
    }

    fn push(&mut self, content: String, line_type: LineType) {
        self.lines.push(RenderedLine::new(content, line_type));
    }

    fn push_empty(&mut self) {
        self.push(String::new(), LineType::Empty);
    }

    fn push_wrapped(&mut self, text: &str, line_type: LineType, first: &str, next: &str) {
        for line in wrap_text(text, self.wrap_width, first, next) {
            self.push(line, line_type);
        }
    }

    fn process_children<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: Option<&str>) {
        for child in node.children() {
            self.process_node(child, depth, marker);
        }
    }

    fn process_node<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: Option<&str>) {
        match &node.data.borrow().value {
            NodeValue::Heading(heading) => {
                let (text, explicit_id) = split_explicit_id(&extract_text(node));

                // Keep headings visually separated with two rows above.
                self.ensure_trailing_empty_lines(2);
                let line = self.lines.len();
                let id = explicit_id
                    .or_else(|| Some(normalize_anchor(&text)).filter(|slug| !slug.is_empty()))
                    .map(|base| self.claim_id(base));
                self.headings.push(HeadingRef {
                    level: heading.level,
                    text: text.clone(),
                    line,
                    id,
                });

                let prefix = "#".repeat(usize::from(heading.level));
                self.push(format!("{prefix} {text}"), LineType::Heading(heading.level));
                self.push_empty();
            }

            NodeValue::Paragraph => {
                let text = extract_text(node);
                self.push_wrapped(&text, LineType::Paragraph, "", "");
                self.push_empty();
            }

            NodeValue::CodeBlock(code_block) => {
                let title = code_block
                    .info
                    .split_whitespace()
                    .next()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("code")
                    .to_string();
                let literal = code_block.literal.clone();
                let content_width = literal
                    .lines()
                    .map(UnicodeWidthStr::width)
                    .max()
                    .unwrap_or(0)
                    .min(self.wrap_width.saturating_sub(4).max(1));
                let label = format!(" {title} ");
                let inner = content_width + 2;
                let rule = "─".repeat(inner.saturating_sub(label.width()));
                self.push(format!("┌{label}{rule}┐"), LineType::CodeBlock);
                for raw in literal.lines() {
                    let clipped = truncate_to_width(raw, content_width);
                    let pad = " ".repeat(content_width.saturating_sub(clipped.width()));
                    self.push(format!("│ {clipped}{pad} │"), LineType::CodeBlock);
                }
                self.push(format!("└{}┘", "─".repeat(inner)), LineType::CodeBlock);
                self.push_empty();
            }

            NodeValue::List(list) => {
                let delimiter = match list.delimiter {
                    ListDelimType::Paren => ')',
                    ListDelimType::Period => '.',
                };
                let list_type = list.list_type;
                let start = list.start;
                for (index, child) in node.children().enumerate() {
                    let item_marker = match list_type {
                        ListType::Bullet => "• ".to_string(),
                        ListType::Ordered => format!("{}{delimiter} ", start + index),
                    };
                    self.process_node(child, depth + 1, Some(&item_marker));
                }
                if depth == 0 {
                    self.push_empty();
                }
            }

            NodeValue::Item(_) | NodeValue::TaskItem(_) => {
                let indent = "  ".repeat(depth.saturating_sub(1));
                let marker = marker.unwrap_or("- ");
                let first = format!("{indent}{marker}");
                let next = format!("{indent}{}", " ".repeat(marker.width()));
                let mut rendered_any = false;
                for child in node.children() {
                    if matches!(child.data.borrow().value, NodeValue::Paragraph) {
                        let text = extract_text(child);
                        let prefix = if rendered_any { &next } else { &first };
                        self.push_wrapped(&text, LineType::ListItem(depth), prefix, &next);
                        rendered_any = true;
                    } else {
                        self.process_node(child, depth, None);
                    }
                }
                if !rendered_any {
                    self.push(first, LineType::ListItem(depth));
                }
            }

            NodeValue::BlockQuote => {
                let text = extract_text(node);
                self.push_wrapped(&text, LineType::BlockQuote, "│ ", "│ ");
                self.push_empty();
            }

            NodeValue::ThematicBreak => {
                self.push("---".to_string(), LineType::HorizontalRule);
                self.push_empty();
            }

            NodeValue::Table(_) => {
                for row in node.children() {
                    let cells: Vec<String> = row.children().map(extract_text).collect();
                    let line = truncate_to_width(&cells.join(" │ "), self.wrap_width);
                    self.push(line, LineType::Table);
                }
                self.push_empty();
            }

            _ => self.process_children(node, depth, marker),
        }
    }

    fn ensure_trailing_empty_lines(&mut self, count: usize) {
        if self.lines.is_empty() {
            return;
        }
        let existing = self
            .lines
            .iter()
            .rev()
            .take_while(|line| matches!(line.line_type(), LineType::Empty))
            .count();
        for _ in existing..count {
            self.push_empty();
        }
    }

    /// `base`, or `base-N` with the first `N` not handed out yet.
    fn claim_id(&mut self, base: String) -> String {
        let next = self.slug_counts.entry(base.clone()).or_insert(0);
        let mut id = if *next == 0 {
            base.clone()
        } else {
            format!("{base}-{next}")
        };
        while self.used_ids.contains(&id) {
            *next += 1;
            id = format!("{base}-{next}");
        }
        *next += 1;
        self.used_ids.insert(id.clone());
        id
    }
}

/// Split a trailing `{#custom-id}` attribute off heading text.
fn split_explicit_id(text: &str) -> (String, Option<String>) {
    let trimmed = text.trim_end();
    if let Some(without_brace) = trimmed.strip_suffix('}')
        && let Some(open) = without_brace.rfind("{#")
    {
        let id = without_brace[open + 2..].trim();
        if !id.is_empty() && !id.contains(char::is_whitespace) {
            return (without_brace[..open].trim_end().to_string(), Some(id.to_string()));
        }
    }
    (trimmed.to_string(), None)
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text.trim().to_string()
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(code) => text.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
        NodeValue::Paragraph if !text.is_empty() => text.push(' '),
        _ => {}
    }
    for child in node.children() {
        extract_text_recursive(child, text);
    }
}

/// Greedy word wrap measured in display columns.
fn wrap_text(text: &str, width: usize, first_prefix: &str, next_prefix: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = first_prefix.to_string();
    let mut current_width = first_prefix.width();
    let mut has_word = false;

    for word in text.split_whitespace() {
        let word_width = word.width();
        let needed = if has_word { word_width + 1 } else { word_width };
        if has_word && current_width + needed > width {
            out.push(std::mem::take(&mut current));
            current.push_str(next_prefix);
            current_width = next_prefix.width();
            has_word = false;
        }
        if has_word {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
        has_word = true;
    }
    if has_word || out.is_empty() {
        out.push(current);
    }
    out
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_document() {
        let doc = parse("").unwrap();
        assert_eq!(doc.line_count(), 0);
    }

    #[test]
    fn test_parse_heading() {
        let doc = parse("# Hello World").unwrap();
        assert_eq!(doc.headings().len(), 1);
        assert_eq!(doc.headings()[0].text, "Hello World");
        assert_eq!(doc.headings()[0].level, 1);
        assert_eq!(doc.headings()[0].id.as_deref(), Some("hello-world"));
    }

    #[test]
    fn test_parse_multiple_headings() {
        let doc = parse("# One\n\n## Two\n\n### Three").unwrap();
        let levels: Vec<u8> = doc.headings().iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 2, 3]);
    }

    #[test]
    fn test_heading_has_two_rows_above() {
        let doc = parse("Paragraph\n\n## Heading").unwrap();
        let line = doc.headings()[0].line;
        assert_eq!(line, 3);
        assert_eq!(doc.line(line - 1).unwrap().line_type(), &LineType::Empty);
        assert_eq!(doc.line(line - 2).unwrap().line_type(), &LineType::Empty);
    }

    #[test]
    fn test_first_heading_starts_at_top() {
        let doc = parse("# Top\n\nBody").unwrap();
        assert_eq!(doc.headings()[0].line, 0);
    }

    #[test]
    fn test_duplicate_heading_slugs_get_suffixes() {
        let doc = parse("## Notes\n\n## Notes\n\n## Notes").unwrap();
        let ids: Vec<Option<&str>> = doc.headings().iter().map(|h| h.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("notes"), Some("notes-1"), Some("notes-2")]);
    }

    #[test]
    fn test_generated_suffix_never_reuses_a_taken_slug() {
        let doc = parse("## Notes\n\n## Notes\n\n## Notes 1\n").unwrap();
        let ids: Vec<Option<&str>> = doc.headings().iter().map(|h| h.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("notes"), Some("notes-1"), Some("notes-1-1")]);
        assert_eq!(doc.heading_by_id("notes-1").map(|h| h.text.as_str()), Some("Notes"));
        assert_eq!(doc.heading_by_id("notes-1-1").map(|h| h.text.as_str()), Some("Notes 1"));
    }

    #[test]
    fn test_explicit_id_and_generated_slug_do_not_collide() {
        let doc = parse("## Setup\n\n## Install {#setup}\n\n## Run {#usage}\n\n## Usage\n").unwrap();
        let ids: Vec<Option<&str>> = doc.headings().iter().map(|h| h.id.as_deref()).collect();
        assert_eq!(
            ids,
            vec![Some("setup"), Some("setup-1"), Some("usage"), Some("usage-1")]
        );
    }

    #[test]
    fn test_non_latin_headings_get_ids() {
        let doc = parse("## 概要\n\n## Введение\n").unwrap();
        let ids: Vec<Option<&str>> = doc.headings().iter().map(|h| h.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("概要"), Some("введение")]);
    }

    #[test]
    fn test_heading_without_slug_has_no_id() {
        let doc = parse("## \u{00b6}\n\n## !!!").unwrap();
        assert!(doc.headings().iter().all(|h| h.id.is_none()));
    }

    #[test]
    fn test_explicit_heading_id() {
        let doc = parse("## Getting started {#start}").unwrap();
        let heading = &doc.headings()[0];
        assert_eq!(heading.text, "Getting started");
        assert_eq!(heading.id.as_deref(), Some("start"));
    }

    #[test]
    fn test_split_explicit_id_ignores_plain_braces() {
        assert_eq!(split_explicit_id("Set {a}"), ("Set {a}".to_string(), None));
        assert_eq!(split_explicit_id("X {# }"), ("X {# }".to_string(), None));
    }

    #[test]
    fn test_heading_inline_code_is_kept() {
        let doc = parse("## The `run` command").unwrap();
        assert_eq!(doc.headings()[0].text, "The run command");
    }

    #[test]
    fn test_paragraph_wraps_to_layout_width() {
        let doc = parse_with_layout("aaaa bbbb cccc dddd", 10).unwrap();
        assert_eq!(doc.line(0).unwrap().content(), "aaaa bbbb");
        assert_eq!(doc.line(1).unwrap().content(), "cccc dddd");
    }

    #[test]
    fn test_wider_layout_moves_headings_up() {
        let md = "word ".repeat(60) + "\n\n## After";
        let narrow = parse_with_layout(&md, 20).unwrap();
        let wide = parse_with_layout(&md, 200).unwrap();
        assert!(wide.headings()[0].line < narrow.headings()[0].line);
    }

    #[test]
    fn test_parse_code_block() {
        let doc = parse("```rust\nfn main() {}\n```").unwrap();
        assert!(doc.line(0).unwrap().content().starts_with("┌ rust "));
        assert_eq!(doc.line(1).unwrap().content(), "│ fn main() {} │");
        assert_eq!(doc.line(1).unwrap().line_type(), &LineType::CodeBlock);
    }

    #[test]
    fn test_parse_list() {
        let doc = parse("- one\n- two\n\n1. first\n2. second").unwrap();
        let contents: Vec<&str> = (0..doc.line_count())
            .filter_map(|i| doc.line(i))
            .map(RenderedLine::content)
            .collect();
        assert!(contents.contains(&"• one"));
        assert!(contents.contains(&"2. second"));
    }

    #[test]
    fn test_wrap_text_keeps_prefixes() {
        let lines = wrap_text("alpha beta gamma", 10, "- ", "  ");
        assert_eq!(lines, vec!["- alpha", "  beta", "  gamma"]);
    }
}
