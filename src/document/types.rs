//! Core document types.

use std::collections::HashMap;

use crate::surface::HeadingAnchor;

/// A parsed and laid-out markdown document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Original source text
    source: String,
    /// Rendered lines for display
    lines: Vec<RenderedLine>,
    /// Headings in document order
    headings: Vec<HeadingRef>,
    /// Heading index by anchor id
    heading_index: HashMap<String, usize>,
}

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(source: String, lines: Vec<RenderedLine>, headings: Vec<HeadingRef>) -> Self {
        let mut heading_index = HashMap::with_capacity(headings.len());
        for (idx, heading) in headings.iter().enumerate() {
            if let Some(id) = &heading.id {
                heading_index.entry(id.clone()).or_insert(idx);
            }
        }
        Self {
            source,
            lines,
            headings,
            heading_index,
        }
    }

    /// Get the original source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get total line count.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a specific line.
    pub fn line(&self, idx: usize) -> Option<&RenderedLine> {
        self.lines.get(idx)
    }

    /// Get lines starting at `offset`, at most `count` of them.
    pub fn visible_lines(&self, offset: usize, count: usize) -> &[RenderedLine] {
        let start = offset.min(self.lines.len());
        let end = offset.saturating_add(count).min(self.lines.len());
        &self.lines[start..end]
    }

    /// Get all headings.
    pub fn headings(&self) -> &[HeadingRef] {
        &self.headings
    }

    /// Find a heading by its anchor id.
    pub fn heading_by_id(&self, id: &str) -> Option<&HeadingRef> {
        self.heading_index
            .get(id)
            .and_then(|&idx| self.headings.get(idx))
    }

    /// Headings in the shape the POI registry scans.
    pub fn anchors(&self) -> Vec<HeadingAnchor> {
        self.headings
            .iter()
            .map(|h| HeadingAnchor {
                id: h.id.clone(),
                text: h.text.clone(),
                level: h.level,
            })
            .collect()
    }
}

/// A single rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    content: String,
    line_type: LineType,
}

impl RenderedLine {
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self { content, line_type }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn line_type(&self) -> &LineType {
        &self.line_type
    }
}

/// Type of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Normal paragraph text
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    /// Code block line
    CodeBlock,
    /// Block quote line
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    /// Table row
    Table,
    /// Horizontal rule
    HorizontalRule,
    /// Empty line
    Empty,
}

/// Reference to a heading in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    /// Heading level (1-6)
    pub level: u8,
    /// Heading text (plain, no formatting)
    pub text: String,
    /// Line number in rendered document
    pub line: usize,
    /// Anchor id; `None` when the text yields no usable slug
    pub id: Option<String>,
}

/// GitHub-style slug: lowercased letters and digits of any script joined by
/// single dashes.
pub(crate) fn normalize_anchor(s: &str) -> String {
    let mut out = String::new();
    let mut last_dash = false;
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}
