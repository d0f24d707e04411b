//! Markdown document parsing and layout.
//!
//! This module handles:
//! - Parsing markdown with comrak
//! - Assigning anchor ids to headings
//! - Laying out wrapped lines for display

mod parser;
mod types;

use std::path::Path;

use anyhow::{Context, Result};

pub use parser::{parse, parse_with_layout};
pub use types::{Document, HeadingRef, LineType, RenderedLine};

/// Read and lay out a markdown file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: &Path, width: u16) -> Result<Document> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let source = String::from_utf8_lossy(&bytes);
    parse_with_layout(&source, width)
}
