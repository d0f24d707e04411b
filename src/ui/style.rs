//! Theming and color definitions.
//!
//! Uses ANSI colors that adapt to the terminal's color palette.

use ratatui::style::{Color, Modifier, Style};

use crate::document::LineType;
use crate::poi::PoiState;

/// Palette handles are colored from, picked by class name.
const HANDLE_PALETTE: &[Color] = &[
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
];

/// Get the style for a given line type.
pub fn style_for_line_type(line_type: &LineType) -> Style {
    match line_type {
        LineType::Heading(1) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineType::Heading(2) => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        LineType::Heading(3) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        LineType::Heading(_) => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD),
        LineType::CodeBlock => Style::default()
            .fg(Color::Indexed(245))
            .add_modifier(Modifier::DIM),
        LineType::BlockQuote => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::ITALIC),
        LineType::HorizontalRule => Style::default()
            .fg(Color::Indexed(240))
            .add_modifier(Modifier::DIM),
        LineType::ListItem(_) | LineType::Table | LineType::Paragraph | LineType::Empty => {
            Style::default()
        }
    }
}

/// Background color for handles of a given class.
///
/// The default `sidelegend` class is cyan; other classes get a stable color
/// from the palette so differently-classed handles stay distinguishable.
pub fn handle_color(class: &str) -> Color {
    if class == crate::poi::DEFAULT_CSS_CLASS {
        return HANDLE_PALETTE[0];
    }
    let sum: usize = class.bytes().map(usize::from).sum();
    HANDLE_PALETTE[sum % HANDLE_PALETTE.len()]
}

/// Style of a handle in a given state.
pub fn handle_style(class: &str, state: PoiState, hovered: bool) -> Style {
    let base = Style::default().bg(handle_color(class)).fg(Color::Black);
    let base = match state {
        PoiState::Pinned => base.add_modifier(Modifier::BOLD),
        PoiState::Visible => base,
        PoiState::Hidden => base.add_modifier(Modifier::DIM),
    };
    if hovered {
        base.add_modifier(Modifier::REVERSED)
    } else {
        base
    }
}
