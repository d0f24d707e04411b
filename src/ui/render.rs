use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;
use crate::surface::HandleId;

use super::{DOCUMENT_LEFT_PADDING, status, style};

/// Area handles float over: everything but the status row.
pub fn document_area(area: Rect) -> Rect {
    Rect {
        height: area.height.saturating_sub(1),
        ..area
    }
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let doc_area = document_area(area);
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    render_document(model, frame, doc_area);
    render_handles(model, frame, doc_area);
    status::render_status_bar(model, frame, status_area);
}

fn render_document(model: &Model, frame: &mut Frame, area: Rect) {
    let viewport = model.surface.viewport();
    let lines: Vec<Line> = model
        .surface
        .document()
        .visible_lines(viewport.offset(), usize::from(viewport.height()))
        .iter()
        .map(|line| {
            Line::styled(
                line.content().to_string(),
                style::style_for_line_type(line.line_type()),
            )
        })
        .collect();

    let block = Block::default()
        .borders(Borders::NONE)
        .padding(Padding::left(DOCUMENT_LEFT_PADDING));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_handles(model: &Model, frame: &mut Frame, area: Rect) {
    // Pinned handle last so it is never covered by a neighbor.
    let mut order: Vec<&crate::poi::Poi> = model.registry.pois().iter().collect();
    order.sort_by_key(|poi| poi.is_pinned());

    for poi in order {
        let handle = poi.handle();
        let Some(rect) = model.surface.handle_rect(handle, area) else {
            continue;
        };
        let Some(class) = model.surface.handles().get(handle.0).map(|h| h.class.as_str()) else {
            continue;
        };
        let hovered = model.hovered == Some(handle);
        let label = model.surface.visible_label(handle, rect);
        let style = style::handle_style(class, poi.state(), hovered);
        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(label).style(style), rect);
    }
}

/// Handle under a mouse position, if any.
pub fn handle_at(model: &Model, column: u16, row: u16) -> Option<HandleId> {
    let viewport = model.surface.viewport();
    let area = Rect::new(0, 0, viewport.width(), viewport.height());
    model.surface.handle_at(column, row, area)
}
