//! Tape pane rendering

use super::border_style;
use crate::interpreter::Tape;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Cells shown per row
const CELLS_PER_ROW: usize = 8;

/// Render the tape as rows of hex cells with the data pointer highlighted.
///
/// While `follow` is set the data pointer's row is kept on screen.
pub fn render_tape_pane(
    frame: &mut Frame,
    area: Rect,
    tape: &Tape,
    data_pointer: usize,
    is_focused: bool,
    follow: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Tape (ptr = {}) ", data_pointer))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    // The pointer may sit one cell past the touched part of the tape
    let shown_cells = tape.len().max(data_pointer + 1);
    let total_rows = shown_cells.div_ceil(CELLS_PER_ROW);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let pointer_row = data_pointer / CELLS_PER_ROW;
    if follow {
        if pointer_row < *scroll_offset {
            *scroll_offset = pointer_row;
        } else if pointer_row >= *scroll_offset + visible_height {
            *scroll_offset = pointer_row + 1 - visible_height;
        }
    }
    *scroll_offset = (*scroll_offset).min(total_rows.saturating_sub(visible_height));

    let lines: Vec<Line> = (*scroll_offset..total_rows)
        .take(visible_height)
        .map(|row| {
            let start = row * CELLS_PER_ROW;
            let mut spans = vec![Span::styled(
                format!("{:05} │", start),
                Style::default().fg(DEFAULT_THEME.comment),
            )];
            for index in start..(start + CELLS_PER_ROW).min(shown_cells) {
                let value = tape.get(index);
                let style = if index == data_pointer {
                    Style::default()
                        .bg(DEFAULT_THEME.border_focused)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD)
                } else if value == 0 {
                    Style::default().fg(DEFAULT_THEME.comment)
                } else {
                    Style::default().fg(DEFAULT_THEME.fg)
                };
                spans.push(Span::raw(" "));
                spans.push(Span::styled(format!("{:02x}", value), style));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
