//! Program pane: the instruction stream laid out in rows, with the
//! instruction pointer and its matching bracket highlighted

use super::border_style;
use crate::alphabet::Instruction;
use crate::interpreter::Program;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Glyph drawn for the end-of-program marker
const END_GLYPH: char = '■';

fn instruction_color(instruction: Instruction) -> Color {
    match instruction {
        Instruction::MoveRight | Instruction::MoveLeft => DEFAULT_THEME.pointer,
        Instruction::Increment | Instruction::Decrement => DEFAULT_THEME.arithmetic,
        Instruction::Output | Instruction::Input => DEFAULT_THEME.io,
        Instruction::LoopOpen | Instruction::LoopClose => DEFAULT_THEME.bracket,
        Instruction::EndOfProgram => DEFAULT_THEME.comment,
    }
}

/// Render the program pane.
///
/// `scroll_offset` is the first visible row. While `follow` is set it is
/// pulled along so the instruction pointer's row stays on screen.
pub fn render_program_pane(
    frame: &mut Frame,
    area: Rect,
    program: &Program,
    instruction_pointer: usize,
    is_focused: bool,
    follow: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Program ({} instructions) ", program.len()))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let row_width = area.width.saturating_sub(2).max(1) as usize;
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let partner = program.jump_target(instruction_pointer);

    let rows: Vec<Line> = program
        .instructions()
        .chunks(row_width)
        .enumerate()
        .map(|(row, chunk)| {
            let spans: Vec<Span> = chunk
                .iter()
                .enumerate()
                .map(|(col, &instruction)| {
                    let ip = row * row_width + col;
                    let glyph = instruction.symbol().unwrap_or(END_GLYPH);
                    let mut style = Style::default().fg(instruction_color(instruction));
                    if ip == instruction_pointer {
                        style = style
                            .bg(DEFAULT_THEME.border_focused)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD);
                    } else if Some(ip) == partner {
                        style = style
                            .bg(DEFAULT_THEME.current_line_bg)
                            .add_modifier(Modifier::UNDERLINED);
                    }
                    Span::styled(glyph.to_string(), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let ip_row = instruction_pointer / row_width;
    if follow {
        if ip_row < *scroll_offset {
            *scroll_offset = ip_row;
        } else if ip_row >= *scroll_offset + visible_height {
            *scroll_offset = ip_row + 1 - visible_height;
        }
    }
    *scroll_offset = (*scroll_offset).min(rows.len().saturating_sub(visible_height));

    let visible: Vec<Line> = rows
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);
}
