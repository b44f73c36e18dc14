//! TUI pane rendering modules
//!
//! - [`program`]: the loaded instruction stream with the instruction pointer
//! - [`tape`]: tape cells around the data pointer
//! - [`terminal`]: bytes the program has written so far
//! - [`status`]: status bar with keybindings and execution state
//!
//! Each pane exports one `render_*` function taking the frame, its area and
//! whatever slice of history state it draws.

pub mod program;
pub mod status;
pub mod tape;
pub mod terminal;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};

pub use program::render_program_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use tape::render_tape_pane;
pub use terminal::render_terminal_pane;

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}
