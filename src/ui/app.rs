//! Main TUI application state and logic

use crate::snapshot::{Ending, History, HistoryError};
use crate::ui::panes::{self, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Delay between automatic steps in play mode
const PLAY_INTERVAL: Duration = Duration::from_millis(250);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Program,
    Tape,
    Output,
}

impl FocusedPane {
    /// Move focus to the next pane (program -> output -> tape)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Program => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Tape,
            FocusedPane::Tape => FocusedPane::Program,
        }
    }

    /// Move focus to the previous pane
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Program => FocusedPane::Tape,
            FocusedPane::Output => FocusedPane::Program,
            FocusedPane::Tape => FocusedPane::Output,
        }
    }
}

/// The main application state
pub struct App {
    /// Recorded execution being browsed
    pub history: History,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub program_scroll: usize,
    pub tape_scroll: usize,
    pub output_scroll: usize,

    /// Whether the program and tape panes keep their pointer in view;
    /// cleared by manual scrolling, set again by any step
    pub program_follow: bool,
    pub tape_follow: bool,

    pub should_quit: bool,

    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,
}

impl App {
    /// Create a new app positioned at the first snapshot
    pub fn new(mut history: History) -> Self {
        history.rewind_to_start();
        let status_message = match history.ending() {
            Ending::Truncated => "Ready! (history truncated by snapshot limit)".to_string(),
            _ => "Ready!".to_string(),
        };
        App {
            history,
            focused_pane: FocusedPane::Program,
            program_scroll: 0,
            tape_scroll: 0,
            output_scroll: 0,
            program_follow: true,
            tape_follow: true,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
        }
    }

    /// Run the TUI event loop until the user quits
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                if self.history.step_forward().is_ok() {
                    self.follow_execution();
                } else {
                    self.is_playing = false;
                    self.status_message = self.end_message();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so play mode keeps ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Program (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        let Some(snapshot) = self.history.current() else {
            return;
        };
        let state = &snapshot.state;

        panes::render_program_pane(
            frame,
            left_rows[0],
            self.history.program(),
            state.instruction_pointer,
            self.focused_pane == FocusedPane::Program,
            self.program_follow,
            &mut self.program_scroll,
        );

        panes::render_terminal_pane(
            frame,
            left_rows[1],
            self.history.output_so_far(),
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        panes::render_tape_pane(
            frame,
            columns[1],
            &state.tape,
            state.data_pointer,
            self.focused_pane == FocusedPane::Tape,
            self.tape_follow,
            &mut self.tape_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &StatusRenderData {
                message: &self.status_message,
                position: self.history.position(),
                total_snapshots: self.history.total_snapshots(),
                steps: state.steps,
                memory_usage: self.history.memory_usage(),
                memory_limit: self.history.memory_limit(),
                is_playing: self.is_playing,
                failed: matches!(self.history.ending(), Ending::Failed { .. }),
            },
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if self.history.step_forward().is_err() {
                        break;
                    }
                    stepped += 1;
                }
                self.status_message = format!("Stepped forward {} step(s)", stepped);
                self.follow_execution();
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                let result = self.history.step_backward();
                self.report_step(result, "Stepped backward");
            }
            KeyCode::Right => {
                self.is_playing = false;
                let result = self.history.step_forward();
                self.report_step(result, "Stepped forward");
            }
            KeyCode::Up => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(1);
            }
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing;
                if self.is_playing {
                    self.last_play_time = Instant::now()
                        .checked_sub(PLAY_INTERVAL)
                        .unwrap_or_else(Instant::now);
                    self.status_message = "Playing...".to_string();
                } else {
                    self.status_message = "Paused".to_string();
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.history.jump_to_end();
                self.status_message = self.end_message();
                self.follow_execution();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.history.rewind_to_start();
                self.status_message = "Jumped to start".to_string();
                self.follow_execution();
            }
            _ => {}
        }
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Program => {
                self.program_follow = false;
                &mut self.program_scroll
            }
            FocusedPane::Tape => {
                self.tape_follow = false;
                &mut self.tape_scroll
            }
            FocusedPane::Output => &mut self.output_scroll,
        }
    }

    /// Snap every pane back to the current execution point
    fn follow_execution(&mut self) {
        self.program_follow = true;
        self.tape_follow = true;
        self.output_scroll = usize::MAX;
    }

    fn report_step(&mut self, result: Result<(), HistoryError>, done: &str) {
        self.status_message = match result {
            Ok(()) => done.to_string(),
            Err(HistoryError::AtEnd) => self.end_message(),
            Err(e) => format!("Cannot step: {}", e),
        };
        self.follow_execution();
    }

    /// Status text for the last snapshot
    fn end_message(&self) -> String {
        match self.history.ending() {
            Ending::Completed => "Program finished".to_string(),
            Ending::Failed { message, .. } => format!("Runtime error: {}", message),
            Ending::Truncated => "End of recorded history (snapshot limit reached)".to_string(),
        }
    }
}
