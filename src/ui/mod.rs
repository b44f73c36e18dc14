//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus
//! - **[`panes`]**: stateless render functions for each visible pane (program,
//!   tape, output, status bar)
//! - **[`theme`]**: color palette shared by all panes
//!
//! Construct an [`App`] from a recorded [`History`] and call [`App::run`].
//!
//! [`History`]: crate::snapshot::History
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
