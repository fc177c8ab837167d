//! Virtual shell engine for a portfolio terminal.
//!
//! A [`Terminal`] owns one session: a transcript, a read-only virtual file
//! tree, a command registry and any scrape jobs started from it. Command
//! lines are parsed into pipelines, run against the tree, and their results
//! applied to the session as [`session::Action`]s.

pub mod commands;
pub mod completion;
pub mod config;
pub mod errors;
pub mod history;
pub mod jobs;
pub mod logging;
pub mod navigation;
pub mod pipeline;
pub mod repl;
pub mod session;
pub mod terminal;
pub mod typewriter;
pub mod vfs;

pub use errors::{ErrorKind, ShellError, ShellResult};
pub use terminal::{KeyInput, Terminal, TerminalServices};
