use crate::commands::manual::MANUAL;
use crate::completion::ShellHelper;
use crate::errors::{ShellError, ShellResult};
use crate::session::{Action, EntryId, EntryKind, Overlay, SessionState, TranscriptEntry};
use crate::terminal::Terminal;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{ColorMode, CompletionType, Config, Editor};
use std::collections::HashMap;
use std::io::{self, Write};
use tracing::debug;

const PROMPT: &str = "$ ";

/// Prints transcript changes to a line-oriented writer.
///
/// Entries are printed once when they appear. An entry replaced in place
/// (a job status line) is printed again with its new text.
#[derive(Default)]
pub struct TranscriptPrinter {
    printed: HashMap<EntryId, String>,
}

impl TranscriptPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write every entry that is new or changed since the last call.
    /// Command entries are skipped; the line editor already echoed them.
    pub fn flush(&mut self, state: &SessionState, out: &mut impl Write) -> io::Result<()> {
        if state.transcript.is_empty() && !self.printed.is_empty() {
            self.printed.clear();
            return Ok(());
        }
        for entry in state.transcript.iter() {
            if self.printed.get(&entry.id) == Some(&entry.text) {
                continue;
            }
            self.printed.insert(entry.id, entry.text.clone());
            if entry.kind != EntryKind::Command {
                writeln!(out, "{}", render_entry(entry))?;
            }
        }
        out.flush()
    }
}

fn render_entry(entry: &TranscriptEntry) -> String {
    let text = entry.highlighted.as_deref().unwrap_or(&entry.text);
    match entry.kind {
        EntryKind::Error => format!("\x1b[31m{}\x1b[0m", text),
        EntryKind::Success => format!("\x1b[32m{}\x1b[0m", text),
        EntryKind::Command | EntryKind::Info => text.to_string(),
    }
}

/// Text-mode rendering of an overlay.
pub fn render_overlay(state: &SessionState) -> Vec<String> {
    match &state.overlay {
        Overlay::None => Vec::new(),
        Overlay::Manual(Some(name)) => MANUAL
            .get(name.as_str())
            .map(|page| page.render(name))
            .unwrap_or_default(),
        Overlay::Manual(None) => {
            let mut lines = vec!["Manual pages:".to_string()];
            lines.extend(MANUAL.keys().map(|name| format!("  {}", name)));
            lines
        }
        Overlay::Monitor => {
            if state.jobs.is_empty() {
                return vec!["No jobs.".to_string()];
            }
            state.jobs.values().map(|job| job.status_line().text).collect()
        }
        Overlay::ScrapeResults(job_id) => {
            let Some(job) = state.jobs.get(job_id) else {
                return Vec::new();
            };
            let mut lines = vec![format!("Results of job {}:", job_id)];
            for result in job.results.iter().flatten() {
                lines.push(
                    serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string()),
                );
            }
            lines
        }
    }
}

fn readline_error(error: ReadlineError) -> ShellError {
    ShellError::external(format!("readline error: {}", error))
}

/// Interactive line-editor host around a [`Terminal`].
///
/// Reading a line blocks this task, so background updates (job progress)
/// show up the next time a line is submitted or Enter is pressed.
pub async fn run(mut terminal: Terminal) -> ShellResult<()> {
    let config = Config::builder()
        .color_mode(ColorMode::Enabled)
        .auto_add_history(true)
        .build();
    let mut editor: Editor<ShellHelper, DefaultHistory> =
        Editor::with_config(config).map_err(readline_error)?;
    editor.set_helper(Some(ShellHelper::new(
        terminal.registry().clone(),
        terminal.state(),
    )));
    editor.set_completion_type(CompletionType::List);

    let mut printer = TranscriptPrinter::new();
    let mut stdout = io::stdout();

    loop {
        terminal.process_pending();
        printer.flush(terminal.state(), &mut stdout)?;
        if let Some(helper) = editor.helper_mut() {
            helper.sync(terminal.state());
        }

        let line = match tokio::task::block_in_place(|| editor.readline(PROMPT)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(error) => return Err(readline_error(error)),
        };

        terminal.run_line(&line).await;
        while terminal.state().revealing {
            terminal.next_event().await;
            printer.flush(terminal.state(), &mut stdout)?;
        }
        printer.flush(terminal.state(), &mut stdout)?;

        if terminal.state().overlay != Overlay::None {
            debug!(overlay = ?terminal.state().overlay, "rendering overlay");
            for line in render_overlay(terminal.state()) {
                writeln!(stdout, "{}", line)?;
            }
            terminal.dispatch(Action::CloseOverlay);
        }
    }

    terminal.close();
    Ok(())
}
