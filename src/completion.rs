use crate::commands::CommandRegistry;
use crate::session::SessionState;
use crate::vfs::{FileTree, VirtualPath};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::sync::Arc;

/// One completion choice: what to list and what the input becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub display: String,
    pub replacement: String,
}

/// Candidates for the whole `input` line.
///
/// The word being completed is the last one of the last pipe stage. With no
/// space in that stage the candidates are command names; otherwise the
/// command's own `suggest` hook provides them. Replacements are full input
/// lines, with whitespace-containing suggestions wrapped in double quotes.
pub fn complete(
    input: &str,
    registry: &CommandRegistry,
    tree: &FileTree,
    cwd: &VirtualPath,
) -> Vec<CompletionCandidate> {
    let stage_start = last_unquoted(input, |c| c == '|').map_or(0, |idx| idx + 1);
    let stage = &input[stage_start..];
    let word_offset = stage.len() - stage.trim_start().len();
    let stage_text = &stage[word_offset..];
    let head = &input[..stage_start + word_offset];

    if !stage_text.contains(char::is_whitespace) {
        let mut names: Vec<&str> = registry
            .names()
            .into_iter()
            .filter(|name| name.starts_with(stage_text))
            .collect();
        names.sort_unstable();
        return names
            .into_iter()
            .map(|name| CompletionCandidate {
                display: name.to_string(),
                replacement: format!("{}{}", head, name),
            })
            .collect();
    }

    let command_name = stage_text.split_whitespace().next().unwrap_or_default();
    let Some(command) = registry.get(command_name) else {
        return Vec::new();
    };

    let partial_start = last_unquoted(stage_text, char::is_whitespace).map_or(0, |idx| idx + 1);
    let before_partial = &stage_text[..partial_start];
    let partial = unquote(&stage_text[partial_start..]);

    command
        .suggest(partial, tree, cwd)
        .into_iter()
        .filter(|suggestion| suggestion.starts_with(partial))
        .map(|suggestion| CompletionCandidate {
            replacement: format!("{}{}{}", head, before_partial, quote(&suggestion)),
            display: suggestion,
        })
        .collect()
}

/// Byte index of the last char matching `pred` outside a quoted span.
fn last_unquoted(text: &str, pred: impl Fn(char) -> bool) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut found = None;
    for (idx, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if pred(c) => found = Some(idx),
            None => {}
        }
    }
    found
}

fn unquote(word: &str) -> &str {
    let Some(first) = word.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return word;
    };
    let inner = &word[1..];
    inner.strip_suffix(first).unwrap_or(inner)
}

fn quote(word: &str) -> String {
    if word.contains(char::is_whitespace) {
        format!("\"{}\"", word)
    } else {
        word.to_string()
    }
}

/// rustyline helper so a line-editor host gets the same completion as the
/// engine's own Tab handling.
pub struct ShellHelper {
    registry: Arc<CommandRegistry>,
    tree: FileTree,
    cwd: VirtualPath,
}

impl ShellHelper {
    pub fn new(registry: Arc<CommandRegistry>, state: &SessionState) -> Self {
        Self {
            registry,
            tree: state.tree.clone(),
            cwd: state.working_directory.clone(),
        }
    }

    /// Pick up a new working directory or newly materialized files.
    pub fn sync(&mut self, state: &SessionState) {
        self.cwd = state.working_directory.clone();
        if self.tree != state.tree {
            self.tree = state.tree.clone();
        }
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = complete(&line[..pos], &self.registry, &self.tree, &self.cwd)
            .into_iter()
            .map(|c| Pair {
                display: c.display,
                replacement: c.replacement,
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
