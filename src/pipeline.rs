//! Command line parsing and pipe execution.
//!
//! A line is split into stages on every `|` that is neither quoted nor
//! escaped, each stage is tokenized with `shell-words`, combined short flags
//! are expanded once, and the stages run in order with each stage's declared
//! stdout handed to the next one as stdin.

use crate::commands::args::is_flag;
use crate::commands::{Command, CommandContext, CommandOutput, ExecutionEnv, StagePosition};
use crate::errors::{ShellError, ShellResult};
use crate::navigation::NavigationTarget;
use crate::session::{Action, RevealMode};
use tracing::debug;

/// Split a line into pipe stages.
pub fn split_pipeline(input: &str) -> Vec<&str> {
    let mut stages = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            // Backslash is literal inside single quotes.
            (Some('\''), '\'') => quote = None,
            (Some('\''), _) => {}
            (_, '\\') => escaped = true,
            (Some('"'), '"') => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '|') => {
                stages.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    stages.push(input[start..].trim());
    stages
}

/// Expand combined short flags (`-al` → `-a -l`). The command name is left
/// alone; `--long`, `--key=value` and negative numbers are untouched.
pub fn expand_flags(tokens: Vec<String>) -> Vec<String> {
    let mut expanded = Vec::with_capacity(tokens.len());
    let mut tokens = tokens.into_iter();
    expanded.extend(tokens.next());

    for token in tokens {
        if is_flag(&token) && token.chars().count() > 2 && !token.contains('=') {
            expanded.extend(token.chars().skip(1).map(|c| format!("-{}", c)));
        } else {
            expanded.push(token);
        }
    }
    expanded
}

/// Parse a line into stages of argument vectors. A blank line has no stages.
pub fn parse_line(input: &str) -> ShellResult<Vec<Vec<String>>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    split_pipeline(input)
        .into_iter()
        .map(|stage| {
            let tokens = shell_words::split(stage).map_err(|_| ShellError::InvalidQuoting)?;
            if tokens.is_empty() {
                return Err(ShellError::usage("syntax error: empty command in pipe"));
            }
            Ok(expand_flags(tokens))
        })
        .collect()
}

/// Everything a line produced. Actions of stages that completed are kept
/// even when a later stage fails.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub actions: Vec<Action>,
    pub navigation: Option<NavigationTarget>,
    pub result: ShellResult<CommandOutput>,
}

impl PipelineOutcome {
    fn failed(error: ShellError) -> Self {
        Self {
            actions: Vec::new(),
            navigation: None,
            result: Err(error),
        }
    }
}

/// Parse and run one submitted line against `env`.
pub async fn execute_line(line: &str, env: &ExecutionEnv<'_>) -> PipelineOutcome {
    let stages = match parse_line(line) {
        Ok(stages) => stages,
        Err(error) => return PipelineOutcome::failed(error),
    };
    if stages.is_empty() {
        return PipelineOutcome {
            actions: Vec::new(),
            navigation: None,
            result: Ok(CommandOutput::empty()),
        };
    }

    // Every name must resolve before anything runs.
    let mut commands: Vec<&dyn Command> = Vec::with_capacity(stages.len());
    for args in &stages {
        match env.registry.get(&args[0]) {
            Some(command) => commands.push(command),
            None => return PipelineOutcome::failed(ShellError::CommandNotFound(args[0].clone())),
        }
    }

    execute_stages(&stages, &commands, env).await
}

async fn execute_stages(
    stages: &[Vec<String>],
    commands: &[&dyn Command],
    env: &ExecutionEnv<'_>,
) -> PipelineOutcome {
    let count = stages.len();
    debug!(stages = count, "executing command line");

    let mut actions = Vec::new();
    let mut navigation = None;
    let mut stdin = None;

    for (index, (args, command)) in stages.iter().zip(commands).enumerate() {
        let stage = StagePosition { index, count };
        let mut ctx = CommandContext::new(env, stdin.take(), stage);
        let result = command.execute(args, &mut ctx).await;
        let (emitted, requested) = ctx.into_parts();

        let output = match result.and_then(|output| check_reveal(command.name(), stage, output)) {
            Ok(output) => output,
            Err(error) => {
                debug!(command = command.name(), stage = index, error = %error, "stage failed");
                return PipelineOutcome {
                    actions,
                    navigation,
                    result: Err(error),
                };
            }
        };

        actions.extend(emitted);
        if navigation.is_none() {
            navigation = requested;
        }

        if stage.is_last() {
            return PipelineOutcome {
                actions,
                navigation,
                result: Ok(output),
            };
        }
        stdin = output.stdout;
    }

    // `stages` is non-empty, so the loop always returns from its last stage.
    PipelineOutcome {
        actions,
        navigation,
        result: Ok(CommandOutput::empty()),
    }
}

/// Staged output is only meaningful for a whole line. Inside a chain it is
/// acceptable only when the stage also hands stdout forward.
fn check_reveal(name: &str, stage: StagePosition, output: CommandOutput) -> ShellResult<CommandOutput> {
    if output.reveal != RevealMode::Staged || stage.count == 1 {
        return Ok(output);
    }
    if !stage.is_last() && output.stdout.is_some() {
        return Ok(CommandOutput {
            reveal: RevealMode::Immediate,
            ..output
        });
    }
    Err(ShellError::usage(format!(
        "{}: output cannot be used in a pipe",
        name
    )))
}
