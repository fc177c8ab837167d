use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::{ShellError, ShellResult};
use crate::vfs::{FileTree, VirtualPath};
use async_trait::async_trait;

pub struct WcCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Counts {
    lines: usize,
    words: usize,
    chars: usize,
}

impl Counts {
    /// Each line counts its trailing newline.
    fn of(input: &[String]) -> Self {
        Self {
            lines: input.len(),
            words: input.iter().map(|l| l.split_whitespace().count()).sum(),
            chars: input.iter().map(|l| l.chars().count() + 1).sum(),
        }
    }
}

#[async_trait]
impl Command for WcCommand {
    fn name(&self) -> &'static str {
        "wc"
    }

    fn description(&self) -> &'static str {
        "Count lines, words and characters"
    }

    fn usage(&self) -> &'static str {
        "wc [-l] [-w] [-c] [file]"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        let parsed = ParsedArgs::parse(args, &["l", "w", "c"])?;
        if parsed.positionals.len() > 1 {
            return Err(ShellError::usage(format!("usage: {}", self.usage())));
        }
        let file = parsed.positional(0);
        let counts = Counts::of(&ctx.input_lines("wc", file)?);

        let mut selected = Vec::new();
        let all = !parsed.has_any(&["l", "w", "c"]);
        if all || parsed.has("l") {
            selected.push(counts.lines);
        }
        if all || parsed.has("w") {
            selected.push(counts.words);
        }
        if all || parsed.has("c") {
            selected.push(counts.chars);
        }

        let mut line = match selected.as_slice() {
            [single] => single.to_string(),
            many => many
                .iter()
                .map(|n| format!("{:>7}", n))
                .collect::<Vec<_>>()
                .join(" "),
        };
        if let Some(file) = file.filter(|_| selected.len() > 1) {
            line.push(' ');
            line.push_str(file);
        }
        Ok(CommandOutput::text(vec![line]))
    }

    fn suggest(&self, partial: &str, tree: &FileTree, cwd: &VirtualPath) -> Vec<String> {
        tree.complete_path(cwd, partial)
    }
}
