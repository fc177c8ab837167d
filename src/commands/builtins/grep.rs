use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::{ShellError, ShellResult};
use crate::session::OutputLine;
use crate::vfs::{FileTree, VirtualPath};
use async_trait::async_trait;
use regex::{Captures, Regex, RegexBuilder};

const MATCH_START: &str = "\x1b[1;31m";
const MATCH_END: &str = "\x1b[0m";

pub struct GrepCommand;

/// Case-insensitive regex, or the escaped literal if `pattern` is not a
/// valid regex.
fn build_matcher(pattern: &str) -> ShellResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .map_err(|e| ShellError::usage(format!("grep: {}", e)))
}

fn highlight(matcher: &Regex, line: &str) -> String {
    matcher
        .replace_all(line, |caps: &Captures| {
            format!("{}{}{}", MATCH_START, &caps[0], MATCH_END)
        })
        .into_owned()
}

#[async_trait]
impl Command for GrepCommand {
    fn name(&self) -> &'static str {
        "grep"
    }

    fn description(&self) -> &'static str {
        "Search lines for a pattern"
    }

    fn usage(&self) -> &'static str {
        "grep [-i] [-v] [-n] [-c] <pattern> [file]"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        let parsed = ParsedArgs::parse(args, &["i", "v", "n", "c"])?;
        let invert = parsed.has("v");
        let numbered = parsed.has("n");
        let count_only = parsed.has("c");

        let (pattern, file) = match parsed.positionals.as_slice() {
            [pattern] => (pattern.as_str(), None),
            [pattern, file] => (pattern.as_str(), Some(file.as_str())),
            _ => return Err(ShellError::usage(format!("usage: {}", self.usage()))),
        };

        let matcher = build_matcher(pattern)?;
        let input = ctx.input_lines("grep", file)?;

        let matched: Vec<(usize, &String)> = input
            .iter()
            .enumerate()
            .filter(|(_, line)| matcher.is_match(line) != invert)
            .collect();

        if count_only {
            return Ok(CommandOutput::text(vec![matched.len().to_string()]));
        }

        let mut lines = Vec::with_capacity(matched.len());
        let mut stdout = Vec::with_capacity(matched.len());
        for (index, line) in matched {
            let prefix = if numbered {
                format!("{}:", index + 1)
            } else {
                String::new()
            };
            let plain = format!("{}{}", prefix, line);
            let mut output = OutputLine::info(plain.clone());
            if !invert && !pattern.is_empty() {
                output = output.with_highlight(format!("{}{}", prefix, highlight(&matcher, line)));
            }
            lines.push(output);
            stdout.push(plain);
        }

        Ok(CommandOutput::lines(lines).with_stdout(stdout))
    }

    fn suggest(&self, partial: &str, tree: &FileTree, cwd: &VirtualPath) -> Vec<String> {
        tree.complete_path(cwd, partial)
    }
}
