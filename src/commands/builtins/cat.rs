use super::{navigation_for, navigation_notice};
use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::{ShellError, ShellResult};
use crate::session::{OutputLine, RevealMode};
use crate::vfs::{FileTree, VirtualPath};
use async_trait::async_trait;

pub struct CatCommand;

#[async_trait]
impl Command for CatCommand {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn description(&self) -> &'static str {
        "Print file contents"
    }

    fn usage(&self) -> &'static str {
        "cat <file>..."
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        let parsed = ParsedArgs::parse(args, &[])?;
        if parsed.positionals.is_empty() {
            return Ok(CommandOutput::text(ctx.input_lines("cat", None)?));
        }

        let mut notices = Vec::new();
        let mut text = Vec::new();
        for arg in &parsed.positionals {
            let (_, node) = ctx.resolve("cat", arg)?;
            if let Some(destination) = navigation_for(node) {
                notices.push(OutputLine::info(navigation_notice(&destination)));
                ctx.navigate(destination);
                continue;
            }
            if node.is_directory() {
                return Err(ShellError::usage(format!("cat: {}: Is a directory", arg)));
            }
            text.extend(node.content.iter().cloned());
        }

        let mut lines = notices;
        lines.extend(text.iter().cloned().map(OutputLine::info));

        // Typed out only when this is the whole command line.
        let standalone = ctx.stage.is_first() && ctx.stage.is_last() && ctx.stdin.is_none();
        let reveal = if standalone && !text.is_empty() {
            RevealMode::Staged
        } else {
            RevealMode::Immediate
        };

        Ok(CommandOutput {
            lines,
            stdout: Some(text),
            reveal,
        })
    }

    fn suggest(&self, partial: &str, tree: &FileTree, cwd: &VirtualPath) -> Vec<String> {
        tree.complete_path(cwd, partial)
    }
}
