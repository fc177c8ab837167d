use super::{navigation_for, navigation_notice};
use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::{ShellError, ShellResult};
use crate::session::Action;
use crate::vfs::{FileTree, VirtualPath};
use async_trait::async_trait;

pub struct CdCommand;

#[async_trait]
impl Command for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn description(&self) -> &'static str {
        "Change current working directory"
    }

    fn usage(&self) -> &'static str {
        "cd [path]"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        let parsed = ParsedArgs::parse(args, &[])?;
        if parsed.positionals.len() > 1 {
            return Err(ShellError::usage("cd: too many arguments"));
        }

        let target = match parsed.positional(0) {
            None | Some("~") => {
                ctx.emit(Action::SetWorkingDirectory(VirtualPath::root()));
                return Ok(CommandOutput::empty());
            }
            Some(target) => target,
        };

        if target == ".." && ctx.cwd().is_root() {
            return Ok(CommandOutput::info("Already at the root directory."));
        }

        let (path, node) = ctx.resolve("cd", target)?;

        if let Some(destination) = navigation_for(node) {
            let notice = navigation_notice(&destination);
            ctx.navigate(destination);
            return Ok(CommandOutput::info(notice));
        }

        if !node.is_directory() {
            return Err(ShellError::usage(format!("cd: {}: Not a directory", target)));
        }

        ctx.emit(Action::SetWorkingDirectory(path));
        Ok(CommandOutput::empty())
    }

    fn suggest(&self, partial: &str, tree: &FileTree, cwd: &VirtualPath) -> Vec<String> {
        tree.complete_path(cwd, partial)
            .into_iter()
            .filter(|name| name.ends_with('/'))
            .collect()
    }
}
