use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::{ShellError, ShellResult};
use crate::session::OutputLine;
use crate::vfs::{FileNode, FileTree, VirtualPath};
use async_trait::async_trait;

pub struct LsCommand;

/// `permissions size date name`, fixed width.
fn long_line(name: &str, node: &FileNode) -> String {
    let mut line = format!(
        "{:<10} {:>6} {} {}",
        node.permissions(),
        node.size(),
        node.modified().format("%b %d %Y"),
        name
    );
    if let Some(target) = node.external_link.as_ref().or(node.opens_route.as_ref()) {
        line.push_str(" -> ");
        line.push_str(target);
    }
    line
}

#[async_trait]
impl Command for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn description(&self) -> &'static str {
        "List directory contents"
    }

    fn usage(&self) -> &'static str {
        "ls [-a] [-l] [path]"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        let parsed = ParsedArgs::parse(args, &["a", "l", "all"])?;
        let show_all = parsed.has_any(&["a", "all"]);
        let long = parsed.has("l");
        if parsed.positionals.len() > 1 {
            return Err(ShellError::usage(format!("usage: {}", self.usage())));
        }

        let target = parsed.positional(0).unwrap_or(".");
        let (path, node) = ctx.tree().resolve(ctx.cwd(), target).ok_or_else(|| {
            ShellError::not_found(format!(
                "ls: cannot access '{}': No such file or directory",
                target
            ))
        })?;

        if !node.is_directory() {
            let line = if long {
                long_line(&node.name, node)
            } else {
                node.name.clone()
            };
            return Ok(CommandOutput::info(line).with_stdout(vec![node.name.clone()]));
        }

        let mut children: Vec<&FileNode> = node
            .children
            .iter()
            .filter(|child| show_all || !child.is_hidden())
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));

        let mut entries: Vec<(String, String, &FileNode)> = Vec::new();
        if show_all {
            let parent = path
                .parent()
                .and_then(|p| ctx.tree().node(&p))
                .unwrap_or(node);
            entries.push((".".to_string(), ".".to_string(), node));
            entries.push(("..".to_string(), "..".to_string(), parent));
        }
        entries.extend(
            children
                .iter()
                .map(|child| (child.name.clone(), child.display_name(), *child)),
        );

        let stdout: Vec<String> = entries.iter().map(|(name, _, _)| name.clone()).collect();

        if long {
            let mut lines = vec![OutputLine::info(format!("total {}", children.len()))];
            lines.extend(
                entries
                    .iter()
                    .map(|(name, _, entry)| OutputLine::info(long_line(name, entry))),
            );
            return Ok(CommandOutput::lines(lines).with_stdout(stdout));
        }

        if entries.is_empty() {
            return Ok(CommandOutput::empty().with_stdout(stdout));
        }
        let joined = entries
            .iter()
            .map(|(_, display, _)| display.as_str())
            .collect::<Vec<_>>()
            .join("  ");
        Ok(CommandOutput::info(joined).with_stdout(stdout))
    }

    fn suggest(&self, partial: &str, tree: &FileTree, cwd: &VirtualPath) -> Vec<String> {
        tree.complete_path(cwd, partial)
    }
}
