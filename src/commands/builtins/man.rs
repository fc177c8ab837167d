use crate::commands::manual;
use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::{ShellError, ShellResult};
use crate::session::{Action, OutputLine, Overlay};
use crate::vfs::{FileTree, VirtualPath};
use async_trait::async_trait;

pub struct ManCommand;

#[async_trait]
impl Command for ManCommand {
    fn name(&self) -> &'static str {
        "man"
    }

    fn description(&self) -> &'static str {
        "Show the manual page of a command"
    }

    fn usage(&self) -> &'static str {
        "man [command]"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        let parsed = ParsedArgs::parse(args, &[])?;
        let name = match parsed.positionals.as_slice() {
            [] => {
                ctx.emit(Action::OpenOverlay(Overlay::Manual(None)));
                return Ok(CommandOutput::info("Opening the manual index ..."));
            }
            [name] => name.as_str(),
            _ => return Err(ShellError::usage(format!("usage: {}", self.usage()))),
        };

        let page = manual::lookup(name).ok_or_else(|| {
            ShellError::not_found(format!(
                "man: no manual entry for '{}'. Available: {}",
                name,
                manual::page_names().join(", ")
            ))
        })?;

        let lines = page.render(name).into_iter().map(OutputLine::info).collect();
        Ok(CommandOutput::lines(lines).staged())
    }

    fn suggest(&self, partial: &str, _tree: &FileTree, _cwd: &VirtualPath) -> Vec<String> {
        manual::page_names()
            .into_iter()
            .filter(|name| name.starts_with(partial))
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::builtins::testing::{texts, Fixture};
    use crate::errors::ErrorKind;
    use crate::session::RevealMode;

    #[tokio::test]
    async fn renders_a_known_page_staged() {
        let fixture = Fixture::new();
        let run = fixture.run_single(&ManCommand, &["man", "ls"]).await;
        let output = run.result.unwrap();
        assert_eq!(output.reveal, RevealMode::Staged);
        assert_eq!(texts(&output)[0], "LS(1)");
        assert!(output.stdout.is_none());
    }

    #[tokio::test]
    async fn unknown_page_lists_valid_names() {
        let fixture = Fixture::new();
        let run = fixture.run_single(&ManCommand, &["man", "rm"]).await;
        let err = run.result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let message = err.to_string();
        assert!(message.starts_with("man: no manual entry for 'rm'"));
        assert!(message.contains("grep"));
        assert!(message.contains("scrape"));
    }

    #[tokio::test]
    async fn no_argument_opens_the_index() {
        let fixture = Fixture::new();
        let run = fixture.run_single(&ManCommand, &["man"]).await;
        assert!(run.result.is_ok());
        assert_eq!(run.actions, vec![Action::OpenOverlay(Overlay::Manual(None))]);
    }

    #[test]
    fn suggests_page_names() {
        let fixture = Fixture::new();
        assert_eq!(ManCommand.suggest("gr", &fixture.tree, &fixture.cwd), vec!["grep"]);
    }
}
