use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::ShellResult;
use crate::session::OutputLine;
use async_trait::async_trait;

pub struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "List available commands"
    }

    fn usage(&self) -> &'static str {
        "help"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        ParsedArgs::parse(args, &[])?;

        let mut lines = vec![OutputLine::info("Available commands:")];
        let mut names = Vec::new();
        for command in ctx.registry().commands() {
            lines.push(OutputLine::info(format!(
                "  {:<10}{}",
                command.name(),
                command.description()
            )));
            names.push(command.name().to_string());
        }
        lines.push(OutputLine::info(
            "Type `man <command>` for details. Commands can be piped with `|`.",
        ));
        Ok(CommandOutput::lines(lines).with_stdout(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::builtins::testing::{texts, Fixture};

    #[tokio::test]
    async fn lists_every_registered_command() {
        let fixture = Fixture::new();
        let run = fixture.run_single(&HelpCommand, &["help"]).await;
        let output = run.result.unwrap();
        let lines = texts(&output);
        assert_eq!(lines[0], "Available commands:");
        assert!(lines.iter().any(|l| l.starts_with("  grep")));
        assert_eq!(
            output.stdout.unwrap().len(),
            fixture.registry.names().len()
        );
    }
}
