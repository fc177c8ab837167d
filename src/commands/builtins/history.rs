use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::{ShellError, ShellResult};
use crate::history::derive_history;
use crate::session::OutputLine;
use async_trait::async_trait;

pub struct HistoryCommand;

#[async_trait]
impl Command for HistoryCommand {
    fn name(&self) -> &'static str {
        "history"
    }

    fn description(&self) -> &'static str {
        "Display command history"
    }

    fn usage(&self) -> &'static str {
        "history [count]"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        let parsed = ParsedArgs::parse(args, &[])?;
        let history = derive_history(ctx.transcript());

        // `history N` shows only the last N entries, numbered as in the full list
        let skip = match parsed.positional(0) {
            Some(count) => {
                let count: usize = count.parse().map_err(|_| {
                    ShellError::usage(format!("history: {}: numeric argument required", count))
                })?;
                history.len().saturating_sub(count)
            }
            None => 0,
        };

        let lines = history
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(index, command)| OutputLine::info(format!("{:>5}  {}", index + 1, command)))
            .collect();
        Ok(CommandOutput::lines(lines).with_stdout(history[skip..].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::builtins::testing::{texts, Fixture};
    use crate::session::RevealMode;

    fn fixture() -> Fixture {
        let mut fixture = Fixture::new();
        for line in ["ls", "cd projects", "history"] {
            fixture
                .transcript
                .push(OutputLine::command(line), RevealMode::Immediate);
            fixture
                .transcript
                .push(OutputLine::info("output"), RevealMode::Immediate);
        }
        fixture
    }

    #[tokio::test]
    async fn numbers_commands_oldest_first() {
        let run = fixture().run_single(&HistoryCommand, &["history"]).await;
        let output = run.result.unwrap();
        assert_eq!(
            texts(&output),
            vec!["    1  ls", "    2  cd projects", "    3  history"]
        );
        assert_eq!(output.stdout.unwrap()[1], "cd projects");
    }

    #[tokio::test]
    async fn count_keeps_original_numbers() {
        let run = fixture().run_single(&HistoryCommand, &["history", "1"]).await;
        assert_eq!(texts(&run.result.unwrap()), vec!["    3  history"]);
    }

    #[tokio::test]
    async fn count_must_be_numeric() {
        let run = fixture().run_single(&HistoryCommand, &["history", "x"]).await;
        assert!(run.result.is_err());
    }
}
