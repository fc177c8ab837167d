use crate::commands::{Command, CommandContext, CommandOutput};
use crate::errors::ShellResult;
use async_trait::async_trait;

pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn description(&self) -> &'static str {
        "Echo arguments"
    }

    fn usage(&self) -> &'static str {
        "echo [text]..."
    }

    async fn execute(&self, args: &[String], _ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        // args[0] is "echo", actual args start at [1]
        let words = args.get(1..).unwrap_or_default();
        Ok(CommandOutput::text(vec![words.join(" ")]))
    }
}
