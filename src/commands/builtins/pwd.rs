use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::ShellResult;
use async_trait::async_trait;

pub struct PwdCommand;

#[async_trait]
impl Command for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn description(&self) -> &'static str {
        "Print current working directory"
    }

    fn usage(&self) -> &'static str {
        "pwd"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        ParsedArgs::parse(args, &[])?;
        Ok(CommandOutput::text(vec![ctx.cwd().to_string()]))
    }
}
