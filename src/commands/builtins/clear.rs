use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::ShellResult;
use crate::session::Action;
use async_trait::async_trait;

pub struct ClearCommand;

#[async_trait]
impl Command for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn description(&self) -> &'static str {
        "Clear the terminal"
    }

    fn usage(&self) -> &'static str {
        "clear"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        ParsedArgs::parse(args, &[])?;
        ctx.emit(Action::ClearTranscript);
        Ok(CommandOutput::empty())
    }
}
