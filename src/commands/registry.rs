use super::context::{CommandContext, CommandOutput};
use crate::errors::ShellResult;
use crate::vfs::{FileTree, VirtualPath};
use async_trait::async_trait;

/// Trait that all shell commands must implement
#[async_trait]
pub trait Command: Send + Sync {
    /// The command name (e.g., "ls", "cd", "grep")
    fn name(&self) -> &'static str;

    /// Help text / description for the command
    fn description(&self) -> &'static str;

    fn usage(&self) -> &'static str;

    /// Execute the command with the given arguments.
    /// args[0] is the command name itself
    ///
    /// State changes go through `ctx.emit`; the returned output is what the
    /// stage shows and, if it declares stdout, what it hands to the next
    /// stage.
    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>)
        -> ShellResult<CommandOutput>;

    /// Completion candidates for the argument being typed.
    fn suggest(&self, _partial: &str, _tree: &FileTree, _cwd: &VirtualPath) -> Vec<String> {
        Vec::new()
    }
}

/// Name → handler table. Built once, then shared immutably.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command, replacing any command with the same name.
    pub fn register<C: Command + 'static>(&mut self, cmd: C) {
        self.commands.retain(|c| c.name() != cmd.name());
        self.commands.push(Box::new(cmd));
    }

    /// Registry with every built-in - SINGLE POINT OF REGISTRATION
    pub fn with_builtins() -> Self {
        use super::builtins::*;

        let mut registry = Self::new();
        registry.register(LsCommand);
        registry.register(CdCommand);
        registry.register(CatCommand);
        registry.register(GrepCommand);
        registry.register(WcCommand);
        registry.register(ManCommand);
        registry.register(ScrapeCommand);
        registry.register(JobsCommand);
        registry.register(EchoCommand);
        registry.register(PwdCommand);
        registry.register(ClearCommand);
        registry.register(HistoryCommand);
        registry.register(HelpCommand);
        registry
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.commands.iter().any(|c| c.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// All command names (for completion and `help`)
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(|c| c.as_ref())
    }
}
