pub mod args;
pub mod builtins;
pub mod context;
pub mod manual;
pub mod registry;

pub use args::ParsedArgs;
pub use context::{CommandContext, CommandOutput, CommandServices, ExecutionEnv, StagePosition};
pub use registry::{Command, CommandRegistry};
