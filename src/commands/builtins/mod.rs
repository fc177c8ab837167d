mod cat;
mod cd;
mod clear;
mod echo;
mod grep;
mod help;
mod history;
mod jobs;
mod ls;
mod man;
mod pwd;
mod scrape;
mod wc;

pub use cat::CatCommand;
pub use cd::CdCommand;
pub use clear::ClearCommand;
pub use echo::EchoCommand;
pub use grep::GrepCommand;
pub use help::HelpCommand;
pub use history::HistoryCommand;
pub use jobs::JobsCommand;
pub use ls::LsCommand;
pub use man::ManCommand;
pub use pwd::PwdCommand;
pub use scrape::ScrapeCommand;
pub use wc::WcCommand;

use crate::navigation::NavigationTarget;
use crate::vfs::FileNode;

/// Link or route a node opens instead of being entered or printed.
pub(crate) fn navigation_for(node: &FileNode) -> Option<NavigationTarget> {
    if let Some(url) = &node.external_link {
        return Some(NavigationTarget::External(url.clone()));
    }
    node.opens_route
        .as_ref()
        .map(|route| NavigationTarget::Route(route.clone()))
}

pub(crate) fn navigation_notice(target: &NavigationTarget) -> String {
    match target {
        NavigationTarget::External(url) => format!("Opening {} ...", url),
        NavigationTarget::Route(route) => format!("Navigating to {} ...", route),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::commands::{
        Command, CommandContext, CommandOutput, CommandRegistry, CommandServices, ExecutionEnv,
        StagePosition,
    };
    use crate::errors::ShellResult;
    use crate::jobs::{Job, JobId, SimulatedJobService};
    use crate::navigation::NavigationTarget;
    use crate::session::{Action, Transcript};
    use crate::vfs::{default_tree, FileTree, VirtualPath};
    use indexmap::IndexMap;
    use std::sync::Arc;

    /// Owned pieces of an [`ExecutionEnv`] for handler unit tests.
    pub struct Fixture {
        pub registry: CommandRegistry,
        pub transcript: Transcript,
        pub tree: FileTree,
        pub cwd: VirtualPath,
        pub jobs: IndexMap<JobId, Job>,
        pub services: CommandServices,
    }

    pub struct Run {
        pub result: ShellResult<CommandOutput>,
        pub actions: Vec<Action>,
        pub navigation: Option<NavigationTarget>,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                registry: CommandRegistry::with_builtins(),
                transcript: Transcript::new(),
                tree: default_tree(),
                cwd: VirtualPath::root(),
                jobs: IndexMap::new(),
                services: CommandServices {
                    jobs: Arc::new(SimulatedJobService::default()),
                },
            }
        }

        pub fn env(&self) -> ExecutionEnv<'_> {
            ExecutionEnv {
                registry: &self.registry,
                transcript: &self.transcript,
                tree: &self.tree,
                cwd: &self.cwd,
                jobs: &self.jobs,
                services: &self.services,
            }
        }

        pub async fn run(
            &self,
            command: &dyn Command,
            line: &[&str],
            stdin: Option<Vec<&str>>,
            stage: StagePosition,
        ) -> Run {
            let env = self.env();
            let args: Vec<String> = line.iter().map(|s| s.to_string()).collect();
            let stdin = stdin.map(|lines| lines.into_iter().map(String::from).collect());
            let mut ctx = CommandContext::new(&env, stdin, stage);
            let result = command.execute(&args, &mut ctx).await;
            let (actions, navigation) = ctx.into_parts();
            Run {
                result,
                actions,
                navigation,
            }
        }

        pub async fn run_single(&self, command: &dyn Command, line: &[&str]) -> Run {
            self.run(command, line, None, StagePosition::single()).await
        }
    }

    pub fn texts(output: &CommandOutput) -> Vec<&str> {
        output.lines.iter().map(|l| l.text.as_str()).collect()
    }
}
