mod common;

use async_trait::async_trait;
use common::TerminalBuilder;
use portfolio_shell::commands::{Command, CommandContext, CommandOutput};
use portfolio_shell::errors::ShellResult;
use portfolio_shell::session::EntryKind;
use portfolio_shell::vfs::{FileNode, FileTree};
use portfolio_shell::KeyInput;

struct Stub(&'static str);

#[async_trait]
impl Command for Stub {
    fn name(&self) -> &'static str {
        self.0
    }

    fn description(&self) -> &'static str {
        "stub"
    }

    fn usage(&self) -> &'static str {
        self.0
    }

    async fn execute(
        &self,
        _args: &[String],
        _ctx: &mut CommandContext<'_>,
    ) -> ShellResult<CommandOutput> {
        Ok(CommandOutput::info(format!("{} ran", self.0)))
    }
}

#[tokio::test(start_paused = true)]
async fn long_listing_of_an_empty_directory() {
    let tree = FileTree::new(FileNode::directory(
        "",
        vec![
            FileNode::directory("empty", vec![]),
            FileNode::directory("results", vec![]),
        ],
    ))
    .unwrap();
    let mut terminal = TerminalBuilder::new().tree(tree).open();

    terminal.run_line("cd empty").await;
    terminal.run_line("ls -la").await;

    let texts = terminal.transcript().texts();
    let listing = &texts[texts.len() - 3..];
    assert_eq!(listing[0], "total 0");
    assert_eq!(listing[1], "drwxr-xr-x   4096 Jan 01 1970 .");
    assert_eq!(listing[2], "drwxr-xr-x   4096 Jan 01 1970 ..");
}

#[tokio::test(start_paused = true)]
async fn grep_into_wc_counts_matches() {
    let lines: Vec<String> = (0..10)
        .map(|i| {
            if i % 3 == 0 && i < 9 {
                format!("foo line {}", i)
            } else {
                format!("bar line {}", i)
            }
        })
        .collect();
    let tree = FileTree::new(FileNode::directory(
        "",
        vec![
            FileNode::file("file.txt", lines),
            FileNode::directory("results", vec![]),
        ],
    ))
    .unwrap();
    let mut terminal = TerminalBuilder::new().tree(tree).open();

    terminal.run_line("grep foo file.txt | wc -l").await;

    assert_eq!(
        terminal.transcript().texts(),
        vec!["grep foo file.txt | wc -l", "3"]
    );
}

#[tokio::test(start_paused = true)]
async fn tab_cycles_between_two_candidates() {
    let mut builder = TerminalBuilder::new();
    builder.registry.register(Stub("change-directory"));
    builder.registry.register(Stub("change-permissions"));
    let mut terminal = builder.open();

    terminal.handle_key(KeyInput::Char('c')).await;
    terminal.handle_key(KeyInput::Char('h')).await;
    terminal.handle_key(KeyInput::Tab).await;

    assert_eq!(terminal.state().input, "change-directory");
    let listing = terminal.transcript().last().unwrap();
    assert_eq!(listing.kind, EntryKind::Info);
    assert!(listing.text.contains("change-directory"));
    assert!(listing.text.contains("change-permissions"));
    let entries = terminal.transcript().len();

    terminal.handle_key(KeyInput::Tab).await;
    assert_eq!(terminal.state().input, "change-permissions");
    terminal.handle_key(KeyInput::Tab).await;
    assert_eq!(terminal.state().input, "change-directory");
    assert_eq!(terminal.transcript().len(), entries);
}

#[tokio::test(start_paused = true)]
async fn unknown_stage_halts_the_whole_line() {
    let mut terminal = TerminalBuilder::new().open();
    terminal.run_line("cd projects").await;

    terminal.run_line("cd .. | nosuch | wc").await;

    assert_eq!(terminal.state().working_directory.to_string(), "/projects");
    let last = terminal.transcript().last().unwrap();
    assert_eq!(last.kind, EntryKind::Error);
    assert_eq!(last.text, "nosuch: command not found");
}

#[tokio::test(start_paused = true)]
async fn usage_errors_keep_the_session_going() {
    let mut terminal = TerminalBuilder::new().open();

    terminal.run_line("cat 'unterminated").await;
    terminal.run_line("pwd").await;

    let texts = terminal.transcript().texts();
    assert_eq!(texts[1], "Invalid quoting in command");
    assert_eq!(texts.last(), Some(&"/"));
    assert!(terminal.state().prompt_visible);
}

#[tokio::test(start_paused = true)]
async fn links_navigate_after_the_delay_without_moving() {
    let builder = TerminalBuilder::new();
    let navigator = builder.navigator.clone();
    let mut terminal = builder.open();

    terminal.run_line("cd blog").await;
    assert_eq!(
        terminal.transcript().last().unwrap().text,
        "Navigating to /blog ..."
    );
    assert!(terminal.state().working_directory.is_root());

    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    let seen = navigator.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].to_string(), "/blog");
}
