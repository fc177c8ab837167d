use super::{FileNode, FileTree};
use chrono::NaiveDate;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Content used when no content file is supplied.
pub fn default_tree() -> FileTree {
    let root = FileNode::directory(
        "",
        vec![
            FileNode::file(
                "about.txt",
                vec![
                    "Hi, I build developer tools and small, sharp systems.",
                    "I like parsers, terminals and anything with a state machine in it.",
                    "Type `ls` to look around or `man help` for a tour.",
                ],
            )
            .with_modified(date(2024, 3, 14)),
            FileNode::file(".plan", vec!["ship the terminal", "write more"])
                .with_modified(date(2024, 1, 2)),
            FileNode::directory(
                "projects",
                vec![
                    FileNode::file(
                        "terminal.md",
                        vec![
                            "# Terminal",
                            "A virtual shell with pipes, history search and background jobs.",
                            "Stack: Rust, tokio, serde.",
                        ],
                    )
                    .with_modified(date(2024, 6, 1)),
                    FileNode::file(
                        "scraper.md",
                        vec![
                            "# Scraper",
                            "Distributed page scraper with progress reporting.",
                            "Try: scrape https://example.com",
                        ],
                    )
                    .with_modified(date(2024, 4, 20)),
                    FileNode::directory(
                        "case studies",
                        vec![FileNode::file(
                            "latency.md",
                            vec!["# Cutting p99 latency in half", "Profiling first, guessing never."],
                        )
                        .with_modified(date(2023, 11, 8))],
                    )
                    .with_modified(date(2023, 11, 8)),
                ],
            )
            .with_modified(date(2024, 6, 1)),
            FileNode::directory("blog", vec![])
                .with_route("/blog")
                .with_modified(date(2024, 5, 30)),
            FileNode::file("resume.pdf", Vec::<String>::new())
                .with_route("/resume")
                .with_modified(date(2024, 2, 11)),
            FileNode::directory(
                "contact",
                vec![
                    FileNode::file("github", Vec::<String>::new())
                        .with_link("https://github.com/")
                        .with_modified(date(2024, 1, 5)),
                    FileNode::file("linkedin", Vec::<String>::new())
                        .with_link("https://www.linkedin.com/")
                        .with_modified(date(2024, 1, 5)),
                    FileNode::file("email.txt", vec!["hello@example.com"])
                        .with_modified(date(2024, 1, 5)),
                ],
            )
            .with_modified(date(2024, 1, 5)),
            FileNode::directory("results", vec![]).with_modified(date(2024, 1, 1)),
        ],
    );

    FileTree { root }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::VirtualPath;

    #[test]
    fn default_tree_has_a_results_directory() {
        let tree = default_tree();
        assert!(FileTree::new(tree.root().clone()).is_ok());
        assert!(tree.is_directory(&VirtualPath::root().join("results")));
        assert!(tree.is_directory(&VirtualPath::root().join("projects/case studies")));
    }
}
