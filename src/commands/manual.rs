use once_cell::sync::Lazy;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualPage {
    pub synopsis: &'static str,
    pub description: &'static str,
    pub options: &'static [(&'static str, &'static str)],
    pub examples: &'static [&'static str],
    pub see_also: &'static [&'static str],
}

impl ManualPage {
    pub fn render(&self, name: &str) -> Vec<String> {
        let mut lines = vec![
            format!("{}(1)", name.to_uppercase()),
            String::new(),
            "NAME".to_string(),
            format!("    {}", name),
            String::new(),
            "SYNOPSIS".to_string(),
            format!("    {}", self.synopsis),
            String::new(),
            "DESCRIPTION".to_string(),
            format!("    {}", self.description),
        ];
        if !self.options.is_empty() {
            lines.push(String::new());
            lines.push("OPTIONS".to_string());
            for (flag, text) in self.options {
                lines.push(format!("    {:<8}{}", flag, text));
            }
        }
        if !self.examples.is_empty() {
            lines.push(String::new());
            lines.push("EXAMPLES".to_string());
            lines.extend(self.examples.iter().map(|e| format!("    {}", e)));
        }
        if !self.see_also.is_empty() {
            lines.push(String::new());
            lines.push("SEE ALSO".to_string());
            lines.push(format!("    {}", self.see_also.join(", ")));
        }
        lines
    }
}

/// Static manual table, looked up by exact command name.
pub static MANUAL: Lazy<BTreeMap<&'static str, ManualPage>> = Lazy::new(|| {
    let mut pages = BTreeMap::new();
    pages.insert(
        "ls",
        ManualPage {
            synopsis: "ls [-a] [-l] [path]",
            description: "List the entries of a directory.",
            options: &[
                ("-a", "include hidden entries and the . and .. entries"),
                ("-l", "long format: permissions, size, date, name"),
            ],
            examples: &["ls", "ls -la projects"],
            see_also: &["cd", "cat"],
        },
    );
    pages.insert(
        "cd",
        ManualPage {
            synopsis: "cd [path]",
            description: "Change the working directory. Entries that point at a page or an external site open it instead.",
            options: &[],
            examples: &["cd projects", "cd ..", "cd ~"],
            see_also: &["ls", "pwd"],
        },
    );
    pages.insert(
        "cat",
        ManualPage {
            synopsis: "cat <file>...",
            description: "Print file contents. Reads piped input when no file is named.",
            options: &[],
            examples: &["cat about.txt", "cat projects/terminal.md | grep rust"],
            see_also: &["grep", "wc"],
        },
    );
    pages.insert(
        "grep",
        ManualPage {
            synopsis: "grep [-v] [-n] [-c] <pattern> [file]",
            description: "Print lines matching a case-insensitive pattern from a file or piped input.",
            options: &[
                ("-i", "ignore case (always on)"),
                ("-v", "select non-matching lines"),
                ("-n", "prefix each line with its line number"),
                ("-c", "print only the number of matching lines"),
            ],
            examples: &["grep rust projects/terminal.md", "cat about.txt | grep -n state"],
            see_also: &["cat", "wc"],
        },
    );
    pages.insert(
        "wc",
        ManualPage {
            synopsis: "wc [-l] [-w] [-c] [file]",
            description: "Count lines, words and characters, in that order.",
            options: &[
                ("-l", "print the line count"),
                ("-w", "print the word count"),
                ("-c", "print the character count"),
            ],
            examples: &["wc about.txt", "grep foo notes.txt | wc -l"],
            see_also: &["grep"],
        },
    );
    pages.insert(
        "man",
        ManualPage {
            synopsis: "man [command]",
            description: "Show the manual page of a command. Without a name, open the manual index.",
            options: &[],
            examples: &["man ls", "man"],
            see_also: &["help"],
        },
    );
    pages.insert(
        "scrape",
        ManualPage {
            synopsis: "scrape <url>...",
            description: "Submit a background scrape job. Progress updates in place; results land in /results.",
            options: &[],
            examples: &["scrape https://example.com", "scrape https://a.dev https://b.dev"],
            see_also: &["jobs"],
        },
    );
    pages.insert(
        "jobs",
        ManualPage {
            synopsis: "jobs [list | status <id> | results <id> | monitor]",
            description: "Inspect background jobs.",
            options: &[],
            examples: &["jobs", "jobs status job-42", "jobs monitor"],
            see_also: &["scrape"],
        },
    );
    pages.insert(
        "echo",
        ManualPage {
            synopsis: "echo [text]...",
            description: "Print the arguments separated by spaces.",
            options: &[],
            examples: &["echo hello | wc -c"],
            see_also: &[],
        },
    );
    pages.insert(
        "pwd",
        ManualPage {
            synopsis: "pwd",
            description: "Print the working directory.",
            options: &[],
            examples: &["pwd"],
            see_also: &["cd"],
        },
    );
    pages.insert(
        "clear",
        ManualPage {
            synopsis: "clear",
            description: "Clear the transcript. History is derived from the transcript and is cleared with it.",
            options: &[],
            examples: &["clear"],
            see_also: &["history"],
        },
    );
    pages.insert(
        "history",
        ManualPage {
            synopsis: "history",
            description: "List submitted commands, oldest first. Ctrl-R searches them.",
            options: &[],
            examples: &["history | grep cd"],
            see_also: &["clear"],
        },
    );
    pages.insert(
        "help",
        ManualPage {
            synopsis: "help",
            description: "List available commands.",
            options: &[],
            examples: &["help"],
            see_also: &["man"],
        },
    );
    pages
});

pub fn lookup(name: &str) -> Option<&'static ManualPage> {
    MANUAL.get(name)
}

pub fn page_names() -> Vec<&'static str> {
    MANUAL.keys().copied().collect()
}
