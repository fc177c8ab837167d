//! Read-mostly virtual file tree the shell navigates.
//!
//! The tree is loaded once from static content. The only mutation is
//! appending a new file under an existing directory, which is how job
//! results become visible to `ls` and `cat`.

mod content;
mod node;
mod path;

pub use content::default_tree;
pub use node::{FileNode, NodeKind, NodeMetadata};
pub use path::VirtualPath;

use crate::errors::{ShellError, ShellResult};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTree {
    root: FileNode,
}

impl FileTree {
    /// Build a tree, checking that the root is a directory and that sibling
    /// names are unique everywhere.
    pub fn new(root: FileNode) -> ShellResult<Self> {
        if !root.is_directory() {
            return Err(ShellError::usage("content root must be a directory"));
        }
        validate_siblings(&root, &VirtualPath::root())?;
        Ok(Self { root })
    }

    pub fn from_json(raw: &str) -> ShellResult<Self> {
        let root: FileNode = serde_json::from_str(raw)?;
        Self::new(root)
    }

    pub fn root(&self) -> &FileNode {
        &self.root
    }

    pub fn node(&self, path: &VirtualPath) -> Option<&FileNode> {
        let mut current = &self.root;
        for segment in path.segments() {
            current = current.child(segment)?;
        }
        Some(current)
    }

    /// Resolve user input relative to `cwd`.
    pub fn resolve(&self, cwd: &VirtualPath, input: &str) -> Option<(VirtualPath, &FileNode)> {
        let path = cwd.join(input);
        let node = self.node(&path)?;
        Some((path, node))
    }

    pub fn is_directory(&self, path: &VirtualPath) -> bool {
        self.node(path).is_some_and(FileNode::is_directory)
    }

    /// Append `node` under the directory at `dir` and return its path.
    pub fn append_file(&mut self, dir: &VirtualPath, node: FileNode) -> ShellResult<VirtualPath> {
        let mut current = &mut self.root;
        for segment in dir.segments() {
            current = current
                .child_mut(segment)
                .ok_or_else(|| ShellError::not_found(format!("{}: No such directory", dir)))?;
        }
        if !current.is_directory() {
            return Err(ShellError::usage(format!("{}: Not a directory", dir)));
        }
        if current.child(&node.name).is_some() {
            return Err(ShellError::usage(format!(
                "{}: already exists",
                dir.child(&node.name)
            )));
        }
        let path = dir.child(&node.name);
        current.children.push(node);
        Ok(path)
    }

    /// Names below the directory part of `partial` that start with its last
    /// segment. Directory names are suffixed with `/` so completion can keep
    /// descending.
    pub fn complete_path(&self, cwd: &VirtualPath, partial: &str) -> Vec<String> {
        let (dir_part, name_part) = match partial.rfind('/') {
            Some(idx) => (&partial[..=idx], &partial[idx + 1..]),
            None => ("", partial),
        };
        let dir = if dir_part.is_empty() {
            cwd.clone()
        } else {
            cwd.join(dir_part)
        };
        let Some(node) = self.node(&dir).filter(|n| n.is_directory()) else {
            return Vec::new();
        };

        let show_hidden = name_part.starts_with('.');
        let mut names: Vec<String> = node
            .children
            .iter()
            .filter(|child| child.name.starts_with(name_part))
            .filter(|child| show_hidden || !child.is_hidden())
            .map(|child| format!("{}{}", dir_part, child.display_name()))
            .collect();
        names.sort();
        names
    }
}

fn validate_siblings(node: &FileNode, path: &VirtualPath) -> ShellResult<()> {
    let mut seen = HashSet::new();
    for child in &node.children {
        if child.name.is_empty() || child.name.contains('/') || child.name == "." || child.name == ".." {
            return Err(ShellError::usage(format!(
                "invalid node name '{}' under {}",
                child.name, path
            )));
        }
        if !seen.insert(child.name.as_str()) {
            return Err(ShellError::usage(format!(
                "duplicate name '{}' under {}",
                child.name, path
            )));
        }
        validate_siblings(child, &path.child(&child.name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> FileTree {
        FileTree::new(FileNode::directory(
            "",
            vec![
                FileNode::file("about.txt", vec!["hello"]),
                FileNode::file(".profile", vec!["secret"]),
                FileNode::directory(
                    "projects",
                    vec![
                        FileNode::file("shell.md", vec!["# shell"]),
                        FileNode::file("site.md", vec!["# site"]),
                    ],
                ),
                FileNode::directory("results", vec![]),
            ],
        ))
        .unwrap()
    }

    #[test]
    fn resolves_relative_and_absolute_paths() {
        let tree = tree();
        let cwd = VirtualPath::root().join("projects");
        let (path, node) = tree.resolve(&cwd, "shell.md").unwrap();
        assert_eq!(path.to_string(), "/projects/shell.md");
        assert_eq!(node.content, vec!["# shell"]);
        assert!(tree.resolve(&cwd, "/about.txt").is_some());
        assert!(tree.resolve(&cwd, "missing").is_none());
        assert!(tree.resolve(&cwd, "..").unwrap().1.is_directory());
    }

    #[test]
    fn rejects_duplicate_siblings() {
        let result = FileTree::new(FileNode::directory(
            "",
            vec![FileNode::file("a", vec!["1"]), FileNode::file("a", vec!["2"])],
        ));
        assert!(result.is_err());
    }

    #[test]
    fn append_file_only_under_existing_directories() {
        let mut tree = tree();
        let results = VirtualPath::root().join("results");
        let path = tree
            .append_file(&results, FileNode::file("scrape-1.json", vec!["[]"]))
            .unwrap();
        assert_eq!(path.to_string(), "/results/scrape-1.json");
        assert!(tree.node(&path).is_some());

        assert!(tree
            .append_file(&results, FileNode::file("scrape-1.json", vec!["[]"]))
            .is_err());
        assert!(tree
            .append_file(&VirtualPath::root().join("nope"), FileNode::file("x", vec!["y"]))
            .is_err());
        assert!(tree
            .append_file(&VirtualPath::root().join("about.txt"), FileNode::file("x", vec!["y"]))
            .is_err());
    }

    #[test]
    fn completes_names_in_nested_directories() {
        let tree = tree();
        let root = VirtualPath::root();
        assert_eq!(tree.complete_path(&root, "pro"), vec!["projects/"]);
        assert_eq!(
            tree.complete_path(&root, "projects/s"),
            vec!["projects/shell.md", "projects/site.md"]
        );
        assert_eq!(tree.complete_path(&root, ".p"), vec![".profile"]);
        assert!(!tree.complete_path(&root, "").contains(&".profile".to_string()));
    }
}
