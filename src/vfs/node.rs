use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// Listing metadata. Anything left out of the content description is derived
/// from the node itself when rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub metadata: NodeMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opens_route: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<String>,
}

impl FileNode {
    pub fn directory(name: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            metadata: NodeMetadata::default(),
            children,
            external_link: None,
            opens_route: None,
            content: Vec::new(),
        }
    }

    pub fn file<S: Into<String>>(name: impl Into<String>, content: Vec<S>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            metadata: NodeMetadata::default(),
            children: Vec::new(),
            external_link: None,
            opens_route: None,
            content: content.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.external_link = Some(url.into());
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.opens_route = Some(route.into());
        self
    }

    pub fn with_modified(mut self, date: NaiveDate) -> Self {
        self.metadata.modified = Some(date);
        self
    }

    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.metadata.permissions = Some(permissions.into());
        self
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    pub fn child(&self, name: &str) -> Option<&FileNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut FileNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    pub fn permissions(&self) -> String {
        if let Some(permissions) = &self.metadata.permissions {
            return permissions.clone();
        }
        match self.kind {
            NodeKind::Directory => "drwxr-xr-x".to_string(),
            NodeKind::File if self.external_link.is_some() || self.opens_route.is_some() => {
                "lrwxr-xr-x".to_string()
            }
            NodeKind::File => "-rw-r--r--".to_string(),
        }
    }

    pub fn size(&self) -> u64 {
        if let Some(size) = self.metadata.size {
            return size;
        }
        match self.kind {
            NodeKind::Directory => 4096,
            NodeKind::File => self.content.iter().map(|line| line.len() as u64 + 1).sum(),
        }
    }

    pub fn modified(&self) -> NaiveDate {
        self.metadata.modified.unwrap_or_default()
    }

    /// Name as shown in a short listing: directories carry a trailing `/`.
    pub fn display_name(&self) -> String {
        if self.is_directory() {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_metadata_depends_on_kind() {
        let dir = FileNode::directory("projects", vec![]);
        assert_eq!(dir.permissions(), "drwxr-xr-x");
        assert_eq!(dir.size(), 4096);

        let file = FileNode::file("a.txt", vec!["abc", "de"]);
        assert_eq!(file.permissions(), "-rw-r--r--");
        assert_eq!(file.size(), 7);

        let link = FileNode::file("github", Vec::<String>::new()).with_link("https://github.com");
        assert!(link.permissions().starts_with('l'));
    }

    #[test]
    fn explicit_metadata_wins() {
        let file = FileNode::file("secret", vec!["x"]).with_permissions("-r--------");
        assert_eq!(file.permissions(), "-r--------");
    }

    #[test]
    fn deserializes_sparse_content() {
        let node: FileNode = serde_json::from_str(
            r#"{"name":"blog","kind":"directory","opens_route":"/blog",
                "metadata":{"modified":"2024-05-01"}}"#,
        )
        .unwrap();
        assert!(node.is_directory());
        assert_eq!(node.opens_route.as_deref(), Some("/blog"));
        assert_eq!(node.modified(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(node.children.is_empty());
    }
}
