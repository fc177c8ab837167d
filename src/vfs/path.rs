use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute, normalized location in the virtual tree.
///
/// Stored as a list of segment names below the root; `/` is the empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VirtualPath {
    segments: Vec<String>,
}

impl VirtualPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<VirtualPath> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    pub fn child(&self, name: &str) -> VirtualPath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Resolve `input` against `self` lexically.
    ///
    /// Absolute paths start at the root, `~` is an alias for the root, `.`
    /// is skipped and `..` stops at the root.
    pub fn join(&self, input: &str) -> VirtualPath {
        let (mut segments, rest) = if let Some(rest) = input.strip_prefix('~') {
            (Vec::new(), rest)
        } else if input.starts_with('/') {
            (Vec::new(), input)
        } else {
            (self.segments.clone(), input)
        };

        for part in rest.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name.to_string()),
            }
        }
        Self { segments }
    }

    pub fn parse(input: &str) -> Result<Self, String> {
        if !input.starts_with('/') {
            return Err(format!("path '{}' is not absolute", input));
        }
        Ok(Self::root().join(input))
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for VirtualPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VirtualPath> for String {
    fn from(value: VirtualPath) -> Self {
        value.to_string()
    }
}
