use std::fmt;

/// Where a command asked the host to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// A route of the hosting site, handled by its router.
    Route(String),
    /// An external URL.
    External(String),
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationTarget::Route(route) => write!(f, "{}", route),
            NavigationTarget::External(url) => write!(f, "{}", url),
        }
    }
}

/// Navigation collaborator. Called at most once per command, after the
/// configured delay so the preceding transcript lines are visible first.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &NavigationTarget);
}

/// Navigator that only logs the request.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, target: &NavigationTarget) {
        tracing::info!(target = %target, "navigation requested");
    }
}
