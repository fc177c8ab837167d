//! Runtime configuration, read from TOML. Every field has a default, so an
//! empty or missing file is a valid configuration.

use crate::errors::{ShellError, ShellResult};
use crate::jobs::supervisor::GracePeriods;
use crate::typewriter::RevealTiming;
use crate::vfs::VirtualPath;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PORTFOLIO_SHELL_CONFIG: &str = "PORTFOLIO_SHELL_CONFIG";

const DEFAULT_POLL_INTERVAL_MS: u64 = 1500;
const DEFAULT_COMPLETED_GRACE_MS: u64 = 10_000;
const DEFAULT_FAILED_GRACE_MS: u64 = 5_000;
const DEFAULT_RESULTS_DIR: &str = "/results";
const DEFAULT_CHAR_DELAY_MS: u64 = 4;
const DEFAULT_MIN_LINE_DELAY_MS: u64 = 15;
const DEFAULT_MAX_LINE_DELAY_MS: u64 = 250;
const DEFAULT_NAVIGATION_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub jobs: JobsConfigToml,
    #[serde(default)]
    pub typewriter: TypewriterConfigToml,
    #[serde(default)]
    pub navigation: NavigationConfigToml,
    #[serde(default)]
    pub session: SessionConfigToml,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsConfigToml {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_completed_grace_ms")]
    pub completed_grace_ms: u64,
    #[serde(default = "default_failed_grace_ms")]
    pub failed_grace_ms: u64,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    /// Base URL of the scrape service. Without it jobs are simulated.
    #[serde(default)]
    pub service_url: Option<String>,
}

impl Default for JobsConfigToml {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            completed_grace_ms: default_completed_grace_ms(),
            failed_grace_ms: default_failed_grace_ms(),
            results_dir: default_results_dir(),
            service_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypewriterConfigToml {
    #[serde(default = "default_char_delay_ms")]
    pub char_delay_ms: u64,
    #[serde(default = "default_min_line_delay_ms")]
    pub min_line_delay_ms: u64,
    #[serde(default = "default_max_line_delay_ms")]
    pub max_line_delay_ms: u64,
}

impl Default for TypewriterConfigToml {
    fn default() -> Self {
        Self {
            char_delay_ms: default_char_delay_ms(),
            min_line_delay_ms: default_min_line_delay_ms(),
            max_line_delay_ms: default_max_line_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfigToml {
    #[serde(default = "default_navigation_delay_ms")]
    pub delay_ms: u64,
}

impl Default for NavigationConfigToml {
    fn default() -> Self {
        Self {
            delay_ms: default_navigation_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfigToml {
    /// Where to keep the session snapshot. No snapshot when unset.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl ShellConfig {
    pub fn from_toml_str(raw: &str) -> ShellResult<Self> {
        let config: ShellConfig =
            toml::from_str(raw).map_err(|e| ShellError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ShellResult<()> {
        if self.jobs.poll_interval_ms == 0 {
            return Err(ShellError::Config(
                "jobs.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.typewriter.min_line_delay_ms > self.typewriter.max_line_delay_ms {
            return Err(ShellError::Config(
                "typewriter.min_line_delay_ms must not exceed typewriter.max_line_delay_ms"
                    .to_string(),
            ));
        }
        self.results_dir()?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.jobs.poll_interval_ms)
    }

    pub fn grace_periods(&self) -> GracePeriods {
        GracePeriods {
            completed: Duration::from_millis(self.jobs.completed_grace_ms),
            failed: Duration::from_millis(self.jobs.failed_grace_ms),
        }
    }

    pub fn reveal_timing(&self) -> RevealTiming {
        RevealTiming {
            char_delay: Duration::from_millis(self.typewriter.char_delay_ms),
            min_line_delay: Duration::from_millis(self.typewriter.min_line_delay_ms),
            max_line_delay: Duration::from_millis(self.typewriter.max_line_delay_ms),
        }
    }

    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation.delay_ms)
    }

    pub fn results_dir(&self) -> ShellResult<VirtualPath> {
        VirtualPath::parse(&self.jobs.results_dir)
            .map_err(|e| ShellError::Config(format!("jobs.results_dir: {}", e)))
    }
}

/// Load from `explicit`, else from `PORTFOLIO_SHELL_CONFIG`, else defaults.
pub fn load(explicit: Option<&Path>) -> ShellResult<ShellConfig> {
    let from_env = std::env::var_os(ENV_PORTFOLIO_SHELL_CONFIG).map(PathBuf::from);
    match resolve_config_path(explicit, from_env) {
        Some(path) => load_from_path(&path),
        None => Ok(ShellConfig::default()),
    }
}

fn resolve_config_path(explicit: Option<&Path>, from_env: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| from_env.filter(|path| !path.as_os_str().is_empty()))
}

/// A missing file yields the defaults; an unreadable or invalid one is an
/// error.
pub fn load_from_path(path: &Path) -> ShellResult<ShellConfig> {
    match std::fs::read_to_string(path) {
        Ok(raw) => ShellConfig::from_toml_str(&raw).map_err(|e| match e {
            ShellError::Config(message) => {
                ShellError::Config(format!("{}: {}", path.display(), message))
            }
            other => other,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ShellConfig::default()),
        Err(e) => Err(ShellError::Config(format!(
            "failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_completed_grace_ms() -> u64 {
    DEFAULT_COMPLETED_GRACE_MS
}

fn default_failed_grace_ms() -> u64 {
    DEFAULT_FAILED_GRACE_MS
}

fn default_results_dir() -> String {
    DEFAULT_RESULTS_DIR.to_owned()
}

fn default_char_delay_ms() -> u64 {
    DEFAULT_CHAR_DELAY_MS
}

fn default_min_line_delay_ms() -> u64 {
    DEFAULT_MIN_LINE_DELAY_MS
}

fn default_max_line_delay_ms() -> u64 {
    DEFAULT_MAX_LINE_DELAY_MS
}

fn default_navigation_delay_ms() -> u64 {
    DEFAULT_NAVIGATION_DELAY_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobStatus;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ShellConfig::from_toml_str("").unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(1500));
        assert_eq!(config.navigation_delay(), Duration::from_millis(500));
        assert_eq!(config.results_dir().unwrap().to_string(), "/results");
        assert_eq!(config.reveal_timing(), RevealTiming::default());
    }

    #[test]
    fn failed_jobs_are_pruned_sooner_by_default() {
        let grace = ShellConfig::default().grace_periods();
        assert!(grace.for_status(JobStatus::Failed) < grace.for_status(JobStatus::Completed));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ShellConfig::from_toml_str(
            r#"
            [jobs]
            poll_interval_ms = 250
            service_url = "http://localhost:8080"

            [session]
            snapshot_path = "/tmp/session.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.jobs.poll_interval_ms, 250);
        assert_eq!(config.jobs.failed_grace_ms, 5_000);
        assert_eq!(config.jobs.service_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(
            config.session.snapshot_path,
            Some(PathBuf::from("/tmp/session.json"))
        );
        assert_eq!(config.typewriter, TypewriterConfigToml::default());
    }

    #[test]
    fn rejects_invalid_values() {
        for raw in [
            "[jobs]\npoll_interval_ms = 0",
            "[typewriter]\nmin_line_delay_ms = 300\nmax_line_delay_ms = 100",
            "[jobs]\nresults_dir = \"results\"",
            "[jobs]\npoll_interval_ms = \"fast\"",
        ] {
            let err = ShellConfig::from_toml_str(raw).unwrap_err();
            assert!(matches!(err, ShellError::Config(_)), "{raw}");
        }
    }

    #[test]
    fn explicit_path_wins_over_env() {
        let explicit = PathBuf::from("/a.toml");
        assert_eq!(
            resolve_config_path(Some(&explicit), Some(PathBuf::from("/b.toml"))),
            Some(explicit)
        );
        assert_eq!(
            resolve_config_path(None, Some(PathBuf::from("/b.toml"))),
            Some(PathBuf::from("/b.toml"))
        );
        assert_eq!(resolve_config_path(None, Some(PathBuf::new())), None);
        assert_eq!(resolve_config_path(None, None), None);
    }

    #[test]
    fn loads_files_and_tolerates_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(load_from_path(&missing).unwrap(), ShellConfig::default());

        let path = dir.path().join("shell.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[navigation]\ndelay_ms = 0").unwrap();
        assert_eq!(load_from_path(&path).unwrap().navigation.delay_ms, 0);
    }
}
