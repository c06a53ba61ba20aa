//! Discovery of the profile directory.
//!
//! The directory is either given explicitly or read from the running
//! Slurm configuration (`scontrol show config`, key `ProfileExporterDir`).

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

/// Slurm configuration key naming the profile directory.
pub const PROFILE_DIR_KEY: &str = "ProfileExporterDir";

/// Startup configuration errors. All of them are fatal.
#[derive(Debug)]
pub enum ConfigError {
    /// The config command could not be started.
    Spawn(io::Error),
    /// The config command exited unsuccessfully.
    CommandFailed { status: String, stderr: String },
    /// No value for a required key.
    MissingKey(&'static str),
    /// Listen address/port do not form a socket address.
    InvalidListen(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Spawn(e) => write!(f, "failed to execute scontrol: {}", e),
            ConfigError::CommandFailed { status, stderr } => {
                write!(f, "scontrol failed ({}): {}", status, stderr)
            }
            ConfigError::MissingKey(key) => write!(f, "could not determine {}", key),
            ConfigError::InvalidListen(addr) => write!(f, "invalid listen address '{}'", addr),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Source of workload manager configuration values.
pub trait ConfigSource {
    /// Returns the value configured for `key`, if any.
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

/// Reads the live Slurm configuration via `scontrol show config`.
#[derive(Debug, Clone)]
pub struct ScontrolConfig {
    program: PathBuf,
}

impl ScontrolConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ScontrolConfig {
    fn default() -> Self {
        Self::new("scontrol")
    }
}

impl ConfigSource for ScontrolConfig {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        debug!(program = %self.program.display(), key, "querying slurm configuration");
        let output = Command::new(&self.program)
            .args(["show", "config"])
            .output()
            .map_err(ConfigError::Spawn)?;

        if !output.status.success() {
            return Err(ConfigError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_show_config(&stdout, key))
    }
}

/// Finds `key` in `scontrol show config` output (`Key = Value` lines).
///
/// Unset values are printed as `(null)` and are treated as absent.
pub fn parse_show_config(output: &str, key: &str) -> Option<String> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty() && *v != "(null)")
        .map(str::to_string)
}

/// Fixed key/value configuration, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    values: HashMap<String, String>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for StaticConfig {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Determines the profile directory.
///
/// An explicit path wins and the source is not consulted.
pub fn resolve_profile_dir(
    explicit: Option<PathBuf>,
    source: &dyn ConfigSource,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    source
        .lookup(PROFILE_DIR_KEY)?
        .map(PathBuf::from)
        .ok_or(ConfigError::MissingKey(PROFILE_DIR_KEY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const SHOW_CONFIG: &str = "\
Configuration data as of 2024-01-01T00:00:00
AccountingStorageBackupHost = (null)
AcctGatherProfileType   = acct_gather_profile/exporter
ClusterName             = hpc
ProfileExporterDefault  = task
ProfileExporterDir      = /var/spool/slurm/profile
SlurmctldHost[0]        = ctl(10.0.0.1)
";

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl ConfigSource for CountingSource {
        fn lookup(&self, _key: &str) -> Result<Option<String>, ConfigError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Some("/from/source".to_string()))
        }
    }

    #[test]
    fn test_parse_show_config() {
        assert_eq!(
            parse_show_config(SHOW_CONFIG, PROFILE_DIR_KEY).as_deref(),
            Some("/var/spool/slurm/profile")
        );
        assert_eq!(
            parse_show_config(SHOW_CONFIG, "ClusterName").as_deref(),
            Some("hpc")
        );
    }

    #[test]
    fn test_parse_show_config_exact_key() {
        // ProfileExporterDefault must not match a ProfileExporter prefix lookup
        assert_eq!(parse_show_config(SHOW_CONFIG, "ProfileExporter"), None);
    }

    #[test]
    fn test_parse_show_config_null_value() {
        assert_eq!(
            parse_show_config(SHOW_CONFIG, "AccountingStorageBackupHost"),
            None
        );
        assert_eq!(parse_show_config("ProfileExporterDir =\n", PROFILE_DIR_KEY), None);
    }

    #[test]
    fn test_parse_show_config_missing() {
        assert_eq!(parse_show_config("ClusterName = hpc\n", PROFILE_DIR_KEY), None);
    }

    #[test]
    fn test_resolve_explicit_wins() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let dir = resolve_profile_dir(Some(PathBuf::from("/explicit")), &source).unwrap();
        assert_eq!(dir, PathBuf::from("/explicit"));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_resolve_from_source() {
        let source = StaticConfig::new().with(PROFILE_DIR_KEY, "/var/spool/slurm/profile");
        let dir = resolve_profile_dir(None, &source).unwrap();
        assert_eq!(dir, PathBuf::from("/var/spool/slurm/profile"));
    }

    #[test]
    fn test_resolve_missing_is_fatal() {
        let err = resolve_profile_dir(None, &StaticConfig::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(PROFILE_DIR_KEY)));
        assert_eq!(err.to_string(), "could not determine ProfileExporterDir");
    }

    #[test]
    fn test_scontrol_spawn_failure() {
        let source = ScontrolConfig::new("/nonexistent/scontrol-binary");
        let err = source.lookup(PROFILE_DIR_KEY).unwrap_err();
        assert!(matches!(err, ConfigError::Spawn(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_scontrol_failure_status() {
        let err = ScontrolConfig::new("false")
            .lookup(PROFILE_DIR_KEY)
            .unwrap_err();
        assert!(matches!(err, ConfigError::CommandFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_scontrol_output_without_key() {
        // `echo show config` prints no key/value lines at all
        let value = ScontrolConfig::new("echo").lookup(PROFILE_DIR_KEY).unwrap();
        assert_eq!(value, None);
    }
}
