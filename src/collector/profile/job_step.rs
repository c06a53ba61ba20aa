//! Loading of one `<jobid>.<stepid>` directory into samples.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::traits::FileSystem;
use crate::model::{LabelSet, Sample};

use super::parser::{self, ParseError};

/// Name of the per-step metadata file.
pub const ALLOC_FILE: &str = "alloc";
/// Key holding the sample timestamp in task files.
pub const TIME_KEY: &str = "time";

/// Why a job step directory produced no samples.
#[derive(Debug)]
pub enum JobStepError {
    /// Directory name has no `.` separating job and step.
    MalformedName(String),
    /// Job part of the directory name is not a non-negative integer.
    InvalidJobId(String),
    /// `alloc` is missing or unreadable.
    AllocUnreadable(io::Error),
    /// `alloc` is not in `key value` format.
    AllocParse(ParseError),
    /// `alloc` lacks a required key.
    IncompleteAlloc { missing: &'static str },
    /// The directory itself could not be listed.
    Io(io::Error),
}

impl fmt::Display for JobStepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStepError::MalformedName(name) => {
                write!(f, "malformed job step name '{}'", name)
            }
            JobStepError::InvalidJobId(job) => write!(f, "invalid job id '{}'", job),
            JobStepError::AllocUnreadable(e) => write!(f, "cannot read alloc: {}", e),
            JobStepError::AllocParse(e) => write!(f, "cannot parse alloc: {}", e),
            JobStepError::IncompleteAlloc { missing } => {
                write!(f, "alloc has no '{}' entry", missing)
            }
            JobStepError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for JobStepError {}

impl From<io::Error> for JobStepError {
    fn from(e: io::Error) -> Self {
        JobStepError::Io(e)
    }
}

/// Job and step parts of a step directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStepId {
    pub job: String,
    pub step: String,
}

impl JobStepId {
    /// Splits `name` on the first `.`; the step may contain further dots.
    pub fn parse(name: &str) -> Result<Self, JobStepError> {
        let Some((job, step)) = name.split_once('.') else {
            return Err(JobStepError::MalformedName(name.to_string()));
        };
        if job.parse::<u64>().is_err() {
            return Err(JobStepError::InvalidJobId(job.to_string()));
        }
        Ok(Self {
            job: job.to_string(),
            step: step.to_string(),
        })
    }
}

/// Contents of a step's `alloc` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocInfo {
    pub user: String,
    pub node: String,
    /// Everything else the plugin records (time, tasks, cpus, mem, gres).
    pub extra: BTreeMap<String, String>,
}

impl AllocInfo {
    pub fn from_table(mut table: BTreeMap<String, String>) -> Result<Self, JobStepError> {
        let user = table
            .remove("user")
            .ok_or(JobStepError::IncompleteAlloc { missing: "user" })?;
        let node = table
            .remove("node")
            .ok_or(JobStepError::IncompleteAlloc { missing: "node" })?;
        Ok(Self {
            user,
            node,
            extra: table,
        })
    }
}

/// Loads every sample of one job step directory.
///
/// Fails as a whole if the name or `alloc` is unusable. Individual task
/// files that cannot be used are skipped and logged.
pub fn load_job_step<F: FileSystem>(fs: &F, dir: &Path) -> Result<Vec<Sample>, JobStepError> {
    let name = file_name(dir);
    let id = JobStepId::parse(&name)?;

    let mut children: Vec<PathBuf> = fs
        .read_dir(dir)?
        .into_iter()
        .filter(|p| fs.is_file(p))
        .collect();
    children.sort();

    let alloc_path = dir.join(ALLOC_FILE);
    if !children.contains(&alloc_path) {
        return Err(JobStepError::AllocUnreadable(io::Error::new(
            io::ErrorKind::NotFound,
            "no alloc file",
        )));
    }
    let alloc_content = fs
        .read_to_string(&alloc_path)
        .map_err(JobStepError::AllocUnreadable)?;
    let alloc_table = parser::parse_key_values(&alloc_content).map_err(JobStepError::AllocParse)?;
    let alloc = AllocInfo::from_table(alloc_table)?;

    let mut samples = Vec::new();
    for path in children.iter().filter(|p| **p != alloc_path) {
        let task = file_name(path);
        let content = match fs.read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable task file");
                continue;
            }
        };
        let mut table = match parser::parse_key_values(&content) {
            Ok(t) => t,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping malformed task file");
                continue;
            }
        };
        let Some(timestamp) = table.remove(TIME_KEY) else {
            debug!(path = %path.display(), "skipping task file without time");
            continue;
        };

        let labels = LabelSet {
            jobid: id.job.clone(),
            stepid: id.step.clone(),
            user: alloc.user.clone(),
            node: alloc.node.clone(),
            task,
        };
        for (metric, value) in table {
            samples.push(Sample {
                metric,
                labels: labels.clone(),
                value,
                timestamp: timestamp.clone(),
            });
        }
    }

    Ok(samples)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
