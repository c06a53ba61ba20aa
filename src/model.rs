//! Samples and the per-metric series they are grouped into.
//!
//! Values and timestamps stay as the strings read from disk. Conversion to
//! numbers happens only when a series is rendered (see `exposition`).

/// Prefix of every exported metric name.
pub const METRIC_PREFIX: &str = "slurm_profile_";

/// Labels attached to every sample: where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSet {
    pub jobid: String,
    pub stepid: String,
    pub user: String,
    pub node: String,
    pub task: String,
}

impl LabelSet {
    /// Label names and values in exposition order.
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("jobid", self.jobid.as_str()),
            ("stepid", self.stepid.as_str()),
            ("user", self.user.as_str()),
            ("node", self.node.as_str()),
            ("task", self.task.as_str()),
        ]
    }
}

/// One observed value of one metric for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Raw metric name as written in the task file (without prefix).
    pub metric: String,
    pub labels: LabelSet,
    /// Value verbatim from the task file.
    pub value: String,
    /// The task file's `time` entry, unix seconds.
    pub timestamp: String,
}

/// All samples of one metric collected in a single scan.
///
/// Always a gauge. Built fresh by every collection cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeries {
    pub name: String,
    pub help: String,
    pub samples: Vec<Sample>,
}

impl TimeSeries {
    /// Creates an empty series for a raw metric name.
    pub fn new(raw_metric: &str) -> Self {
        Self {
            name: format!("{METRIC_PREFIX}{raw_metric}"),
            help: format!("Sampled slurm acct_gather_profile_exporter {raw_metric}"),
            samples: Vec::new(),
        }
    }

    pub fn metric_type(&self) -> &'static str {
        "gauge"
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
