//! Scan of the whole profile directory into per-metric series.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::collector::traits::FileSystem;
use crate::model::TimeSeries;

use super::job_step::load_job_step;

/// Bounds applied to a single scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanLimits {
    /// Maximum number of job step directories loaded per scan.
    pub max_job_steps: Option<usize>,
}

/// Collector for the profile directory tree.
///
/// Holds no state between scans; every call to [`collect`](Self::collect)
/// rebuilds its series from disk, so one instance can serve concurrent
/// scrapes.
pub struct ProfileCollector<F: FileSystem> {
    fs: F,
    root: PathBuf,
    limits: ScanLimits,
}

impl<F: FileSystem> ProfileCollector<F> {
    /// Creates a new ProfileCollector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation
    /// * `root` - Profile directory (`ProfileExporterDir`)
    pub fn new(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
            limits: ScanLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scans the profile directory and groups all samples by metric.
    ///
    /// Returns series ordered by metric name. An unreadable root yields an
    /// empty list; broken job steps and task files are skipped.
    pub fn collect(&self) -> Vec<TimeSeries> {
        let entries = match self.fs.read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.root.display(), error = %e, "cannot read profile directory");
                return Vec::new();
            }
        };

        let mut steps: Vec<PathBuf> = entries
            .into_iter()
            .filter(|p| self.fs.is_dir(p))
            .collect();
        steps.sort();

        if let Some(max) = self.limits.max_job_steps {
            if steps.len() > max {
                warn!(
                    max,
                    skipped = steps.len() - max,
                    "too many job steps, truncating scan"
                );
                steps.truncate(max);
            }
        }

        let mut series: BTreeMap<String, TimeSeries> = BTreeMap::new();
        let mut loaded = 0usize;
        let mut sample_count = 0usize;

        for dir in &steps {
            let samples = match load_job_step(&self.fs, dir) {
                Ok(samples) => samples,
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "skipping job step");
                    continue;
                }
            };
            loaded += 1;
            sample_count += samples.len();

            for sample in samples {
                series
                    .entry(sample.metric.clone())
                    .or_insert_with(|| TimeSeries::new(&sample.metric))
                    .push(sample);
            }
        }

        debug!(
            job_steps = loaded,
            series = series.len(),
            samples = sample_count,
            "profile scan complete"
        );

        series.into_values().collect()
    }
}
