//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios mirror what the `acct_gather_profile/exporter` plugin
//! leaves under `ProfileExporterDir` on a compute node.

use super::filesystem::MockFs;

/// Profile directory used by every scenario.
pub const PROFILE_ROOT: &str = "/var/spool/slurm/profile";

impl MockFs {
    /// A node running one job with a batch step and a two-task step.
    pub fn typical_node() -> Self {
        let mut fs = Self::new();

        fs.add_job_step(
            PROFILE_ROOT,
            "1001.batch",
            Some(
                "\
time 1700000000
node cn042
user alice
tasks 1
cpus 4
cpus_per_task 4
mem 8192
",
            ),
            &[(
                "0",
                "\
time 1700000030
CPUFrequency 2400
CPUTime 12.50
CPUUtilization 98.20
RSS 524288
VMSize 1048576
Pages 3
ReadMB 1.25
WriteMB 0.50
",
            )],
        );

        fs.add_job_step(
            PROFILE_ROOT,
            "1001.0",
            Some(
                "\
time 1700000005
node cn042
user alice
tasks 2
cpus 8
cpus_per_task 4
mem 16384
gpu a100:2
",
            ),
            &[
                (
                    "0",
                    "\
time 1700000030
CPUUtilization 99.00
RSS 2097152
",
                ),
                (
                    "1",
                    "\
time 1700000031
CPUUtilization 97.50
RSS 2000000
",
                ),
            ],
        );

        fs
    }

    /// A profile directory polluted with every kind of broken entry next to
    /// a single healthy step (`5.0`, one task, one metric).
    pub fn damaged_node() -> Self {
        let mut fs = Self::new();

        fs.add_job_step(
            PROFILE_ROOT,
            "5.0",
            Some("user bob\nnode cn001\n"),
            &[
                ("0", "time 1700000100\nCPUUtilization 50.00\n"),
                // Truncated while slurmstepd was rewriting it.
                ("1", ""),
                ("2", "CPUUtilization 10.00\n"),
                ("3", "time 1700000100\nCPUUtilization\n"),
            ],
        );
        fs.add_dir(format!("{PROFILE_ROOT}/5.0/subdir"));

        // No alloc yet.
        fs.add_job_step(PROFILE_ROOT, "6.0", None, &[("0", "time 1\nRSS 1\n")]);
        // Missing node.
        fs.add_job_step(
            PROFILE_ROOT,
            "7.extern",
            Some("user alice\n"),
            &[("0", "time 1\nRSS 1\n")],
        );
        fs.add_job_step(
            PROFILE_ROOT,
            "badname",
            Some("user x\nnode y\n"),
            &[("0", "time 1\nRSS 1\n")],
        );
        fs.add_job_step(
            PROFILE_ROOT,
            "abc.0",
            Some("user x\nnode y\n"),
            &[("0", "time 1\nRSS 1\n")],
        );
        fs.add_file(format!("{PROFILE_ROOT}/stray.txt"), "time 1\nRSS 1\n");

        fs
    }
}
