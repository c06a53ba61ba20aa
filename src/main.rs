//! slurm-profile-exporter - Prometheus exporter for Slurm job step profiles.
//!
//! Serves the samples written by `acct_gather_profile/exporter` under
//! `ProfileExporterDir` on `/metrics`, rescanning the directory on every
//! scrape.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use slurm_profile_exporter::collector::{ProfileCollector, RealFs, ScanLimits};
use slurm_profile_exporter::config::{ConfigError, ScontrolConfig, resolve_profile_dir};
use slurm_profile_exporter::server;

/// Prometheus exporter for slurm acct_gather_profile_exporter.
#[derive(Parser)]
#[command(
    name = "slurm-profile-exporter",
    about = "Prometheus exporter for slurm acct_gather_profile_exporter",
    version = slurm_profile_exporter::VERSION
)]
struct Args {
    /// Listen on port NUM.
    #[arg(
        short,
        long,
        value_name = "NUM",
        default_value = "9681",
        env = "SLURM_PROFILE_EXPORTER_PORT"
    )]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0", env = "SLURM_PROFILE_EXPORTER_LISTEN")]
    listen: String,

    /// ProfileExporterDir. If not specified, read from `scontrol show config`.
    #[arg(short, long, value_name = "PATH", env = "SLURM_PROFILE_EXPORTER_DIR")]
    dir: Option<PathBuf>,

    /// Load at most N job step directories per scrape.
    #[arg(long, value_name = "N", env = "SLURM_PROFILE_EXPORTER_MAX_JOB_STEPS")]
    max_job_steps: Option<usize>,

    /// scontrol binary used to discover ProfileExporterDir.
    #[arg(long, value_name = "PATH", default_value = "scontrol")]
    scontrol: PathBuf,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// `RUST_LOG` directives are applied on top.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let directive = format!("slurm_profile_exporter={}", level);
    let filter = match directive.parse() {
        Ok(d) => EnvFilter::from_default_env().add_directive(d),
        Err(_) => EnvFilter::from_default_env(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn listen_addr(listen: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    listen
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, port))
        .map_err(|_| ConfigError::InvalidListen(listen.to_string()))
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!(version = slurm_profile_exporter::VERSION, "starting");

    let source = ScontrolConfig::new(&args.scontrol);
    let root = match resolve_profile_dir(args.dir.clone(), &source) {
        Ok(root) => root,
        Err(e) => {
            error!(error = %e, "cannot determine profile directory");
            process::exit(1);
        }
    };
    let addr = match listen_addr(&args.listen, args.port) {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "bad listen configuration");
            process::exit(1);
        }
    };

    let limits = ScanLimits {
        max_job_steps: args.max_job_steps,
    };
    info!(path = %root.display(), ?limits, "profile directory");
    let collector = Arc::new(ProfileCollector::new(RealFs::new(), root).with_limits(limits));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(async_main(addr, collector));
}

async fn async_main(addr: SocketAddr, collector: Arc<ProfileCollector<RealFs>>) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            process::exit(1);
        }
    };
    info!(%addr, "listening");

    if let Err(e) = server::serve(listener, collector).await {
        error!(error = %e, "server error");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr() {
        assert_eq!(
            listen_addr("0.0.0.0", 9681).unwrap(),
            "0.0.0.0:9681".parse().unwrap()
        );
        assert_eq!(listen_addr("::1", 80).unwrap(), "[::1]:80".parse().unwrap());
        assert!(matches!(
            listen_addr("localhost:80", 80),
            Err(ConfigError::InvalidListen(_))
        ));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["slurm-profile-exporter"]).unwrap();
        assert_eq!(args.port, 9681);
        assert_eq!(args.listen, "0.0.0.0");
        assert!(args.dir.is_none());
        assert!(args.max_job_steps.is_none());
    }

    #[test]
    fn test_args_short_flags() {
        let args =
            Args::try_parse_from(["slurm-profile-exporter", "-p", "9000", "-d", "/tmp/profile"])
                .unwrap();
        assert_eq!(args.port, 9000);
        assert_eq!(args.dir, Some(PathBuf::from("/tmp/profile")));
    }
}
