//! Scrapes a real profile directory through the HTTP router.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tempfile::TempDir;
use tower::ServiceExt;

use slurm_profile_exporter::collector::{ProfileCollector, RealFs};
use slurm_profile_exporter::model::LabelSet;
use slurm_profile_exporter::server::router;

fn write_step(root: &Path, name: &str, alloc: Option<&str>, tasks: &[(&str, &str)]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    if let Some(alloc) = alloc {
        fs::write(dir.join("alloc"), alloc).unwrap();
    }
    for (task, content) in tasks {
        fs::write(dir.join(task), content).unwrap();
    }
}

fn app(root: &Path) -> Router {
    router(Arc::new(ProfileCollector::new(RealFs::new(), root)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn sample_lines(body: &str) -> Vec<&str> {
    body.lines().filter(|l| !l.starts_with('#')).collect()
}

#[test]
fn collect_reference_example() {
    let dir = TempDir::new().unwrap();
    write_step(
        dir.path(),
        "42.0",
        Some("user root\nnode n1\n"),
        &[("0", "time 1000\ncpu_pct 55\nmem_mb 128\n")],
    );

    let series = ProfileCollector::new(RealFs::new(), dir.path()).collect();
    let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["slurm_profile_cpu_pct", "slurm_profile_mem_mb"]);

    let labels = LabelSet {
        jobid: "42".to_string(),
        stepid: "0".to_string(),
        user: "root".to_string(),
        node: "n1".to_string(),
        task: "0".to_string(),
    };
    for (s, value) in series.iter().zip(["55", "128"]) {
        assert_eq!(s.len(), 1);
        assert_eq!(s.samples[0].labels, labels);
        assert_eq!(s.samples[0].value, value);
        assert_eq!(s.samples[0].timestamp, "1000");
    }
}

#[tokio::test]
async fn scrape_reference_example() {
    let dir = TempDir::new().unwrap();
    write_step(
        dir.path(),
        "42.0",
        Some("user root\nnode n1\n"),
        &[("0", "time 1000\ncpu_pct 55\nmem_mb 128\n")],
    );

    let (status, body) = get(app(dir.path()), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sample_lines(&body),
        [
            "slurm_profile_cpu_pct{jobid=\"42\",stepid=\"0\",user=\"root\",node=\"n1\",task=\"0\"} 55 1000000",
            "slurm_profile_mem_mb{jobid=\"42\",stepid=\"0\",user=\"root\",node=\"n1\",task=\"0\"} 128 1000000",
        ]
    );
}

#[tokio::test]
async fn scrape_skips_broken_entries() {
    let dir = TempDir::new().unwrap();
    write_step(dir.path(), "42.0", Some("user root\nnode n1\n"), &[("0", "time 1000\ncpu_pct 55\n")]);
    write_step(dir.path(), "7.extern", Some("user alice\n"), &[("0", "time 1\nRSS 1\n")]);
    write_step(dir.path(), "badname", Some("user x\nnode y\n"), &[("0", "time 1\nRSS 1\n")]);
    write_step(dir.path(), "8.0", None, &[("0", "time 1\nRSS 1\n")]);
    write_step(
        dir.path(),
        "9.0",
        Some("user bob\nnode n2\n"),
        &[("0", "RSS 1\n"), ("1", "time 2\nRSS 3\n")],
    );
    fs::write(dir.path().join("notes"), "time 1\nRSS 1\n").unwrap();

    let (status, body) = get(app(dir.path()), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sample_lines(&body),
        [
            "slurm_profile_RSS{jobid=\"9\",stepid=\"0\",user=\"bob\",node=\"n2\",task=\"1\"} 3 2000",
            "slurm_profile_cpu_pct{jobid=\"42\",stepid=\"0\",user=\"root\",node=\"n1\",task=\"0\"} 55 1000000",
        ]
    );
}

#[tokio::test]
async fn scrape_missing_root_is_empty() {
    let dir = TempDir::new().unwrap();
    let (status, body) = get(app(&dir.path().join("not-yet-created")), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn scrape_tracks_directory_changes() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("profile");
    fs::create_dir(&root).unwrap();
    let app = app(&root);

    let (_, body) = get(app.clone(), "/metrics").await;
    assert!(body.is_empty());

    write_step(&root, "1.0", Some("user a\nnode n\n"), &[("0", "time 5\nRSS 7\n")]);
    let (_, body) = get(app.clone(), "/metrics").await;
    assert_eq!(sample_lines(&body).len(), 1);

    fs::remove_dir_all(&root).unwrap();
    let (status, body) = get(app.clone(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, _) = get(app, "/probe").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
