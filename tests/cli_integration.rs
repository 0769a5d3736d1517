//! Integration tests for the streamcharts CLI
//!
//! These tests run the real binary against a small CSV in a temporary
//! directory and check stdout, stderr and written reports.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const SONGS_CSV: &str = "\
Track Name,Artist Name,genre,track_genre,Spotify_Hit,TikTok_Hit,Apple_Music_Hit,Spotify Streams,YouTube Views,TikTok Views,Deezer Playlist Reach,Apple Music Playlist Count
Neon Nights,Alpha,pop,pop,True,True,False,5000000,2000000,9000000,120000,80
Quiet Roads,Beta,folk,folk,False,False,True,12000,3400,0,560,3
\"Hello, Again\",Gamma,pop,pop,True,False,True,750000,,150000,9000,40
Static,Delta,rock,rock,False,True,False,0,0,0,0,0
Loud Hearts,Epsilon,rock,rock,True,True,True,2500000000,900000000,45000000,7800000,210
";

/// Write the sample CSV into a fresh temp dir
fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let csv = dir.path().join("songs.csv");
    std::fs::write(&csv, SONGS_CSV).expect("Failed to write csv");
    (dir, csv)
}

/// Helper to run the CLI from inside the temp dir
fn run(args: &[&str], cwd: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_streamcharts"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute streamcharts")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// =============================================================================
// Basic Command Tests
// =============================================================================

#[test]
fn test_help_command() {
    let (dir, _) = setup();
    let output = run(&["--help"], dir.path());

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("streamcharts"));
    assert!(out.contains("serve"));
    assert!(out.contains("sankey"));
}

#[test]
fn test_missing_path_fails() {
    let (dir, _) = setup();
    let output = run(&["--no-open"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Usage"));
}

// =============================================================================
// Sankey
// =============================================================================

#[test]
fn test_sankey_json() {
    let (dir, csv) = setup();
    let output = run(&["sankey", csv.to_str().unwrap()], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let v = json(&output);
    let nodes = v["nodes"].as_array().unwrap();
    let links = v["links"].as_array().unwrap();

    // 9 platforms + pop, folk, rock
    assert_eq!(nodes.len(), 12);
    assert!(links.iter().all(|l| l["value"].as_u64().unwrap() >= 1));

    let spotify_pop = links
        .iter()
        .find(|l| l["source"] == "Spotify" && l["target"] == "pop")
        .unwrap();
    assert_eq!(spotify_pop["value"], 2);
}

#[test]
fn test_sankey_platform_filter() {
    let (dir, csv) = setup();
    let output = run(&["sankey", csv.to_str().unwrap(), "--platform", "Apple_Music"], dir.path());
    assert!(output.status.success());

    let v = json(&output);
    let links = v["links"].as_array().unwrap();
    assert_eq!(links.len(), 3);
    assert!(links.iter().all(|l| l["source"] == "Apple_Music"));
}

#[test]
fn test_sankey_unknown_platform_fails() {
    let (dir, csv) = setup();
    let output = run(&["sankey", csv.to_str().unwrap(), "--platform", "Napster"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown platform"));
}

// =============================================================================
// Parallel coordinates
// =============================================================================

#[test]
fn test_parallel_drops_all_zero_songs() {
    let (dir, csv) = setup();
    let output = run(&["parallel", csv.to_str().unwrap()], dir.path());
    assert!(output.status.success());

    let v = json(&output);
    let lines = v["lines"].as_array().unwrap();
    // "Static" has no reach anywhere
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l["passed_count"] == 5));
    assert_eq!(v["scale"]["domain"][0], 3.0);
    assert_eq!(v["scale"]["domain"][1], 2500000000.0);
}

#[test]
fn test_parallel_genre_and_percentile() {
    let (dir, csv) = setup();
    let output = run(
        &["parallel", csv.to_str().unwrap(), "--genre", "pop", "--percentile", "0.5"],
        dir.path(),
    );
    assert!(output.status.success());

    let v = json(&output);
    let lines = v["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(v["thresholds"]["spotify_streams"], 5000000.0);
    assert_eq!(v["markers"][0]["label"], "Top 50%");
    assert_eq!(v["legend"].as_array().unwrap().len(), 4);
}

#[test]
fn test_parallel_rejects_bad_percentile() {
    let (dir, csv) = setup();
    let output = run(&["parallel", csv.to_str().unwrap(), "--percentile", "1.5"], dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid percentile"));
}

// =============================================================================
// Genres and thresholds
// =============================================================================

#[test]
fn test_genres_listing() {
    let (dir, csv) = setup();
    let output = run(&["genres", csv.to_str().unwrap()], dir.path());
    assert!(output.status.success());

    let genres: Vec<String> = stdout(&output).lines().map(String::from).collect();
    assert_eq!(genres, vec!["all", "Folk", "Pop", "Rock"]);
}

#[test]
fn test_thresholds_table() {
    let (dir, csv) = setup();
    let output = run(&["thresholds", csv.to_str().unwrap(), "--percentile", "0.25"], dir.path());
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("PLATFORM"));
    assert!(out.contains("Spotify"));
    assert!(out.contains("Apple Music"));
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_json_report() {
    let (dir, csv) = setup();
    let report = dir.path().join("out.json");
    let output = run(
        &[csv.to_str().unwrap(), "-o", report.to_str().unwrap(), "--no-open", "--percentile", "0.25"],
        dir.path(),
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(v["params"]["percentile"], 0.25);
    assert_eq!(v["parallel"]["lines"].as_array().unwrap().len(), 4);
    assert!(stderr(&output).contains("Songs plotted"));
}

#[test]
fn test_auto_html_report() {
    let (dir, csv) = setup();
    let output = run(&[csv.to_str().unwrap(), "--no-open", "-q"], dir.path());
    assert!(output.status.success());

    let reports: Vec<_> = std::fs::read_dir(dir.path().join("streamcharts-reports"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(reports.len(), 1);

    let html = std::fs::read_to_string(reports[0].path()).unwrap();
    assert!(html.contains("const LIVE_MODE = false;"));
    assert!(html.contains("Neon Nights"));
}

#[test]
fn test_missing_csv_renders_empty() {
    let (dir, _) = setup();
    let report = dir.path().join("empty.json");
    let output = run(
        &["nope.csv", "-o", report.to_str().unwrap(), "--no-open"],
        dir.path(),
    );

    // Load failures are logged, not fatal
    assert!(output.status.success());
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert!(v["sankey"]["links"].as_array().unwrap().is_empty());
    assert!(stderr(&output).contains("Error loading data"));
}

#[test]
fn test_config_file_overrides_platforms() {
    let (dir, csv) = setup();
    std::fs::write(
        dir.path().join("streamcharts.toml"),
        "[sankey]\nplatforms = [\"Spotify\", \"TikTok\"]\n",
    )
    .unwrap();

    let output = run(&["sankey", csv.to_str().unwrap()], dir.path());
    assert!(output.status.success());

    let v = json(&output);
    let platform_nodes = v["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["type"] == "platform")
        .count();
    assert_eq!(platform_nodes, 2);
}
