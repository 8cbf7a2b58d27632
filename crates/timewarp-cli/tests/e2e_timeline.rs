//! E2E tests for the `tw` binary.
//!
//! Each test writes an event feed and roster into a temp directory and runs
//! `tw` there with a pinned "today" and zone, so output is reproducible.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const EVENTS: &str = r#"[
  {"id": 1, "taskId": 1, "actorId": "ana", "fieldName": "status",
   "oldValue": "todo", "newValue": "inprogress", "timestamp": "2024-01-02T10:00:00Z"},
  {"id": 2, "taskId": 1, "actorId": "ana", "fieldName": "status",
   "oldValue": "inprogress", "newValue": "done", "timestamp": "2024-01-05T09:00:00Z"},
  {"id": 3, "taskId": 77, "actorId": "bo", "fieldName": "status",
   "newValue": "done", "timestamp": "2024-01-05T12:00:00Z"}
]"#;

const TASKS: &str = "{\"id\": 1, \"title\": \"Write docs\", \"createdAt\": \"2024-01-01T08:00:00Z\"}\n\
{\"id\": 2, \"title\": \"Ship it\", \"assignedUser\": \"bo\", \"createdAt\": \"2024-01-01\"}\n";

/// Temp project holding `events.json` and `tasks.jsonl`.
fn project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("events.json"), EVENTS).expect("write events");
    std::fs::write(dir.path().join("tasks.jsonl"), TASKS).expect("write tasks");
    dir
}

/// Build a Command targeting the tw binary, rooted in `dir`.
fn tw_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tw"));
    cmd.current_dir(dir);
    // keep the user's config and env out of the run
    cmd.env("XDG_CONFIG_HOME", dir);
    cmd.env("HOME", dir);
    cmd.env_remove("FORMAT");
    cmd.env("TIMEWARP_LOG", "error");
    cmd.args(["--today", "2024-01-10", "--utc-offset", "+00:00"]);
    cmd
}

fn with_inputs(cmd: &mut Command) -> &mut Command {
    cmd.args(["-e", "events.json", "-t", "tasks.jsonl"])
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("tw should run");
    assert!(
        output.status.success(),
        "tw failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

// ---------------------------------------------------------------------------
// index
// ---------------------------------------------------------------------------

#[test]
fn index_lists_anchor_dates() {
    let dir = project();
    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.arg("index")).arg("--json");
    let json = json_stdout(&mut cmd);

    let dates: Vec<&str> = json["anchors"]
        .as_array()
        .expect("anchors array")
        .iter()
        .map(|a| a["date"].as_str().expect("date"))
        .collect();
    assert_eq!(dates, ["2024-01-01", "2024-01-02", "2024-01-05", "2024-01-10"]);
    assert_eq!(json["tasks"], 2);
    assert_eq!(json["events"], 3);
}

#[test]
fn index_text_is_tab_separated() {
    let dir = project();
    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.args(["--format", "text", "index"]))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0.0\t2024-01-01\n"))
        .stdout(predicate::str::contains("100.0\t2024-01-10"));
}

// ---------------------------------------------------------------------------
// snapshot
// ---------------------------------------------------------------------------

#[test]
fn snapshot_walks_through_the_scenario() {
    let dir = project();

    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.args(["snapshot", "--date", "2024-01-02", "--json"]));
    let jan2 = json_stdout(&mut cmd);
    assert_eq!(jan2["eventCount"], 1);
    assert_eq!(jan2["counts"]["inProgress"], 1);
    assert_eq!(jan2["label"], "Jan 2, 2024");

    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.args(["snapshot", "--position", "66.7", "--json"]));
    let jan5 = json_stdout(&mut cmd);
    assert_eq!(jan5["date"], "2024-01-05");
    assert_eq!(jan5["eventCount"], 2);
    assert_eq!(jan5["counts"]["done"], 1);
    assert_eq!(jan5["byAssignee"]["bo"], 1);
    assert_eq!(jan5["byAssignee"]["Unassigned"], 1);
}

#[test]
fn snapshot_at_zero_is_baseline() {
    let dir = project();
    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.args(["--format", "text", "snapshot", "--position", "0"]))
        .assert()
        .success()
        .stdout(predicate::str::contains("1\ttodo\tmedium\tUnassigned\tWrite docs"))
        .stdout(predicate::str::contains("2\ttodo\tmedium\tbo\tShip it"));
}

#[test]
fn snapshot_pretty_shows_status_bar() {
    let dir = project();
    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.args(["--format", "pretty", "snapshot"]))
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot: Jan 10, 2024"))
        .stdout(predicate::str::contains("done 1 (50%)"));
}

#[test]
fn baseline_defaults_come_from_project_config() {
    let dir = project();
    std::fs::write(
        dir.path().join(".timewarp.toml"),
        "[baseline]\nstatus = \"backlog\"\npriority = \"low\"\n",
    )
    .expect("write config");

    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.args(["snapshot", "--position", "0", "--json"]));
    let json = json_stdout(&mut cmd);
    assert_eq!(json["counts"]["other"], 2);
    assert_eq!(json["byPriority"]["low"], 2);
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_streams_frames_until_the_end() {
    let dir = project();
    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.args([
        "play",
        "--from",
        "50",
        "--interval-ms",
        "5",
        "--increment",
        "25",
        "--json",
    ]));
    let output = cmd.output().expect("tw should run");
    assert!(output.status.success());

    let frames: Vec<Value> = String::from_utf8(output.stdout)
        .expect("utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("frame JSON"))
        .collect();
    let positions: Vec<f64> = frames
        .iter()
        .map(|f| f["position"].as_f64().expect("position"))
        .collect();
    assert_eq!(positions, [50.0, 75.0, 100.0]);
    assert_eq!(frames[2]["eventCount"], 2);
}

#[test]
fn play_at_the_end_prints_a_single_frame() {
    let dir = project();
    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.args(["--format", "text", "play", "--from", "100"]))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("100.0\tJan 10, 2024\t1\t0\t1\t2\n"));
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[test]
fn missing_feed_reports_read_error_code() {
    let dir = project();
    tw_cmd(dir.path())
        .args(["snapshot", "-e", "nope.json", "-t", "tasks.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"))
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn garbage_feed_reports_parse_error_as_json() {
    let dir = project();
    std::fs::write(dir.path().join("bad.json"), "[{\"taskId\": 1,").expect("write");
    let output = tw_cmd(dir.path())
        .args(["snapshot", "-e", "bad.json", "-t", "tasks.jsonl", "--json"])
        .output()
        .expect("tw should run");
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stderr).expect("error JSON on stderr");
    assert_eq!(json["error"]["error_code"], "E1002");
}

#[test]
fn bad_offset_is_an_invalid_argument() {
    let dir = project();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tw"));
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("TIMEWARP_LOG", "error");
    with_inputs(cmd.args(["--utc-offset", "+25:00", "index"]))
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3001"));
}

#[test]
fn broken_config_is_a_config_error() {
    let dir = project();
    std::fs::write(dir.path().join(".timewarp.toml"), "[playback\n").expect("write config");
    let mut cmd = tw_cmd(dir.path());
    with_inputs(cmd.arg("index"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn completions_do_not_need_inputs() {
    let dir = project();
    tw_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("snapshot"));
}
