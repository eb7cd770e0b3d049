use assert_cmd::Command;
use predicates::prelude::*;

fn swarmcog() -> Command {
    let mut cmd = Command::cargo_bin("swarmcog").unwrap();
    cmd.env_remove("SWARMCOG_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn version_prints_phase_order() {
    swarmcog()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("swarmcog "))
        .stdout(predicate::str::contains("perception -> attention"));
}

#[test]
fn run_reports_completed_tasks() {
    swarmcog()
        .args(["run", "--agents", "2", "--cycles", "2", "--workers", "2"])
        .args(["--interval", "0.01", "--goal", "explore", "--goal", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total cycles:     4"))
        .stdout(predicate::str::contains("Completed tasks:  28"))
        .stdout(predicate::str::contains("Failed tasks:     0"))
        .stdout(predicate::str::contains(
            "agent_1: phase=perception goals=2 intentions=plan_for_explore,plan_for_report",
        ));
}

#[test]
fn run_json_output() {
    let output = swarmcog()
        .args(["--format", "json", "run", "--agents", "1", "--workers", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stats"]["completed_tasks"], 7);
    assert_eq!(report["status"]["running"], "false");
    assert_eq!(report["agents"][0]["agent_id"], "agent_1");
    assert_eq!(report["store"]["type_memory_node"], 1);
}

#[test]
fn run_respects_max_agents_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swarmcog.json");
    std::fs::write(&path, r#"{ "max_agents": 2, "cycle_interval_secs": 0.01 }"#).unwrap();

    swarmcog()
        .args(["run", "--agents", "3", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_agents is 2"));
}

#[test]
fn run_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    swarmcog()
        .args(["run", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn run_rejects_zero_interval() {
    swarmcog()
        .args(["run", "--interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn space_shows_trust_and_statistics() {
    swarmcog()
        .args(["space", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total_atoms:"))
        .stdout(predicate::str::contains("coordinator <-> researcher: 0.80"))
        .stdout(predicate::str::contains("coordinator <-> analyst: -"));
}

#[test]
fn space_json_limits_atoms() {
    let output = swarmcog()
        .args(["space", "-n", "2", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["most_important"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["statistics"]["type_agent_node"], 3);
    assert_eq!(report["most_important"][0]["name"], "publish_findings");
}

#[test]
fn run_uses_config_log_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swarmcog.json");
    std::fs::write(&path, r#"{ "log_level": "debug" }"#).unwrap();

    swarmcog()
        .args(["run", "--agents", "1", "--workers", "1", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Scheduled cognitive cycle"));

    swarmcog()
        .args(["run", "--agents", "1", "--workers", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Scheduled cognitive cycle").not());
}
