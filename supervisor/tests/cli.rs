//! Tests for the hostsim command line

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

mod common;
use common::TestFixtures;

fn hostsim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hostsim"))
}

/// Pid written by a wrapper script once it has been spawned
fn read_pid_file(path: &Path) -> i32 {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if let Some(pid) = std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
        {
            return pid;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    panic!("{} was never written", path.display());
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> ExitStatus {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    let _ = child.kill();
    panic!("hostsim did not exit within {limit:?}");
}

#[test]
fn test_validate_prints_resolved_scenario() {
    let output = hostsim()
        .arg("validate")
        .arg("--scenario")
        .arg(TestFixtures::scenarios_dir().join(TestFixtures::SCENARIO_B))
        .output()
        .unwrap();

    assert!(output.status.success());
    let resolved: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(resolved["id"], "scenario_b_wrapper_and_env_files");
    assert_eq!(
        resolved["processes"][0]["env"]["APP_CONFIG_PATH"],
        "/etc/wrapped/app-config.yaml"
    );
}

#[test]
fn test_invalid_scenario_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"id":"broken","processes":[{"name":"x","kind":"cron"}]}"#).unwrap();

    let output = hostsim().arg("validate").arg("--scenario").arg(&path).output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cron"));
}

#[test]
fn test_run_with_duration_reports_forced_batch() {
    let output = hostsim()
        .arg("run")
        .arg("--scenario")
        .arg(TestFixtures::scenarios_dir().join(TestFixtures::SCENARIO_C))
        .arg("--duration-secs")
        .arg("1")
        .arg("--shutdown-timeout-secs")
        .arg("1")
        .arg("--mockproc")
        .arg(TestFixtures::mockproc_binary())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""forced_exit": 137"#), "stdout: {stdout}");
}

#[test]
fn test_interrupt_during_startup_stops_launched_processes() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("worker.pid");
    let scenario = dir.path().join("slow_start.json");
    let descriptor = serde_json::json!({
        "id": "slow_start",
        "env": { "PID_FILE": pid_file.display().to_string() },
        "processes": [{
            "name": "worker",
            "kind": "worker",
            "entrypoint": { "wrapper": ["sh", "-c", "echo $$ > \"$PID_FILE\"; sleep 5; exec \"$0\" \"$@\""] }
        }]
    });
    std::fs::write(&scenario, descriptor.to_string()).unwrap();

    let mut run = hostsim()
        .arg("run")
        .arg("--scenario")
        .arg(&scenario)
        .arg("--readiness-timeout-secs")
        .arg("30")
        .arg("--shutdown-timeout-secs")
        .arg("2")
        .arg("--mockproc")
        .arg(TestFixtures::mockproc_binary())
        .stdout(Stdio::null())
        .spawn()
        .unwrap();
    let worker_pid = read_pid_file(&pid_file);

    kill(Pid::from_raw(run.id() as i32), Signal::SIGINT).unwrap();
    let status = wait_with_deadline(&mut run, Duration::from_secs(15));

    assert!(!status.success());
    assert_eq!(kill(Pid::from_raw(worker_pid), None), Err(Errno::ESRCH));
}
