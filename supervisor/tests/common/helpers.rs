//! Test helpers for driving real supervised processes

use std::time::Duration;

use supervisor::{HostSupervisor, ProcessState, RealProcessLauncher, ShutdownReport, TraceBuffer};

use super::fixtures::TestFixtures;

pub struct TestHelpers;

impl TestHelpers {
    /// Supervisor spawning the mockproc binary built for this test run
    pub fn real_supervisor() -> HostSupervisor<RealProcessLauncher> {
        HostSupervisor::new(RealProcessLauncher::new(TestFixtures::mockproc_binary()))
            .with_readiness_timeout(Duration::from_secs(10))
    }

    /// Poll the captured output of `name` until a line contains `needle`
    pub async fn wait_for_trace(supervisor: &HostSupervisor<RealProcessLauncher>, name: &str, needle: &str) -> bool {
        for _ in 0..50 {
            let lines = supervisor.trace(name).unwrap_or_default();
            if lines.iter().any(|line| line.contains(needle)) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        false
    }

    /// Poll a trace buffer until a line contains `needle`
    pub async fn trace_has(trace: &TraceBuffer, needle: &str) -> bool {
        for _ in 0..20 {
            if trace.lines().iter().any(|line| line.contains(needle)) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    pub async fn get(url: &str) -> (u16, String) {
        let response = reqwest::get(url).await.unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }

    pub fn assert_all_exited_cleanly(report: &ShutdownReport) {
        for process in &report.processes {
            assert_eq!(
                process.state,
                ProcessState::Exited(0),
                "{} did not exit cleanly",
                process.name
            );
        }
    }
}
