//! Test fixtures and data for supervisor tests

use std::path::PathBuf;

use supervisor::ScenarioDescriptor;

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const SCENARIO_A: &'static str = "scenario_a_basic_multi_proc_host.json";
    pub const SCENARIO_B: &'static str = "scenario_b_wrapper_and_env_files.json";
    pub const SCENARIO_C: &'static str = "scenario_c_batch_only_no_ports.json";

    /// Mock process binary built alongside these tests
    pub fn mockproc_binary() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_mockproc"))
    }

    pub fn scenarios_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("scenarios")
    }

    /// Load one of the bundled scenario files
    pub fn bundled(file: &str) -> ScenarioDescriptor {
        ScenarioDescriptor::load(Self::scenarios_dir().join(file)).unwrap()
    }

    /// A port nobody is listening on right now
    pub fn free_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    /// Worker and batch side by side; only the worker honors SIGTERM
    pub fn worker_and_batch() -> ScenarioDescriptor {
        ScenarioDescriptor::from_json(
            r#"{"id":"mixed","processes":[
                {"name":"worker","kind":"worker","entrypoint":{"args":["--interval-ms","100"]}},
                {"name":"batch","kind":"batch","entrypoint":{"args":["--interval-ms","100"]}}]}"#,
        )
        .unwrap()
    }

    /// Every kind that stops on request, on ports free right now
    pub fn graceful_kinds() -> ScenarioDescriptor {
        let (api, metrics, wrapped) = (Self::free_port(), Self::free_port(), Self::free_port());
        ScenarioDescriptor::from_json(&format!(
            r#"{{"id":"graceful","processes":[
                {{"name":"api","kind":"api","ports":[{{"number":{api}}}]}},
                {{"name":"metrics","kind":"metrics","ports":[{{"number":{metrics}}}]}},
                {{"name":"worker","kind":"worker","entrypoint":{{"args":["--interval-ms","100"]}}}},
                {{"name":"app","kind":"wrapped","ports":[{{"number":{wrapped}}}]}}]}}"#
        ))
        .unwrap()
    }

    /// Single api process bound to `port`
    pub fn api_on(port: u16) -> ScenarioDescriptor {
        ScenarioDescriptor::from_json(&format!(
            r#"{{"id":"api-only","processes":[{{"name":"api","kind":"api","ports":[{{"number":{port}}}]}}]}}"#
        ))
        .unwrap()
    }
}
