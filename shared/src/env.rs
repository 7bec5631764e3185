//! Well-known environment variables consumed by mock processes, with defaults

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const REDIS_URL: &str = "REDIS_URL";
pub const API_PORT: &str = "API_PORT";
pub const METRICS_PORT: &str = "METRICS_PORT";
pub const WORKER_CONCURRENCY: &str = "WORKER_CONCURRENCY";
pub const APP_CONFIG_PATH: &str = "APP_CONFIG_PATH";
pub const BATCH_INPUT_DIR: &str = "BATCH_INPUT_DIR";
pub const BATCH_OUTPUT_DIR: &str = "BATCH_OUTPUT_DIR";
pub const LOG_LEVEL: &str = "LOG_LEVEL";

pub const NOT_SET: &str = "not set";
pub const DEFAULT_API_PORT: u16 = 8080;
pub const DEFAULT_METRICS_PORT: u16 = 8081;
pub const DEFAULT_WORKER_CONCURRENCY: usize = 1;
pub const DEFAULT_BATCH_INPUT_DIR: &str = "/data/input";
pub const DEFAULT_BATCH_OUTPUT_DIR: &str = "/data/output";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Variables whose values are connection strings and must be redacted in traces
pub const SECRET_VARS: [&str; 2] = [DATABASE_URL, REDIS_URL];

/// Default value of a well-known variable, rendered as text
pub fn default_value(name: &str) -> Option<String> {
    let value = match name {
        DATABASE_URL | REDIS_URL | APP_CONFIG_PATH => NOT_SET.to_string(),
        API_PORT => DEFAULT_API_PORT.to_string(),
        METRICS_PORT => DEFAULT_METRICS_PORT.to_string(),
        WORKER_CONCURRENCY => DEFAULT_WORKER_CONCURRENCY.to_string(),
        BATCH_INPUT_DIR => DEFAULT_BATCH_INPUT_DIR.to_string(),
        BATCH_OUTPUT_DIR => DEFAULT_BATCH_OUTPUT_DIR.to_string(),
        LOG_LEVEL => DEFAULT_LOG_LEVEL.to_string(),
        _ => return None,
    };
    Some(value)
}

pub fn is_secret(name: &str) -> bool {
    SECRET_VARS.contains(&name)
}
