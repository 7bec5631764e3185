//! Mock process entry point
//!
//! Spawned by the supervisor's process launcher as
//! `mockproc <kind> --name <name> [--port N] [--interval-ms N]`.

use clap::Parser;

use ::mockproc::{MockArgs, RuntimeConfig};

#[tokio::main]
async fn main() {
    let args = MockArgs::parse();

    // Captured once; adapters never read the ambient environment
    let config = RuntimeConfig::from_vars(std::env::vars());

    let code = ::mockproc::run(args, config).await;
    std::process::exit(code);
}
