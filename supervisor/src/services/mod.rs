//! Service implementations
//!
//! Real implementations of the launcher traits that perform actual process I/O.

pub mod process_launcher;
pub mod process_output_handler;

pub use process_launcher::{RealChildProcess, RealProcessLauncher, exit_code};
pub use process_output_handler::TraceBuffer;
