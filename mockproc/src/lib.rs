//! Mock workload processes for the host simulator
//!
//! Each [`ProcessKind`](shared::ProcessKind) is implemented by a
//! [`RuntimeAdapter`]; [`runtime::run`] is the process entrypoint.

pub mod adapters;
pub mod config;
pub mod error;
pub mod runtime;
pub mod signals;
pub mod traits;

pub use adapters::adapter_for;
pub use config::{RuntimeConfig, Setting, Source};
pub use error::{MockError, MockResult};
pub use runtime::{MockArgs, run};
pub use traits::{RuntimeAdapter, RuntimeContext, SignalPolicy};
