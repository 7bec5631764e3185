//! Per-kind runtime adapters

pub mod api;
pub mod batch;
pub mod http;
pub mod metrics;
pub mod worker;
pub mod wrapped;

use shared::ProcessKind;

use crate::traits::RuntimeAdapter;

pub use api::ApiAdapter;
pub use batch::BatchAdapter;
pub use metrics::MetricsAdapter;
pub use worker::WorkerAdapter;
pub use wrapped::WrappedAdapter;

/// Adapter implementing the behavior of `kind`
pub fn adapter_for(kind: ProcessKind) -> Box<dyn RuntimeAdapter> {
    match kind {
        ProcessKind::Api => Box::new(ApiAdapter),
        ProcessKind::Metrics => Box::new(MetricsAdapter),
        ProcessKind::Worker => Box::new(WorkerAdapter),
        ProcessKind::Batch => Box::new(BatchAdapter),
        ProcessKind::Wrapped => Box::new(WrappedAdapter),
    }
}
