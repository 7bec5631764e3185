//! Helper to handle child process stdout/stderr output
//!
//! Both pipes are always consumed so a chatty child never blocks on a full
//! pipe. Lines are kept in a bounded per-process [`TraceBuffer`] and
//! forwarded at debug level. The first readiness marker on stdout resolves
//! the process's [`ReadySignal`](crate::traits::ReadySignal).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::oneshot;

use shared::{ProcessId, ReadyReport, SharedResult, process_debug};

use crate::traits::ReadySignal;

pub const DEFAULT_TRACE_CAPACITY: usize = 512;

/// Bounded, shareable log of a child's output lines (oldest dropped first)
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl TraceBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_TRACE_CAPACITY)))),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        let lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.iter().cloned().collect()
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_CAPACITY)
    }
}

/// Spawn consumers for the piped stdout/stderr of `child`
pub fn spawn_output_consumers(child: &mut Child, process_name: &str, trace: &TraceBuffer) -> ReadySignal {
    let (ready_tx, ready_rx) = oneshot::channel();

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(consume_stdout(stdout, process_name.to_string(), trace.clone(), ready_tx));
    }

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(consume_lines(stderr, process_name.to_string(), trace.clone()));
    }

    ready_rx
}

/// Record stdout lines, resolving `ready` on the first marker
pub async fn consume_stdout<R>(
    stdout: R,
    process_name: String,
    trace: TraceBuffer,
    ready: oneshot::Sender<SharedResult<ReadyReport>>,
) where
    R: AsyncRead + Unpin,
{
    let mut ready = Some(ready);
    let mut lines = BufReader::new(stdout).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        process_debug!(ProcessId::current(), "[{}] {}", process_name, line);
        if ready.is_some() {
            if let Some(outcome) = ReadyReport::parse_line(&line).transpose() {
                if let Some(sender) = ready.take() {
                    let _ = sender.send(outcome);
                }
            }
        }
        trace.push(line);
    }
}

async fn consume_lines<R>(stream: R, process_name: String, trace: TraceBuffer)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        process_debug!(ProcessId::current(), "[{}] {}", process_name, line);
        trace.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_buffer_drops_oldest_lines() {
        let trace = TraceBuffer::new(2);
        trace.push("one");
        trace.push("two");
        trace.push("three");

        assert_eq!(trace.lines(), vec!["two", "three"]);
        assert!(!trace.lines().iter().any(|line| line == "one"));
    }

    #[tokio::test]
    async fn test_first_marker_resolves_readiness() {
        let output: &[u8] = b"booting\nHOSTSIM_READY {\"name\":\"api\",\"pid\":7,\"ports\":[8080]}\nserving\n";
        let trace = TraceBuffer::default();
        let (ready_tx, ready_rx) = oneshot::channel();

        consume_stdout(output, "api".to_string(), trace.clone(), ready_tx).await;

        let report = ready_rx.await.unwrap().unwrap();
        assert_eq!(report.ports, vec![8080]);
        assert_eq!(trace.lines().len(), 3);
        assert!(trace.lines().iter().any(|line| line.contains("serving")));
    }

    #[tokio::test]
    async fn test_stdout_closing_without_marker_drops_sender() {
        let output: &[u8] = b"no marker here\n";
        let (ready_tx, ready_rx) = oneshot::channel();

        consume_stdout(output, "worker".to_string(), TraceBuffer::default(), ready_tx).await;

        assert!(ready_rx.await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_marker_is_reported() {
        let output: &[u8] = b"HOSTSIM_READY not-json\n";
        let (ready_tx, ready_rx) = oneshot::channel();

        consume_stdout(output, "api".to_string(), TraceBuffer::default(), ready_tx).await;

        assert!(ready_rx.await.unwrap().is_err());
    }
}
