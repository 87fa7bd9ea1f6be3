//! Quiet-window debouncing of query input
//!
//! A background task owns the timer. Each observed value restarts the quiet
//! window; when the window elapses the latest value is emitted once. Flushes
//! and blank values skip the window entirely.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

#[derive(Debug)]
enum Input {
    Observe(String),
    Flush(String),
}

/// Collapses bursts of values into a single downstream emission
#[derive(Debug)]
pub struct Debouncer {
    input: mpsc::UnboundedSender<Input>,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Start a debouncer that forwards settled values to `downstream`.
    ///
    /// Must be called inside a tokio runtime. The task stops when the
    /// debouncer or the downstream receiver is dropped; a value still
    /// pending at that point is discarded.
    pub fn spawn(window: Duration, downstream: mpsc::UnboundedSender<String>) -> Self {
        let (input, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(window, rx, downstream));
        Self { input, task }
    }

    /// Record a new value and restart the quiet window.
    ///
    /// Blank values are emitted immediately and cancel any pending value.
    pub fn observe(&self, value: impl Into<String>) {
        self.send(Input::Observe(value.into()));
    }

    /// Emit `value` now, discarding any pending value
    pub fn flush(&self, value: impl Into<String>) {
        self.send(Input::Flush(value.into()));
    }

    fn send(&self, input: Input) {
        if self.input.send(input).is_err() {
            debug!("debouncer task has stopped; input dropped");
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<Input>,
    downstream: mpsc::UnboundedSender<String>,
) {
    let mut pending: Option<String> = None;
    let mut deadline = Instant::now();

    loop {
        let emit = tokio::select! {
            input = rx.recv() => match input {
                None => break,
                Some(Input::Observe(value)) if value.trim().is_empty() => {
                    pending = None;
                    Some(value)
                }
                Some(Input::Observe(value)) => {
                    pending = Some(value);
                    deadline = Instant::now() + window;
                    None
                }
                Some(Input::Flush(value)) => {
                    pending = None;
                    Some(value)
                }
            },
            () = sleep_until(deadline), if pending.is_some() => pending.take(),
        };

        if let Some(value) = emit {
            if downstream.send(value).is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        let mut values = Vec::new();
        while let Ok(value) = rx.try_recv() {
            values.push(value);
        }
        values
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_value() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(WINDOW, tx);

        for i in 1..=20 {
            debouncer.observe(format!("query {i}"));
        }
        tokio::time::sleep(WINDOW * 2).await;

        assert_eq!(drain(&mut rx), vec!["query 20".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_value_restarts_window() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(WINDOW, tx);

        debouncer.observe("a");
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.observe("ap");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(drain(&mut rx), vec!["ap".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_emit_separately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(WINDOW, tx);

        debouncer.observe("apple");
        tokio::time::sleep(WINDOW * 2).await;
        debouncer.observe("micro");
        tokio::time::sleep(WINDOW * 2).await;

        assert_eq!(drain(&mut rx), vec!["apple".to_string(), "micro".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_bypasses_window() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(WINDOW, tx);

        debouncer.observe("typed");
        debouncer.flush("TSLA");
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(drain(&mut rx), vec!["TSLA".to_string()]);

        // the pending "typed" value was discarded by the flush
        tokio::time::sleep(WINDOW * 2).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_value_emits_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(WINDOW, tx);

        debouncer.observe("app");
        debouncer.observe("   ");
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(drain(&mut rx), vec!["   ".to_string()]);

        tokio::time::sleep(WINDOW * 2).await;
        assert!(drain(&mut rx).is_empty());
    }
}
