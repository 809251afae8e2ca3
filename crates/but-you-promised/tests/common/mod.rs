//! Common test utilities and helpers

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Install a tracing subscriber once; `RUST_LOG` controls verbosity.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every invocation of an operation: its arguments and when it ran.
///
/// Times are offsets from the recorder's creation on the tokio clock, so
/// they are exact under `start_paused = true`.
#[derive(Clone)]
pub struct Recorder<A> {
    inner: Arc<Inner<A>>,
}

struct Inner<A> {
    started: Instant,
    calls: Mutex<Vec<(A, Duration)>>,
}

#[allow(dead_code)]
impl<A: Clone> Recorder<A> {
    /// Start recording; call inside the tokio runtime.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                started: Instant::now(),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Record a call and return its 1-based number.
    pub fn record(&self, args: &A) -> u32 {
        let mut calls = self.inner.calls.lock().unwrap();
        calls.push((args.clone(), self.inner.started.elapsed()));
        calls.len() as u32
    }

    /// Number of calls so far.
    pub fn count(&self) -> u32 {
        self.inner.calls.lock().unwrap().len() as u32
    }

    /// Arguments of every call, in order.
    pub fn args(&self) -> Vec<A> {
        let calls = self.inner.calls.lock().unwrap();
        calls.iter().map(|(args, _)| args.clone()).collect()
    }

    /// Offsets at which each call started.
    pub fn offsets(&self) -> Vec<Duration> {
        let calls = self.inner.calls.lock().unwrap();
        calls.iter().map(|(_, at)| *at).collect()
    }
}

/// Offsets in milliseconds, for readable assertions.
#[allow(dead_code)]
pub fn millis(offsets: &[Duration]) -> Vec<u128> {
    offsets.iter().map(Duration::as_millis).collect()
}
