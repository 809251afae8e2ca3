//! Example: wrapping an unreliable async call with retry behaviour
//!
//! This example demonstrates:
//! 1. Quadratic back-off with a small seed
//! 2. Outcome hooks (validate successes, recover from some failures)
//! 3. Jitter impact (run multiple times to see variance)
//! 4. Options loaded from JSON
//!
//! Run with:
//! ```bash
//! RUST_LOG=but_you_promised=debug cargo run -p but-you-promised --example retry_example
//! ```

use but_you_promised::prelude::*;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// A simulated API that fails the first few times
#[derive(Clone)]
struct UnreliableApi {
    attempts: Arc<AtomicU32>,
    fail_count: u32,
}

impl UnreliableApi {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_count,
        }
    }

    async fn call(&self, path: &str) -> Result<String, Failure> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.fail_count {
            println!("  Attempt {}: FAILED (simulating transient error)", attempt + 1);
            Err(Failure::error(std::io::Error::other(format!(
                "Transient error on attempt {}",
                attempt + 1
            ))))
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok(format!("GET {path} -> 200"))
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Example 1: Quadratic back-off
async fn example_simple_retry() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Quadratic Back-off ===\n");

    let api = UnreliableApi::new(2); // Fail first 2 attempts
    let client = api.clone();

    let fetch = wrap_with(
        move |path: &'static str| {
            let client = client.clone();
            async move { client.call(path).await }
        },
        RetryConfig::builder()
            .back_off_seed_delay(Duration::from_millis(100))
            .build(),
    )
    .named("fetch");

    println!("Calling unreliable API (will fail 2 times before succeeding)...");
    let start = Instant::now();
    let result = fetch.call("/users/7").await?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: 0ms (attempt 1) + 100ms + 400ms = ~500ms");

    Ok(())
}

/// Example 2: Outcome hooks
async fn example_hooks() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Outcome Hooks ===\n");

    // Treat empty bodies as failures, and serve a fallback once the upstream
    // reports that the record is gone.
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&attempts);
    let lookup = wrap_with(
        move |id: u32| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                match attempt {
                    1 => Ok(String::new()),
                    2 => Err(Failure::from("503 unavailable")),
                    _ => Err(Failure::from(format!("404 record {id} gone"))),
                }
            }
        },
        RetryConfig::<String, Failure>::builder()
            .back_off_seed_delay(Duration::from_millis(10))
            .on_fulfilled(|body: String| async move {
                if body.is_empty() {
                    println!("  Empty body, failing the attempt");
                    Err(Failure::from("empty body"))
                } else {
                    Ok(body)
                }
            })
            .on_rejected(|reason: Failure| async move {
                println!("  Rejected: {}", reason);
                if reason.to_string().starts_with("404") {
                    Ok("fallback record".to_string())
                } else {
                    Err(reason)
                }
            })
            .build(),
    );

    let result = lookup.call(42).await?;
    println!("\nResult: {}", result);
    println!("Total attempts: {}", attempts.load(Ordering::SeqCst));

    Ok(())
}

/// Example 3: Jitter demonstration
async fn example_jitter_impact() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Jitter Impact (Run 10 Times) ===\n");

    async fn timed_run(jitter: f64) -> Duration {
        let api = UnreliableApi::new(1);
        let fetch = wrap_with(
            move |path: &'static str| {
                let api = api.clone();
                async move { api.call(path).await }
            },
            RetryConfig::builder()
                .back_off_seed_delay(Duration::from_millis(100))
                .jitter(jitter)
                .build(),
        );

        let start = Instant::now();
        let _ = fetch.call("/health").await;
        start.elapsed()
    }

    let mut delays_no_jitter = Vec::new();
    let mut delays_with_jitter = Vec::new();
    for _ in 0..10 {
        delays_no_jitter.push(timed_run(0.0).await);
        delays_with_jitter.push(timed_run(0.3).await);
    }

    println!("\nAnalysis:");
    println!("  No jitter: All delays should be very similar (~100ms)");
    println!("  With jitter: Delays should vary (70-130ms range)");

    let average = |delays: &[Duration]| {
        delays.iter().map(|d| d.as_millis() as f64).sum::<f64>() / delays.len() as f64
    };

    println!("  Average without jitter: {:.1}ms", average(&delays_no_jitter));
    println!("  Average with jitter: {:.1}ms", average(&delays_with_jitter));

    Ok(())
}

/// Example 4: Options from a configuration file
async fn example_options_from_json() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 4: Options From JSON ===\n");

    let options: RetryOptions = serde_json::from_str(
        r#"{ "giveUpAfterAttempt": 3, "backOffSeedDelayInMs": 20, "backOff": { "kind": "constant" } }"#,
    )?;
    println!("Loaded: {:?}", options);

    let api = UnreliableApi::new(10); // Never recovers within the budget
    let fetch = wrap_with(
        move |path: &'static str| {
            let api = api.clone();
            async move { api.call(path).await }
        },
        options,
    );

    match fetch.call("/flaky").await {
        Ok(body) => println!("\nUnexpected success: {}", body),
        Err(err) => println!("\nGave up: {} (last failure: {:?})", err, err.reason()),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("==============================================");
    println!("   but-you-promised: Retry Examples");
    println!("==============================================");

    example_simple_retry().await?;
    example_hooks().await?;
    example_jitter_impact().await?;
    example_options_from_json().await?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
