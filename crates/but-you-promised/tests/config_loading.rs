//! Configuration loaded from files and validated at call time.

mod common;

use but_you_promised::prelude::*;
use common::{Recorder, millis};
use rstest::rstest;
use tokio_test::assert_err;

#[tokio::test(start_paused = true)]
async fn test_json_options_drive_the_wrapper() {
    let options: RetryOptions = serde_json::from_str(
        r#"{
            "giveUpAfterAttempt": 3,
            "backOffSeedDelayInMs": 200,
            "backOff": { "kind": "linear" },
            "triesRemaining": 99,
            "data": { "test": "hello" }
        }"#,
    )
    .unwrap();

    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |_: ()| {
            calls.record(&());
            async { Err::<(), _>("nope") }
        },
        options,
    );

    assert_err!(retrying.call(()).await);

    assert_eq!(millis(&recorder.offsets()), vec![0, 200, 600]);
}

#[tokio::test(start_paused = true)]
async fn test_toml_options_drive_the_wrapper() {
    let options: RetryOptions = toml::from_str(
        r#"
        giveUpAfterAttempt = 2
        backOffSeedDelayInMs = 50
        unrelated = "ignored"
        "#,
    )
    .unwrap();

    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |_: ()| {
            calls.record(&());
            async { Err::<(), _>("nope") }
        },
        options,
    );

    let err = assert_err!(retrying.call(()).await);

    assert_eq!(err.attempts(), 2);
    assert_eq!(millis(&recorder.offsets()), vec![0, 50]);
}

#[test]
fn test_options_round_trip_through_json_keys() {
    let json = serde_json::to_value(RetryOptions::default()).unwrap();

    assert_eq!(json["attemptsSoFar"], 0);
    assert_eq!(json["backOffSeedDelayInMs"], 1000);
    assert_eq!(json["giveUpAfterAttempt"], 5);
    assert_eq!(json["backOff"]["kind"], "quadratic");
}

#[rstest]
#[case::zero_ceiling(
    RetryOptions { give_up_after_attempt: 0, ..RetryOptions::default() },
    ConfigError::ZeroAttemptCeiling
)]
#[case::counter_at_ceiling(
    RetryOptions { attempts_so_far: 5, ..RetryOptions::default() },
    ConfigError::CounterAtCeiling { attempts_so_far: 5, give_up_after_attempt: 5 }
)]
#[case::jitter_out_of_range(
    RetryOptions { jitter: 2.0, ..RetryOptions::default() },
    ConfigError::InvalidJitter(2.0)
)]
#[case::negative_multiplier(
    RetryOptions { back_off: BackOff::Exponential { multiplier: -2.0 }, ..RetryOptions::default() },
    ConfigError::InvalidMultiplier(-2.0)
)]
#[case::infinite_multiplier(
    RetryOptions { back_off: BackOff::Exponential { multiplier: f64::INFINITY }, ..RetryOptions::default() },
    ConfigError::InvalidMultiplier(f64::INFINITY)
)]
#[tokio::test]
async fn test_invalid_options_fail_at_call_time(
    #[case] options: RetryOptions,
    #[case] expected: ConfigError,
) {
    let recorder = Recorder::new();
    let calls = recorder.clone();

    // Wrapping succeeds; the problem surfaces when the wrapper is called.
    let retrying = wrap_with(
        move |_: ()| {
            calls.record(&());
            async { Ok::<_, String>(()) }
        },
        options,
    );

    let err = assert_err!(retrying.call(()).await);

    assert_eq!(err.config(), Some(&expected));
    assert!(err.parameter().is_none());
    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn test_counter_at_ceiling_is_not_reported_as_uncallable() {
    let retrying = wrap_with(
        |_: ()| async { Ok::<_, String>(()) },
        RetryConfig::builder().attempts_so_far(5).build(),
    );

    let err = assert_err!(retrying.call(()).await);

    assert!(matches!(err, RetryError::InvalidConfig(_)));
    assert!(!matches!(err, RetryError::Parameter(_)));
    assert_eq!(err.attempts(), 0);
}

#[tokio::test]
async fn test_nan_multiplier_from_toml_fails_at_call_time() {
    let options: RetryOptions = toml::from_str(
        r#"
        [backOff]
        kind = "exponential"
        multiplier = nan
        "#,
    )
    .unwrap();

    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |_: ()| {
            calls.record(&());
            async { Err::<(), _>("nope") }
        },
        options,
    );

    let err = assert_err!(retrying.call(()).await);

    assert!(matches!(err.config(), Some(ConfigError::InvalidMultiplier(m)) if m.is_nan()));
    assert_eq!(recorder.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_starting_counter_shrinks_the_budget() {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |_: ()| {
            calls.record(&());
            async { Err::<(), _>("nope") }
        },
        RetryConfig::builder().attempts_so_far(3).build(),
    );

    let err = assert_err!(retrying.call(()).await);

    // Attempts 4 and 5 only; the first wait uses n = 4.
    assert_eq!(recorder.count(), 2);
    assert_eq!(err.attempts(), 5);
    assert_eq!(millis(&recorder.offsets()), vec![0, 16_000]);
}
