//! Attempt counting, argument forwarding and outcome propagation.

mod common;

use but_you_promised::prelude::*;
use common::Recorder;
use rstest::rstest;
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};

fn no_delay() -> RetryOptions {
    RetryOptions {
        back_off_seed_delay_in_ms: 0,
        ..RetryOptions::default()
    }
}

#[rstest]
#[case::number(json!(7), "number")]
#[case::string(json!("not a function"), "string")]
#[case::object(json!({ "test": "hello" }), "object")]
#[case::array(json!([1, 2, 3]), "array")]
#[case::boolean(json!(true), "boolean")]
#[case::null(Value::Null, "null")]
#[tokio::test]
async fn test_non_callable_resolves_with_parameter_error(
    #[case] value: Value,
    #[case] received: &str,
) {
    common::init_tracing();
    let retrying = wrap_value::<(), (), Failure>(&value, RetryConfig::default());

    let err = assert_err!(retrying.call(()).await);

    assert!(!err.is_exhausted());
    assert_eq!(
        err.parameter(),
        Some(&ParameterError::NotCallable {
            received: received.to_string()
        })
    );
    assert!(err.to_string().contains(received));
}

#[tokio::test]
async fn test_wrapping_never_fails_and_every_call_reports() {
    let retrying = wrap_operation::<fn(()) -> std::future::Ready<Result<(), String>>, _, _>(
        Operation::not_callable("undefined"),
        RetryConfig::default(),
    );

    for _ in 0..3 {
        let err = assert_err!(retrying.call(()).await);
        assert_eq!(
            err.to_string(),
            "the operation should be callable, but it was type undefined"
        );
    }
}

#[tokio::test]
async fn test_always_succeeding_operation_is_called_once() {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap(move |x: u32| {
        calls.record(&x);
        async move { Ok::<_, Failure>(x * 2) }
    });

    let value = assert_ok!(retrying.call(21).await);

    assert_eq!(value, 42);
    assert_eq!(recorder.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_operation_is_called_five_times_by_default() {
    common::init_tracing();
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap(move |_: ()| {
        let attempt = calls.record(&());
        async move { Err::<(), _>(format!("failure #{attempt}")) }
    });

    let err = assert_err!(retrying.call(()).await);

    assert_eq!(recorder.count(), 5);
    assert_eq!(err.attempts(), 5);
    assert_eq!(err.into_reason().as_deref(), Some("failure #5"));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(10)]
#[tokio::test(start_paused = true)]
async fn test_give_up_after_attempt_is_honoured(#[case] ceiling: u32) {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |_: ()| {
            calls.record(&());
            async { Err::<(), _>(Failure::from("nope")) }
        },
        RetryConfig::builder().give_up_after_attempt(ceiling).build(),
    );

    let err = assert_err!(retrying.call(()).await);

    assert_eq!(recorder.count(), ceiling);
    assert_eq!(err.attempts(), ceiling);
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_once_operation_recovers() {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap(move |_: ()| {
        let attempt = calls.record(&());
        async move {
            if attempt < 3 {
                Err(std::io::Error::other("transient"))
            } else {
                Ok("recovered")
            }
        }
    });

    assert_eq!(assert_ok!(retrying.call(()).await), "recovered");
    assert_eq!(recorder.count(), 3);
}

#[tokio::test]
async fn test_arguments_are_forwarded_identically_on_every_attempt() {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |args: (String, Value)| {
            calls.record(&args);
            async { Err::<(), _>("still failing") }
        },
        no_delay(),
    );

    let args = ("hello".to_string(), json!({ "test": "hello" }));
    assert_err!(retrying.call(args.clone()).await);

    let seen = recorder.args();
    assert_eq!(seen.len(), 5);
    assert!(seen.iter().all(|seen| *seen == args));
}

#[tokio::test]
async fn test_bare_string_failures_are_retried_and_surfaced_unchanged() {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |_: ()| {
            calls.record(&());
            async { Err::<u8, _>("just a string") }
        },
        no_delay(),
    );

    let err = assert_err!(retrying.call(()).await);

    assert_eq!(recorder.count(), 5);
    assert_eq!(err.reason(), Some(&"just a string"));
}

#[tokio::test]
async fn test_unit_failures_count_like_any_other() {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |_: ()| {
            calls.record(&());
            async { Err::<u8, ()>(()) }
        },
        no_delay(),
    );

    let err = assert_err!(retrying.call(()).await);

    assert_eq!(recorder.count(), 5);
    assert_eq!(err.into_reason(), Some(()));
}

#[tokio::test]
async fn test_mixed_failure_kinds_through_failure_type() {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |_: ()| {
            let attempt = calls.record(&());
            async move {
                if attempt % 2 == 1 {
                    Err::<(), _>(Failure::error(std::io::Error::other("io")))
                } else {
                    Err(Failure::value(json!({ "status": 503 })))
                }
            }
        },
        no_delay(),
    );

    let err = assert_err!(retrying.call(()).await);

    assert_eq!(recorder.count(), 5);
    let reason = err.reason().unwrap();
    assert!(reason.is_error());
    assert_eq!(reason.to_string(), "io");
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_keep_independent_counters() {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |who: &'static str| {
            calls.record(&who);
            let attempts_for_who = calls.args().iter().filter(|seen| **seen == who).count();
            async move {
                match who {
                    "flaky" if attempts_for_who >= 3 => Ok(attempts_for_who),
                    _ => Err(Failure::from(format!("{who} failed"))),
                }
            }
        },
        RetryConfig::builder().give_up_after_attempt(4).build(),
    );

    let (broken, flaky) = tokio::join!(retrying.call("broken"), retrying.call("flaky"));

    let broken = assert_err!(broken);
    assert_eq!(broken.attempts(), 4);
    assert_eq!(assert_ok!(flaky), 3);

    let args = recorder.args();
    assert_eq!(args.iter().filter(|who| **who == "broken").count(), 4);
    assert_eq!(args.iter().filter(|who| **who == "flaky").count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_clones_can_run_on_spawned_tasks() {
    let recorder = Recorder::new();
    let calls = recorder.clone();
    let retrying = wrap_with(
        move |id: u32| {
            calls.record(&id);
            async move { Err::<(), _>(id) }
        },
        RetryConfig::builder().give_up_after_attempt(2).build(),
    );

    let handles: Vec<_> = (0..4)
        .map(|id| {
            let retrying = retrying.clone();
            tokio::spawn(async move { retrying.call(id).await })
        })
        .collect();

    for (id, handle) in handles.into_iter().enumerate() {
        let err = assert_err!(handle.await.unwrap());
        assert_eq!(err.attempts(), 2);
        assert_eq!(err.into_reason(), Some(id as u32));
    }
    assert_eq!(recorder.count(), 8);
}
