//! Escenarios de extremo a extremo con `run_job` y la configuración de la app.

use std::collections::HashMap;

use bdp_core::{Job, JobError};
use bdp_rust::{run_job, AppConfig, AppError, RunnerKind};
use bdp_stages::{Even, ListChunk, ListItems, Square, Sum};
use serde_json::{json, Value};

fn config(vars: &[(&str, &str)]) -> AppConfig {
    let vars: HashMap<&str, &str> = vars.iter().copied().collect();
    AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).expect("config")
}

fn one_to_ten() -> Value {
    json!({"list": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]})
}

fn list_job() -> Job {
    Job::new().pre_process(ListChunk::default()).retrieve(ListItems::default())
}

#[test]
fn sum_scenario_on_every_in_process_runner() {
    for runner in ["local", "threads"] {
        let cfg = config(&[("BDP_RUNNER", runner), ("BDP_MAX_PROCESSES", "2")]);
        let out = run_job(&cfg, &list_job().reduce(Sum, 0), one_to_ten(), 3).unwrap();
        assert_eq!(out.value, json!(55), "runner={runner}");
    }
}

#[test]
fn even_squares_agree_between_runners() {
    let job = list_job().filter(Even).map(Square).reduce(Sum, 0);
    let local = run_job(&config(&[]), &job, one_to_ten(), 3).unwrap();
    let threads = run_job(&config(&[("BDP_RUNNER", "threads")]), &job, one_to_ten(), 3).unwrap();
    assert_eq!(local.value, json!(220));
    assert_eq!(local.value, threads.value);
    assert_eq!(local.chain_fingerprint, threads.chain_fingerprint);
    assert_ne!(local.run_id, threads.run_id);
}

#[test]
fn failure_policy_comes_from_config() {
    let job = list_job().reduce(Sum, 0);
    let ctx = json!({"list": [1, 2, 3, "x"]});

    let err = run_job(&config(&[("BDP_RUNNER", "threads")]), &job, ctx.clone(), 2).unwrap_err();
    assert!(matches!(err, AppError::Job(JobError::PartFailed { part: 1, .. })));

    let cfg = config(&[("BDP_RUNNER", "threads"), ("BDP_FAILURE_POLICY", "best-effort")]);
    let out = run_job(&cfg, &job, ctx, 2).unwrap();
    assert_eq!(out.value, json!(3));
    assert!(!out.is_complete());
}

#[test]
fn zero_parts_is_reported_as_job_configuration_error() {
    let err = run_job(&config(&[]), &list_job(), one_to_ten(), 0).unwrap_err();
    assert!(matches!(err, AppError::Job(JobError::Configuration(_))));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn unknown_runner_is_rejected() {
    let err = AppConfig::from_lookup(|name| (name == "BDP_RUNNER").then(|| "cluster".to_string())).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert_eq!(config(&[]).runner, RunnerKind::Local);
}
