//! `ProcessPool` con el binario real.

use bdp_core::{FailurePolicy, Job, LocalRunnerFactory, RunOptions};
use bdp_pool::{process_factory, PoolConfig};
use bdp_stages::{Count, Even, ListChunk, ListItems, Sort, Square, Sum};
use serde_json::json;

fn config() -> PoolConfig {
    PoolConfig::default().with_max_processes(3)
                         .with_worker(env!("CARGO_BIN_EXE_bdp-worker"), Vec::new())
}

fn ctx() -> serde_json::Value {
    json!({"list": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]})
}

#[test]
fn processes_match_local_runner() {
    let job = Job::new().pre_process(ListChunk::default())
                        .retrieve(ListItems::default())
                        .filter(Even)
                        .map(Square)
                        .reduce(Sum, 0);
    let remote = job.run(&process_factory(config()), ctx(), 3).unwrap();
    let local = job.run(&LocalRunnerFactory, ctx(), 3).unwrap();
    assert_eq!(remote.value, json!(220));
    assert_eq!(remote.value, local.value);
    assert!(remote.is_complete());
}

#[test]
fn more_parts_than_items() {
    let job = Job::new().pre_process(ListChunk::default()).retrieve(ListItems::default()).reduce(Count, 0);
    let out = job.run(&process_factory(config()), json!({"list": ["a", "b"]}), 4).unwrap();
    assert_eq!(out.value, json!(2));
    assert_eq!(out.completed.len(), 4);
}

#[test]
fn append_and_sort_across_processes() {
    let job = Job::new().pre_process(ListChunk::balanced())
                        .retrieve(ListItems::default())
                        .post_process(Sort);
    let out = job.run(&process_factory(config()), ctx(), 4).unwrap();
    assert_eq!(out.value, json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));
}

#[test]
fn stage_failure_in_worker_is_partition_failure() {
    let job = Job::new().pre_process(ListChunk::default())
                        .retrieve(ListItems::default())
                        .reduce(Sum, 0);
    let ctx = json!({"list": [1, 2, "three", 4]});
    assert!(job.run(&process_factory(config()), ctx.clone(), 2).is_err());

    let opts = RunOptions::default().with_failure_policy(FailurePolicy::BestEffort);
    let out = job.run_with_options(&process_factory(config()), ctx, 2, &opts).unwrap();
    assert_eq!(out.value, json!(3));
    assert_eq!(out.failed[0].part, 1);
}
