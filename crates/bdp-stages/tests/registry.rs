//! Reconstrucción de chains a partir de su descriptor con `registry()`.

use bdp_core::chain::{serialize, unserialize};
use bdp_core::{Job, LocalRunnerFactory, StageKind};
use bdp_stages::{registry, Even, ListChunk, ListItems, Offset, Square, Sum};
use serde_json::json;

#[test]
fn every_kind_has_library_stages() {
    let registry = registry();
    assert!(registry.keys(StageKind::PreProcess).contains(&"list.chunk"));
    assert!(registry.keys(StageKind::Retrieve).contains(&"range.stride"));
    assert!(registry.keys(StageKind::Filter).contains(&"num.even"));
    assert!(registry.keys(StageKind::Map).contains(&"json.pluck"));
    assert!(registry.keys(StageKind::Reduce).contains(&"num.sum_count"));
    assert!(registry.keys(StageKind::PostProcess).contains(&"num.mean"));
    // defaults del core
    assert!(registry.keys(StageKind::Reduce).contains(&"core.append"));
}

#[test]
fn rebuilt_chain_runs_like_the_built_one() {
    let job = Job::new().pre_process(ListChunk::balanced())
                        .retrieve(ListItems::default())
                        .filter(Even)
                        .map(Square)
                        .map(Offset { by: 1.0 })
                        .reduce(Sum, 0);
    let descriptor = serialize(job.chain()).unwrap();
    let rebuilt = Job::from_chain(unserialize(&descriptor, &registry()).unwrap());

    assert_eq!(serialize(rebuilt.chain()).unwrap(), descriptor);
    let ctx = json!({"list": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]});
    let a = job.run(&LocalRunnerFactory, ctx.clone(), 3).unwrap();
    let b = rebuilt.run(&LocalRunnerFactory, ctx, 3).unwrap();
    assert_eq!(a.value, json!(225));
    assert_eq!(a.value, b.value);
    assert_eq!(a.chain_fingerprint, b.chain_fingerprint);
}

#[test]
fn bad_params_are_reported_with_stage_key() {
    let mut descriptor = serialize(Job::new().map(Offset { by: 1.0 }).chain()).unwrap();
    descriptor.map[0].logic.params = json!({"by": "one"});
    let err = unserialize(&descriptor, &registry()).unwrap_err();
    assert!(err.to_string().contains("num.offset"), "{err}");
}
