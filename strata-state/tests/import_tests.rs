mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use strata_model::{EntityStore, RecordStore};
use strata_state::{Diagnostic, RecordingSink, StateConfig, StateContainer};

/// `stores` pairs each type with its whitespace-separated dependencies.
fn tracking_container(stores: &[(&str, &str)]) -> (StateContainer, RecordingSink, ImportLog) {
    let log = new_log();
    let (mut state, sink) = recording_container();
    for (name, deps) in stores {
        let deps: Vec<&str> = deps.split_whitespace().collect();
        state
            .add_store(Box::new(TrackingStore::new(name, &deps, &log)))
            .unwrap();
    }
    (state, sink, log)
}

// ── Dependency ordering ──────────────────────────────────────────

#[test]
fn dependency_imported_before_dependent() {
    let (mut state, sink, log) = tracking_container(&[("user", ""), ("comment", "user")]);
    state.import_state(json!({
        "comment": {"1": {"id": 1, "userId": 5}},
        "user": {"5": {"id": 5, "name": "A"}},
    }));

    assert_eq!(logged(&log), vec!["user", "comment"]);
    assert!(sink.is_empty());
}

#[test]
fn transitive_chain_imports_bottom_up() {
    let (mut state, _sink, log) = tracking_container(&[
        ("reaction", "comment"),
        ("comment", "post user"),
        ("post", "user"),
        ("user", ""),
    ]);
    state.import_state(json!({"reaction": {}, "comment": {}, "post": {}, "user": {}}));

    let order = logged(&log);
    let pos = |name: &str| order.iter().position(|t| t == name).unwrap();
    assert_eq!(order.len(), 4);
    assert!(pos("user") < pos("post"));
    assert!(pos("post") < pos("comment"));
    assert!(pos("comment") < pos("reaction"));
}

#[test]
fn dependencies_declared_in_other_casing_still_order() {
    let (mut state, _sink, log) = tracking_container(&[("user", ""), ("comment", "USER")]);
    state.import_state(json!({"Comment": {}, "User": {}}));
    assert_eq!(logged(&log), vec!["user", "comment"]);
}

#[test]
fn absent_dependency_is_tolerated() {
    let (mut state, sink, log) = tracking_container(&[("user", ""), ("comment", "user")]);
    state.import_state(json!({"comment": {"1": {"id": 1}}}));

    assert_eq!(logged(&log), vec!["comment"]);
    assert!(sink.is_empty());
}

#[test]
fn dependency_on_unregistered_type_is_tolerated() {
    let (mut state, sink, log) = tracking_container(&[("comment", "user")]);
    state.import_state(json!({"comment": {}}));
    assert_eq!(logged(&log), vec!["comment"]);
    assert!(sink.is_empty());
}

#[test]
fn null_payload_counts_as_absent() {
    let (mut state, _sink, log) = tracking_container(&[("user", ""), ("comment", "user")]);
    state.import_state(json!({"comment": {}, "user": null}));
    assert_eq!(logged(&log), vec!["comment"]);
}

#[test]
fn each_store_imported_once_per_snapshot() {
    let (mut state, _sink, log) =
        tracking_container(&[("user", ""), ("post", "user"), ("comment", "user post")]);
    state.import_state(json!({"comment": {}, "post": {}, "user": {}}));
    assert_eq!(logged(&log), vec!["user", "post", "comment"]);
}

// ── Cycles ───────────────────────────────────────────────────────

#[test]
fn cycle_terminates_and_is_reported() {
    let (mut state, sink, log) = tracking_container(&[("a", "b"), ("b", "a")]);
    state.import_state(json!({"a": {}, "b": {}}));

    let mut order = logged(&log);
    order.sort();
    assert_eq!(order, vec!["a", "b"]);
    assert_eq!(
        sink.diagnostics(),
        vec![Diagnostic::DependencyCycle { from: "b".to_string(), to: "a".to_string() }]
    );
}

#[test]
fn cycle_reporting_can_be_disabled() {
    let log = new_log();
    let sink = RecordingSink::new();
    let config = StateConfig {
        report_cycles: false,
        ..StateConfig::default()
    };
    let mut state = StateContainer::with_sink(config, Arc::new(sink.clone()));
    state.add_store(Box::new(TrackingStore::new("a", &["a"], &log))).unwrap();

    state.import_state(json!({"a": {}}));
    assert_eq!(logged(&log), vec!["a"]);
    assert!(sink.is_empty());
}

// ── Snapshot shapes ──────────────────────────────────────────────

#[test]
fn unregistered_snapshot_type_is_reported_and_skipped() {
    let (mut state, sink, log) = tracking_container(&[("user", "")]);
    state.import_state(json!({"ghost": {"1": {}}, "user": {}}));

    assert_eq!(logged(&log), vec!["user"]);
    assert_eq!(
        sink.diagnostics(),
        vec![Diagnostic::MissingStoreForImport { object_type: "ghost".to_string() }]
    );
}

#[test]
fn sequence_of_snapshots_imports_in_order() {
    let (mut state, _sink, log) = tracking_container(&[("user", ""), ("comment", "user")]);
    state.import_state(json!([{"comment": {}}, {"user": {}}]));
    assert_eq!(logged(&log), vec!["comment", "user"]);
}

#[test]
fn scalar_and_null_snapshots_are_ignored() {
    let (mut state, sink, log) = tracking_container(&[("user", "")]);
    state.import_state(json!(null));
    state.import_state(json!(7));
    state.import_state(json!([null, "user"]));
    assert!(logged(&log).is_empty());
    assert!(sink.is_empty());
}

#[test]
fn case_colliding_keys_resolve_deterministically() {
    let (mut state, _sink, log) = tracking_container(&[("user", "")]);
    // Iteration order is by key, so "user" follows "User" and wins.
    state.import_state(json!({"User": {"from": "upper"}, "user": {"from": "lower"}}));

    assert_eq!(logged(&log), vec!["user"]);
    assert_eq!(state.get("user", &[]), Some(json!({"from": "lower"})));
}

#[test]
fn rejected_payload_is_reported_and_rest_continues() {
    let (mut state, sink) = user_comment_container();
    state.import_state(json!({"comment": 5, "user": {"1": {"id": 1}}}));

    assert!(state.get("user", &[json!(1)]).is_some());
    assert!(matches!(
        &sink.diagnostics()[..],
        [Diagnostic::ImportRejected { object_type, .. }] if object_type == "comment"
    ));
}

// ── clear / export ───────────────────────────────────────────────

#[test]
fn clear_empties_supporting_stores_and_skips_others() {
    let log = new_log();
    let (mut state, _sink) = user_comment_container();
    state
        .add_store(Box::new(TrackingStore::new("audit", &[], &log)))
        .unwrap();
    state.import_state(json!({
        "user": {"1": {"id": 1}},
        "comment": {"2": {"id": 2}},
        "audit": {"kept": true},
    }));

    state.clear();

    assert_eq!(state.len(), 3);
    assert_eq!(state.get("user", &[json!(1)]), None);
    assert_eq!(state.get("audit", &[]), Some(json!({"kept": true})));
}

#[test]
fn to_json_uses_declared_casing() {
    let (mut state, _sink) = recording_container();
    state
        .add_store(Box::new(RecordStore::new(ty("BlogPost"))))
        .unwrap();
    state.apply_value(json!({"store": "blogpost", "type": "create", "id": 1, "title": "T"}));

    assert_eq!(state.to_json(), json!({"BlogPost": {"1": {"id": 1, "title": "T"}}}));
    assert_eq!(serde_json::to_value(&state).unwrap(), state.to_json());
}

#[test]
fn export_then_import_round_trips() {
    let (mut source, _sink) = user_comment_container();
    source.apply_value(json!([
        {"store": "user", "type": "create", "id": 5, "name": "A"},
        {"store": "comment", "type": "create", "id": 1, "userId": 5, "body": "hi"},
    ]));
    let snapshot = source.to_json();

    let (mut target, sink) = user_comment_container();
    target.apply_value(json!({"store": "user", "type": "create", "id": 99}));
    target.clear();
    target.import_state(snapshot.clone());

    assert_eq!(target.to_json(), snapshot);
    assert!(sink.is_empty());
}

#[test]
fn import_through_record_store_is_visible_via_typed_access() {
    let (mut state, _sink) = user_comment_container();
    state.import_state(json!({"user": [{"id": 5, "name": "A"}]}));
    let users = state.store_as::<RecordStore>("user").unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users.object_type().declared(), "user");
}

// ── Container notifications ──────────────────────────────────────

fn notifications(state: &mut StateContainer) -> Arc<Mutex<Vec<(String, Value)>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    state.add_listener(strata_model::ANY_EVENT, move |name, payload| {
        sink.lock().unwrap().push((name.to_string(), payload.clone()));
    });
    seen
}

#[test]
fn import_notifies_with_types_in_dependency_order() {
    let (mut state, _sink, _log) = tracking_container(&[("user", ""), ("comment", "user")]);
    let seen = notifications(&mut state);

    state.import_state(json!([
        {"comment": {"1": {"id": 1}}, "user": {"5": {"id": 5}}},
        null,
        {"user": {}},
    ]));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("import".to_string(), json!(["user", "comment"])),
            ("import".to_string(), json!(["user"])),
        ]
    );
}

#[test]
fn rejected_store_is_left_out_of_import_notification() {
    let (mut state, _sink) = user_comment_container();
    let seen = notifications(&mut state);

    state.import_state(json!({"user": "not records", "comment": {}}));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![("import".to_string(), json!(["comment"]))]
    );
}

#[test]
fn clear_notifies_container_listeners() {
    let (mut state, _sink) = user_comment_container();
    let seen = notifications(&mut state);
    state.clear();
    assert_eq!(*seen.lock().unwrap(), vec![("clear".to_string(), Value::Null)]);

    state.listeners_mut().clear_listeners();
    state.clear();
    assert_eq!(seen.lock().unwrap().len(), 1);
}
