//! End-to-end: record through containers, post-process, encode.

use algotrace_core::{TraceError, Value};
use algotrace_log::{Encoder, EncoderConfig, StateLog};
use algotrace_replay::{export, post_process, ProcessorConfig};
use algotrace_structs::{Array, Instrumented, Map, Stack, Text, Vector};
use serde_json::{json, Value as JsonValue};

fn document(log: &StateLog) -> JsonValue {
    let text = export(log, &Encoder::default(), &ProcessorConfig::default()).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_declare_is_first_record() {
    let log = StateLog::new();
    let arr = Array::new("arr", &log, vec![3, 1, 2], "").unwrap();
    arr.get(0, "").unwrap();
    let records = log.records();
    let first = records.get(0).unwrap();
    assert_eq!(first.kind(), "array_declare");
    assert_eq!(first.field("id"), Some(&Value::from(arr.id().to_string())));
}

#[test]
fn test_snapshots_are_isolated() {
    let log = StateLog::new();
    let mut v = Vector::new("v", &log, vec![1, 2], "").unwrap();
    let before = log.records();
    v.set(0, 9, "").unwrap();
    v.push(3, "").unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before.get(0).unwrap().field("body"), Some(&Value::from(vec![1, 2])));
    let after = log.records();
    assert_eq!(after.get(1).unwrap().field("body"), Some(&Value::from(vec![9, 2])));
    assert_eq!(after.get(2).unwrap().field("body"), Some(&Value::from(vec![9, 2, 3])));
}

#[test]
fn test_autoplay_grouping() {
    let log = StateLog::new();
    let arr = Array::new("arr", &log, vec![1, 2], "").unwrap();
    arr.get(0, "").unwrap();
    log.add_comment("looked at the first element").unwrap();
    arr.get(1, "").unwrap();
    let trace = post_process(log.seal());
    let flags: Vec<bool> = trace.records().iter().map(|r| r.autoplay()).collect();
    assert_eq!(flags, vec![false, true, false, false]);
}

#[test]
fn test_array_swap_scenario() {
    let log = StateLog::new();
    let mut arr = Array::new("arr", &log, vec![vec![1, 2, 3], vec![4, 5, 6]], "").unwrap();
    arr.swap((0, 2), (1, 2), "swapping column ends").unwrap();
    let doc = document(&log);
    let last = doc.as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["state_type"], json!("array_swap"));
    assert_eq!(last["state_def"]["body"], json!([[1, 2, 6], [4, 5, 3]]));
    assert_eq!(last["state_def"]["index1"], json!([0, 2]));
    assert_eq!(last["state_def"]["index2"], json!([1, 2]));
    assert_eq!(last["comments"], json!("swapping column ends"));
    assert_eq!(last["autoplay"], json!(false));
}

#[test]
fn test_empty_stack_pop_leaves_log() {
    let log = StateLog::new();
    let mut stack = Stack::new("st", &log, "").unwrap();
    let before = log.len();
    let err = stack.pop("").unwrap_err();
    assert!(matches!(err, TraceError::EmptyContainer { .. }));
    assert_eq!(log.len(), before);
}

#[test]
fn test_map_with_container_key() {
    let log = StateLog::new();
    let mut map = Map::new("m", &log, "").unwrap();
    let key = Text::new("s", &log, "hi", "").unwrap();
    map.set("abcd", 123, "").unwrap();
    map.set(2, "hello", "").unwrap();
    map.set(&key, 456, "").unwrap();
    assert_eq!(map.get(&key, "").unwrap(), Value::Int(456));
    let doc = document(&log);
    let records = doc.as_array().unwrap();
    let token = format!("$Toolkit.String:{}", key.id());

    let set = &records[records.len() - 2];
    assert_eq!(set["state_type"], json!("map_set"));
    let mut expected = json!({"abcd": 123, "2": "hello"});
    expected[token.as_str()] = json!(456);
    assert_eq!(set["state_def"]["body"], expected);
    let keys: Vec<&String> = set["state_def"]["body"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["abcd", "2", token.as_str()]);
    assert_eq!(set["state_def"]["key"], json!(token));

    let get = records.last().unwrap();
    assert_eq!(get["state_type"], json!("map_get"));
    assert_eq!(get["state_def"]["key"], json!(token));
    assert_eq!(get["state_def"]["value"], json!(456));
}

#[test]
fn test_colliding_map_keys_fail_export() {
    let log = StateLog::new();
    let mut map = Map::new("m", &log, "").unwrap();
    map.set(1, "a", "").unwrap();
    map.set(1.0, "b", "").unwrap();
    assert_eq!(map.len(), 1);
    map.set("1", "c", "").unwrap();
    assert_eq!(map.len(), 2);
    let result = export(&log, &Encoder::default(), &ProcessorConfig::default());
    assert!(matches!(result, Err(TraceError::UnencodableType { .. })));
}

#[test]
fn test_nested_container_encodes_as_token() {
    let log = StateLog::new();
    let inner = Stack::new("inner", &log, "").unwrap();
    let outer = Vector::new("outer", &log, vec![Value::from(&inner)], "").unwrap();
    let encoder = Encoder::new(EncoderConfig {
        namespace: "ARgorithmToolkit".to_string(),
        pretty: false,
    });
    let text = export(&log, &encoder, &ProcessorConfig::default()).unwrap();
    let doc: JsonValue = serde_json::from_str(&text).unwrap();
    let token = format!("$ARgorithmToolkit.Stack:{}", inner.id());
    assert_eq!(doc[1]["state_def"]["body"], json!([token]));
    assert_ne!(inner.id(), outer.id());
}

#[test]
fn test_reference_rendering_is_deterministic() {
    let log = StateLog::new();
    let s = Text::new("s", &log, "abc", "").unwrap();
    let encoder = Encoder::default();
    let a = encoder.token(&s.reference());
    let b = encoder.token(&s.reference());
    assert_eq!(a, b);
}

#[test]
fn test_override_from_config() {
    let log = StateLog::new();
    let mut stack = Stack::new("st", &log, "").unwrap();
    stack.push(1, "").unwrap();
    let config = ProcessorConfig {
        autoplay: Some(true),
    };
    let text = export(&log, &Encoder::default(), &config).unwrap();
    let doc: JsonValue = serde_json::from_str(&text).unwrap();
    assert!(doc
        .as_array()
        .unwrap()
        .iter()
        .all(|record| record["autoplay"] == json!(true)));
}

#[test]
fn test_sealed_log_refuses_new_containers() {
    let log = StateLog::new();
    let _ = document(&log);
    let result = Stack::new("late", &log, "");
    assert!(matches!(result, Err(TraceError::Binding { .. })));
}
