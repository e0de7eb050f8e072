//! Live evaluation of persisted expressions.
//!
//! Each test loads an expression document, fills a cache the way the
//! telemetry reader would, and checks the evaluated value. Organized by
//! category:
//!   A. Arithmetic precedence
//!   B. Failures
//!   C. Telemetry into evaluation

use gizmo_core::persist::expression_from_json;
use gizmo_eval::{evaluate, DeviceLayout, EvalError, EvalOptions, FeedParser, LiveValue, LiveValueCache};
use serde_json::json;

// ──────────────────────────────────────────────
// Test helpers
// ──────────────────────────────────────────────

fn num(v: f64) -> serde_json::Value {
    json!({"type": "NUMBER", "value": {"value": v, "unit": "NUMBER"}})
}

fn op(name: &str) -> serde_json::Value {
    json!({"type": "OPERATOR", "value": name})
}

fn value(device: &str, property: &str) -> serde_json::Value {
    json!({"type": "VALUE", "value": {"device": device, "property": property}})
}

fn custom(terms: Vec<serde_json::Value>) -> serde_json::Value {
    json!({"type": "CUSTOM_NUMBER", "terms": terms})
}

fn eval_doc(doc: serde_json::Value, cache: &LiveValueCache) -> Result<LiveValue, EvalError> {
    let expression = expression_from_json(&doc).unwrap();
    evaluate(&expression, cache, &EvalOptions::default())
}

fn number(doc: serde_json::Value) -> f64 {
    match eval_doc(doc, &LiveValueCache::new()).unwrap() {
        LiveValue::Number(v) => v,
        other => panic!("expected a number, got {:?}", other),
    }
}

// ──────────────────────────────────────────────
// A. Arithmetic precedence
// ──────────────────────────────────────────────

#[test]
fn a01_multiplication_before_addition() {
    let doc = custom(vec![num(3.0), op("PLUS"), num(4.0), op("MULTIPLY"), num(2.0)]);
    assert_eq!(number(doc), 11.0);
}

#[test]
fn a02_parenthesised_sum() {
    let doc = custom(vec![
        op("OPEN_PARENTHESIS"),
        num(3.0),
        op("PLUS"),
        num(4.0),
        op("CLOSE_PARENTHESIS"),
        op("MULTIPLY"),
        num(2.0),
    ]);
    assert_eq!(number(doc), 14.0);
}

#[test]
fn a03_subtraction_chain_is_left_associative() {
    let doc = custom(vec![num(10.0), op("MINUS"), num(3.0), op("PLUS"), num(2.0)]);
    assert_eq!(number(doc), 9.0);
}

#[test]
fn a04_nested_parentheses() {
    // 2 * ((1 + 2) * (3 - 1)) % 5 = 12 % 5
    let doc = custom(vec![
        num(2.0),
        op("MULTIPLY"),
        op("OPEN_PARENTHESIS"),
        op("OPEN_PARENTHESIS"),
        num(1.0),
        op("PLUS"),
        num(2.0),
        op("CLOSE_PARENTHESIS"),
        op("MULTIPLY"),
        op("OPEN_PARENTHESIS"),
        num(3.0),
        op("MINUS"),
        num(1.0),
        op("CLOSE_PARENTHESIS"),
        op("CLOSE_PARENTHESIS"),
        op("MOD"),
        num(5.0),
    ]);
    assert_eq!(number(doc), 2.0);
}

// ──────────────────────────────────────────────
// B. Failures
// ──────────────────────────────────────────────

#[test]
fn b01_division_by_zero() {
    let doc = custom(vec![num(10.0), op("DIVIDE"), num(0.0)]);
    assert_eq!(
        eval_doc(doc, &LiveValueCache::new()),
        Err(EvalError::DivisionByZero)
    );
}

#[test]
fn b02_missing_live_value() {
    let doc = custom(vec![value("Sensor", "Temperature"), op("PLUS"), num(1.0)]);
    assert!(matches!(
        eval_doc(doc, &LiveValueCache::new()),
        Err(EvalError::UnresolvedReference { .. })
    ));
}

#[test]
fn b03_malformed_expression_is_rejected() {
    let doc = custom(vec![num(3.0), op("PLUS")]);
    assert!(matches!(
        eval_doc(doc, &LiveValueCache::new()),
        Err(EvalError::MalformedExpression { .. })
    ));
}

// ──────────────────────────────────────────────
// C. Telemetry into evaluation
// ──────────────────────────────────────────────

#[test]
fn c01_record_feeds_boolean_condition() {
    let parser = FeedParser::new([DeviceLayout::new(
        "Sensor",
        vec![],
        vec!["Temperature".into(), "Humidity".into()],
    )]);
    let cache = LiveValueCache::new();
    cache.apply(&parser.parse_line("_Sensor 31.0 60").unwrap());

    let doc = json!({
        "type": "BOOLEAN",
        "terms": [
            op("OPEN_PARENTHESIS"), value("Sensor", "Temperature"), op("GREATER_THAN"), num(30.0), op("CLOSE_PARENTHESIS"),
            op("AND"),
            op("OPEN_PARENTHESIS"), value("Sensor", "Humidity"), op("LESS_THAN_OR_EQUAL"), num(60.0), op("CLOSE_PARENTHESIS")
        ]
    });
    assert_eq!(eval_doc(doc.clone(), &cache), Ok(LiveValue::Bool(true)));

    cache.apply(&parser.parse_line("_Sensor 29.9 60").unwrap());
    assert_eq!(eval_doc(doc, &cache), Ok(LiveValue::Bool(false)));
}

#[test]
fn c02_string_with_live_value() {
    let parser = FeedParser::new([DeviceLayout::new("Knob", vec![], vec!["Angle".into()])]);
    let cache = LiveValueCache::new();
    cache.apply(&parser.parse_line("_Knob 90").unwrap());

    let doc = json!({
        "type": "COMPLEX_STRING",
        "terms": [
            {"type": "STRING", "value": "angle "},
            value("Knob", "Angle"),
            op("DIVIDE"),
            num(4.0)
        ]
    });
    assert_eq!(
        eval_doc(doc, &cache),
        Ok(LiveValue::Text("angle 22.5".into()))
    );
}
