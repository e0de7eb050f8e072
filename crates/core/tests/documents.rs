//! Persisted documents and validity of whole expressions.

use gizmo_core::persist::{constraint_from_json, expression_from_json, expression_to_json};
use gizmo_core::{
    grammar, BooleanExpression, Constraint, Expression, ExpressionError, GrammarError, Operator,
    Quantity, Term, Unit, ValueLinkingExpression, ValueRef,
};
use serde_json::json;

// ──────────────────────────────────────────────
// Test helpers
// ──────────────────────────────────────────────

fn num(v: f64) -> serde_json::Value {
    json!({"type": "NUMBER", "value": {"value": v, "unit": "NOT_SPECIFIED"}})
}

fn op(name: &str) -> serde_json::Value {
    json!({"type": "OPERATOR", "value": name})
}

fn n(v: f64) -> Term {
    Term::number(v, Unit::NotSpecified)
}

// ──────────────────────────────────────────────
// Grammar
// ──────────────────────────────────────────────

#[test]
fn grammar_rejects_malformed_sequences() {
    let plus = Term::op(Operator::Plus);
    let times = Term::op(Operator::Multiply);
    let open = Term::op(Operator::OpenParenthesis);

    assert_eq!(grammar::check(&[]), Err(GrammarError::Empty));
    assert!(!grammar::is_valid(&[open, n(3.0), plus.clone(), n(5.0)]));
    assert!(!grammar::is_valid(&[n(3.0), n(5.0)]));
    assert!(!grammar::is_valid(&[n(1.0), plus.clone(), times, n(2.0)]));
    assert!(!grammar::is_valid(&[plus.clone(), n(1.0)]));
    assert!(!grammar::is_valid(&[n(1.0), plus]));
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[test]
fn custom_number_document_loads() {
    let doc = json!({
        "type": "CUSTOM_NUMBER",
        "terms": [
            {"type": "VALUE", "value": {"device": "Sensor 1", "property": "Temperature"}},
            op("MULTIPLY"),
            num(2.0)
        ]
    });
    let e = expression_from_json(&doc).unwrap();
    assert!(e.is_valid());
    assert_eq!(e.values_used().len(), 1);
    assert_eq!(expression_to_json(&e).unwrap(), doc);
}

#[test]
fn boolean_document_is_parsed_into_entries() {
    let doc = json!({
        "type": "BOOLEAN",
        "terms": [
            op("OPEN_PARENTHESIS"), num(1.0), op("GREATER_THAN"), num(0.0), op("CLOSE_PARENTHESIS"),
            op("AND"),
            op("OPEN_PARENTHESIS"), num(2.0), op("NOT_EQUAL"), num(3.0), op("CLOSE_PARENTHESIS")
        ]
    });
    match expression_from_json(&doc).unwrap() {
        Expression::Boolean(b) => assert_eq!(b.entries().len(), 2),
        other => panic!("expected a boolean expression, got {:?}", other),
    }

    let broken = json!({
        "type": "BOOLEAN",
        "terms": [num(1.0), op("GREATER_THAN"), num(0.0)]
    });
    assert!(expression_from_json(&broken).is_err());
}

#[test]
fn empty_boolean_document_has_no_entries() {
    let doc = json!({"type": "BOOLEAN", "terms": []});
    let e = expression_from_json(&doc).unwrap();
    assert!(!e.is_valid());
    assert_eq!(
        BooleanExpression::from_terms(&[]).unwrap().check(),
        Err(ExpressionError::MalformedExpression(GrammarError::Empty))
    );
}

#[test]
fn value_linking_document_checks_duplicates() {
    let e = ValueLinkingExpression::for_destination(&Constraint::numeric(0.0, 180.0, Unit::Degree))
        .unwrap()
        .set_source_value(
            ValueRef::new("Knob", "Angle"),
            &Constraint::numeric(0.0, 1023.0, Unit::Number),
        )
        .unwrap();
    let mut doc = expression_to_json(&Expression::from(e.clone())).unwrap();
    assert_eq!(doc["type"], json!("VALUE_LINKING"));
    assert_eq!(expression_from_json(&doc).unwrap(), Expression::from(e));

    doc["terms"][18] = num(7.0);
    assert!(expression_from_json(&doc).is_err());
}

#[test]
fn simple_documents() {
    let doc = json!({"type": "NUMBER_WITH_UNIT", "value": {"value": 90.0, "unit": "DEGREE"}});
    match expression_from_json(&doc).unwrap() {
        Expression::NumberWithUnit(e) => assert_eq!(e.value, Quantity::new(90.0, Unit::Degree)),
        other => panic!("unexpected {:?}", other),
    }

    let doc = json!({"type": "PROJECT_VALUE", "value": null});
    let e = expression_from_json(&doc).unwrap();
    assert!(!e.is_valid());
}

#[test]
fn dot_matrix_dimensions_must_match_data() {
    let matrix = |rows: u64, columns: u64, data: &str| {
        json!({"type": "COMPLEX_STRING", "terms": [
            {"type": "DOT_MATRIX", "value": {"rows": rows, "columns": columns, "data": data}}
        ]})
    };
    assert!(expression_from_json(&matrix(2, 5, "88&10")).is_ok());

    let huge = (usize::MAX / 2) as u64;
    assert!(expression_from_json(&matrix(huge, 4, "F")).is_err());
    assert!(expression_from_json(&matrix(2, huge, "F&F")).is_err());
    assert!(expression_from_json(&matrix(0, 4, "")).is_err());
}

// ──────────────────────────────────────────────
// Constraints
// ──────────────────────────────────────────────

#[test]
fn numeric_constraint_accepts_sentinel_bounds() {
    let c = constraint_from_json(&json!({
        "dataType": "NUMERIC",
        "min": "MIN_DOUBLE",
        "max": 100.0,
        "unit": "CELSIUS"
    }))
    .unwrap();
    assert!(c.test(Quantity::new(-1.0e300, Unit::Celsius)));
    assert!(!c.test(Quantity::new(101.0, Unit::Celsius)));

    let bad = constraint_from_json(&json!({
        "dataType": "NUMERIC",
        "min": "SMALL",
        "max": 1.0,
        "unit": "CELSIUS"
    }));
    assert!(bad.is_err());
}
