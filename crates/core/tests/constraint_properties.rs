//! Algebraic properties of constraints and the Boolean entry rendering.

use gizmo_core::{
    entries_to_terms, terms_to_entries, Comparison, Constraint, ConstraintError,
    CustomNumberExpression, Entry, Operator, Term, Unit,
};
use proptest::prelude::*;

// ──────────────────────────────────────────────
// Strategies
// ──────────────────────────────────────────────

fn numeric(unit: Unit) -> impl Strategy<Value = Constraint> {
    (-1000.0f64..1000.0, 0.0f64..500.0).prop_map(move |(min, span)| {
        Constraint::numeric(min, min + span, unit)
    })
}

fn strings() -> impl Strategy<Value = Constraint> {
    proptest::collection::btree_set("[a-e]", 0..5).prop_map(Constraint::categorical_strings)
}

fn ints() -> impl Strategy<Value = Constraint> {
    proptest::collection::btree_set(0i64..8, 0..6).prop_map(Constraint::categorical_ints)
}

fn keyed() -> impl Strategy<Value = Constraint> {
    // Codes are drawn independently of keys, so operands may disagree.
    proptest::collection::btree_map("[a-e]", 0i64..6, 0..4).prop_filter_map(
        "codes must be distinct",
        |pairs| Constraint::string_keyed(pairs).ok(),
    )
}

fn same_variant_pair() -> impl Strategy<Value = (Constraint, Constraint)> {
    prop_oneof![
        (numeric(Unit::Centimeter), numeric(Unit::Centimeter)),
        (strings(), strings()),
        (ints(), ints()),
        (keyed(), keyed()),
    ]
}

fn operand() -> impl Strategy<Value = Vec<Term>> {
    prop_oneof![
        (-100i32..100).prop_map(|v| vec![Term::number(v as f64, Unit::Number)]),
        "[A-C]".prop_map(|d| vec![Term::value(d, "Value")]),
        (-100i32..100, 1i32..9).prop_map(|(a, b)| vec![
            Term::op(Operator::OpenParenthesis),
            Term::number(a as f64, Unit::Number),
            Term::op(Operator::Multiply),
            Term::number(b as f64, Unit::Number),
            Term::op(Operator::CloseParenthesis),
        ]),
    ]
}

fn comparison() -> impl Strategy<Value = Comparison> {
    prop_oneof![
        Just(Comparison::GreaterThan),
        Just(Comparison::LessThan),
        Just(Comparison::GreaterThanOrEqual),
        Just(Comparison::LessThanOrEqual),
        Just(Comparison::Equal),
        Just(Comparison::NotEqual),
    ]
}

fn entry() -> impl Strategy<Value = Entry> {
    (operand(), comparison(), operand()).prop_map(|(lhs, op, rhs)| {
        Entry::new(CustomNumberExpression::new(lhs), op, CustomNumberExpression::new(rhs))
    })
}

// ──────────────────────────────────────────────
// Properties
// ──────────────────────────────────────────────

proptest! {
    #[test]
    fn union_is_compatible_with_both_operands((a, b) in same_variant_pair()) {
        match a.union(&b) {
            Ok(u) => {
                prop_assert!(u.is_compatible(&a));
                prop_assert!(u.is_compatible(&b));
            }
            Err(e) => {
                prop_assert!(matches!(e, ConstraintError::ConflictingKey { .. }), "{:?}", e);
            }
        }
    }

    #[test]
    fn keyed_union_fails_only_on_a_real_clash((a, b) in (keyed(), keyed())) {
        let (Constraint::StringKeyedInt { entries: ea }, Constraint::StringKeyedInt { entries: eb }) = (&a, &b) else {
            unreachable!("keyed strategy yields keyed constraints");
        };
        let clash = ea.iter().any(|x| {
            eb.iter()
                .any(|y| (x.key == y.key) != (x.value == y.value))
        });
        prop_assert_eq!(a.union(&b).is_err(), clash);
    }

    #[test]
    fn non_empty_intersection_is_compatible_with_operand((a, b) in same_variant_pair()) {
        let i = a.intersect(&b).unwrap();
        if !i.is_empty() {
            prop_assert!(a.is_compatible(&i));
            prop_assert!(b.is_compatible(&i));
        }
    }

    #[test]
    fn none_is_identity_of_intersection((a, _) in same_variant_pair()) {
        prop_assert_eq!(a.intersect(&Constraint::None).unwrap(), a.clone());
        prop_assert_eq!(Constraint::None.intersect(&a).unwrap(), a.clone());
        prop_assert_eq!(Constraint::None.union(&a).unwrap(), a);
    }

    #[test]
    fn boolean_terms_round_trip(entries in proptest::collection::vec(entry(), 1..4)) {
        let terms = entries_to_terms(&entries);
        let parsed = terms_to_entries(&terms).unwrap();
        prop_assert_eq!(&parsed, &entries);
        prop_assert_eq!(entries_to_terms(&parsed), terms);
    }
}

// ──────────────────────────────────────────────
// Fixed cases
// ──────────────────────────────────────────────

#[test]
fn numeric_compatibility_requires_matching_unit() {
    let wide = Constraint::numeric(0.0, 100.0, Unit::Centimeter);
    assert!(wide.is_compatible(&Constraint::numeric(0.0, 80.0, Unit::Centimeter)));
    assert!(!wide.is_compatible(&Constraint::numeric(0.0, 80.0, Unit::Meter)));
}

#[test]
fn keyed_union_with_a_relabelled_code_is_an_error() {
    let a = Constraint::string_keyed([("LOW", 0)]).unwrap();
    let b = Constraint::string_keyed([("LOW", 1)]).unwrap();
    assert!(matches!(
        a.union(&b),
        Err(ConstraintError::ConflictingKey { .. })
    ));
    assert!(matches!(
        b.union(&a),
        Err(ConstraintError::ConflictingKey { .. })
    ));
}

#[test]
fn cross_variant_is_never_compatible() {
    let s = Constraint::categorical_strings(["CM"]);
    let n = Constraint::numeric(0.0, 1.0, Unit::Centimeter);
    assert!(!s.is_compatible(&n));
    assert!(!n.is_compatible(&s));
    assert!(matches!(s.union(&n), Err(ConstraintError::TypeMismatch { .. })));
    assert!(matches!(n.intersect(&s), Err(ConstraintError::TypeMismatch { .. })));
}

#[test]
fn numeric_algebra_rejects_unit_mismatch() {
    let cm = Constraint::numeric(0.0, 1.0, Unit::Centimeter);
    let m = Constraint::numeric(0.0, 1.0, Unit::Meter);
    assert_eq!(
        cm.union(&m),
        Err(ConstraintError::IncompatibleUnit {
            left: Unit::Centimeter,
            right: Unit::Meter
        })
    );
    assert!(cm.intersect(&m).is_err());
    // a converter opts in to mixing units
    let narrowed = cm.intersect_converted(&m).unwrap();
    assert_eq!(narrowed, Constraint::numeric(0.0, 1.0, Unit::Centimeter));
}

#[test]
fn categorical_intersection_with_none_keeps_the_set() {
    // Unconstrained is the identity on both sides for every variant.
    let s = Constraint::categorical_strings(["a", "b"]);
    assert_eq!(s.intersect(&Constraint::None).unwrap(), s);
    let k = Constraint::string_keyed([("on", 1), ("off", 0)]).unwrap();
    assert_eq!(Constraint::None.intersect(&k).unwrap(), k);
}
