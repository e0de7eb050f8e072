//! Property tests: interpreted results agree with Rust arithmetic.

use gizmo_core::{Operator, Term, Unit};
use gizmo_eval::{evaluate_terms, EvalOptions, LiveValueCache};
use proptest::prelude::*;

fn n(v: i32) -> Term {
    Term::number(v as f64, Unit::Number)
}

fn op(o: Operator) -> Term {
    Term::op(o)
}

fn run(terms: &[Term]) -> f64 {
    evaluate_terms(terms, &LiveValueCache::new(), &EvalOptions::default()).unwrap()
}

proptest! {
    #[test]
    fn product_binds_tighter_than_sum(a in -1000i32..1000, b in -1000i32..1000, c in -1000i32..1000) {
        let terms = [n(a), op(Operator::Plus), n(b), op(Operator::Multiply), n(c)];
        prop_assert_eq!(run(&terms), a as f64 + b as f64 * c as f64);
    }

    #[test]
    fn subtraction_associates_left(a in -1000i32..1000, b in -1000i32..1000, c in -1000i32..1000) {
        let terms = [n(a), op(Operator::Minus), n(b), op(Operator::Minus), n(c)];
        prop_assert_eq!(run(&terms), (a as f64 - b as f64) - c as f64);
    }

    #[test]
    fn comparison_yields_flag(a in -50i32..50, b in -50i32..50) {
        let terms = [n(a), op(Operator::LessThan), n(b), op(Operator::Or), n(a), op(Operator::Equal), n(b)];
        let expected = if a <= b { 1.0 } else { 0.0 };
        prop_assert_eq!(run(&terms), expected);
    }

    #[test]
    fn division_by_nonzero_matches(a in -1000i32..1000, b in 1i32..1000) {
        let terms = [n(a), op(Operator::Divide), n(b)];
        prop_assert_eq!(run(&terms), a as f64 / b as f64);
    }
}
