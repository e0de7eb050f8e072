use serde::{Deserialize, Serialize};

use crate::error::GrammarError;
use crate::grammar;
use crate::term::Term;

/// Free-form arithmetic over quantities and value references.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomNumberExpression {
    terms: Vec<Term>,
}

impl CustomNumberExpression {
    pub fn new(terms: Vec<Term>) -> Self {
        CustomNumberExpression { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn into_terms(self) -> Vec<Term> {
        self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn check(&self) -> Result<(), GrammarError> {
        grammar::check(&self.terms)
    }

    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    pub fn with_term(&self, term: Term) -> Self {
        let mut terms = self.terms.clone();
        terms.push(term);
        CustomNumberExpression { terms }
    }

    /// Replaces the term at `index`; `None` when out of range.
    pub fn with_term_at(&self, index: usize, term: Term) -> Option<Self> {
        let mut terms = self.terms.clone();
        *terms.get_mut(index)? = term;
        Some(CustomNumberExpression { terms })
    }

    pub fn without_term(&self, index: usize) -> Option<Self> {
        if index >= self.terms.len() {
            return None;
        }
        let mut terms = self.terms.clone();
        terms.remove(index);
        Some(CustomNumberExpression { terms })
    }
}

impl From<Vec<Term>> for CustomNumberExpression {
    fn from(terms: Vec<Term>) -> Self {
        CustomNumberExpression::new(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Operator;
    use crate::unit::Unit;

    #[test]
    fn mutators_leave_original_untouched() {
        let e = CustomNumberExpression::new(vec![Term::number(1.0, Unit::Number)]);
        let grown = e
            .with_term(Term::op(Operator::Plus))
            .with_term(Term::number(2.0, Unit::Number));
        assert_eq!(e.terms().len(), 1);
        assert_eq!(grown.terms().len(), 3);
        assert!(grown.is_valid());

        let replaced = grown.with_term_at(1, Term::op(Operator::Multiply)).unwrap();
        assert_eq!(replaced.terms()[1], Term::op(Operator::Multiply));
        assert_eq!(grown.terms()[1], Term::op(Operator::Plus));

        let shorter = grown.without_term(2).unwrap();
        assert!(!shorter.is_valid());
        assert!(grown.without_term(9).is_none());
    }
}
