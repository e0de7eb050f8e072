use serde::{Deserialize, Serialize};

use super::CustomNumberExpression;
use crate::error::GrammarError;
use crate::grammar;
use crate::term::Term;

/// One piece of a [`ComplexStringExpression`].
#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Literal(String),
    Number(CustomNumberExpression),
}

/// Text built from string literals interleaved with numeric runs, e.g.
/// `"temp: " Sensor.Temperature + 1 " C"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexStringExpression {
    terms: Vec<Term>,
}

impl ComplexStringExpression {
    pub fn new(terms: Vec<Term>) -> Self {
        ComplexStringExpression { terms }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        ComplexStringExpression {
            terms: vec![Term::string(text)],
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Literals and the numeric runs between them, in order. Empty runs are
    /// skipped.
    pub fn sub_expressions(&self) -> Vec<StringPart> {
        let mut parts = Vec::new();
        let mut run: Vec<Term> = Vec::new();
        for term in &self.terms {
            match term {
                Term::String(s) => {
                    if !run.is_empty() {
                        parts.push(StringPart::Number(std::mem::take(&mut run).into()));
                    }
                    parts.push(StringPart::Literal(s.clone()));
                }
                other => run.push(other.clone()),
            }
        }
        if !run.is_empty() {
            parts.push(StringPart::Number(run.into()));
        }
        parts
    }

    /// Every numeric run between literals must itself be well formed. No
    /// terms at all is the empty string.
    pub fn check(&self) -> Result<(), GrammarError> {
        let mut start = 0;
        for (i, term) in self.terms.iter().enumerate() {
            if let Term::String(_) = term {
                if i > start {
                    grammar::check_at(&self.terms[start..i], start)?;
                }
                start = i + 1;
            }
        }
        if start < self.terms.len() {
            grammar::check_at(&self.terms[start..], start)?;
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    pub fn with_term(&self, term: Term) -> Self {
        let mut terms = self.terms.clone();
        terms.push(term);
        ComplexStringExpression { terms }
    }

    pub fn with_term_at(&self, index: usize, term: Term) -> Option<Self> {
        let mut terms = self.terms.clone();
        *terms.get_mut(index)? = term;
        Some(ComplexStringExpression { terms })
    }

    pub fn without_term(&self, index: usize) -> Option<Self> {
        if index >= self.terms.len() {
            return None;
        }
        let mut terms = self.terms.clone();
        terms.remove(index);
        Some(ComplexStringExpression { terms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Operator;
    use crate::unit::Unit;

    fn sample() -> ComplexStringExpression {
        ComplexStringExpression::new(vec![
            Term::string("t="),
            Term::value("Sensor", "Temperature"),
            Term::op(Operator::Plus),
            Term::number(1.0, Unit::Celsius),
            Term::string(" C"),
        ])
    }

    #[test]
    fn splits_into_literals_and_runs() {
        let parts = sample().sub_expressions();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], StringPart::Literal("t=".into()));
        match &parts[1] {
            StringPart::Number(e) => assert_eq!(e.terms().len(), 3),
            other => panic!("expected a numeric run, got {:?}", other),
        }
        assert_eq!(parts[2], StringPart::Literal(" C".into()));
    }

    #[test]
    fn literal_only_is_valid() {
        assert!(ComplexStringExpression::literal("hello").is_valid());
        assert!(ComplexStringExpression::new(vec![Term::string("a"), Term::string("b")]).is_valid());
    }

    #[test]
    fn each_run_is_grammar_checked() {
        assert!(sample().is_valid());
        let bad = sample().with_term_at(3, Term::op(Operator::Minus)).unwrap();
        assert!(matches!(
            bad.check(),
            Err(GrammarError::UnexpectedTerm { position: 3, .. })
        ));

        // run `Temperature +` ends with an operator
        let dangling = sample().without_term(3).unwrap();
        assert!(matches!(dangling.check(), Err(GrammarError::BadEnd { .. })));

        let leading = ComplexStringExpression::new(vec![
            Term::op(Operator::Plus),
            Term::number(1.0, Unit::Number),
            Term::string("x"),
        ]);
        assert!(matches!(leading.check(), Err(GrammarError::BadStart { .. })));
    }

    #[test]
    fn run_positions_refer_to_whole_list() {
        let e = ComplexStringExpression::new(vec![
            Term::string("a"),
            Term::number(1.0, Unit::Number),
            Term::number(2.0, Unit::Number),
        ]);
        assert!(matches!(
            e.check(),
            Err(GrammarError::UnexpectedTerm { position: 2, .. })
        ));
    }

    #[test]
    fn empty_is_the_empty_string() {
        let e = ComplexStringExpression::default();
        assert_eq!(e.check(), Ok(()));
        assert!(e.is_valid());
        assert!(e.sub_expressions().is_empty());
    }
}
