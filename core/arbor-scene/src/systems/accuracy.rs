use arbor_protocol::{is_placeholder, Head, Token, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldScore {
    pub correct: usize,
    pub total: usize,
}

impl FieldScore {
    fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccuracyReport {
    pub head: FieldScore,
    pub deprel: FieldScore,
    pub upos: FieldScore,
}

/// Score `current` against `reference` on HEAD, DEPREL and UPOS.
///
/// Only defined reference values count towards a total.
pub fn accuracy(current: &Tree, reference: &Tree) -> AccuracyReport {
    let mut report = AccuracyReport::default();

    for (id, expected) in &reference.tokens {
        let actual: Option<&Token> = current.get(id);

        if expected.head != Head::Unassigned {
            report.head.record(actual.is_some_and(|t| t.head == expected.head));
        }
        if !is_placeholder(&expected.deprel) {
            report.deprel.record(actual.is_some_and(|t| t.deprel == expected.deprel));
        }
        if !is_placeholder(&expected.upos) {
            report.upos.record(actual.is_some_and(|t| t.upos == expected.upos));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_protocol::TokenId;

    fn tree() -> Tree {
        Tree::from_tokens([
            Token::new(TokenId::Word(1), "Dogs").with_head(TokenId::Word(2), "nsubj").with_upos("NOUN"),
            Token::new(TokenId::Word(2), "bark").with_head(Head::Root, "root").with_upos("VERB"),
        ])
    }

    #[test]
    fn test_self_comparison_is_perfect() {
        let report = accuracy(&tree(), &tree());
        for score in [report.head, report.deprel, report.upos] {
            assert_eq!(score.correct, score.total);
            assert_eq!(score.total, 2);
        }
        assert_eq!(report.head.ratio(), Some(1.0));
    }

    #[test]
    fn test_placeholders_are_not_counted() {
        let mut reference = tree();
        if let Some(token) = reference.tokens.get_mut(&TokenId::Word(1)) {
            token.head = Head::Unassigned;
            token.upos = "_".to_string();
        }
        let report = accuracy(&tree(), &reference);
        assert_eq!(report.head, FieldScore { correct: 1, total: 1 });
        assert_eq!(report.upos, FieldScore { correct: 1, total: 1 });
        assert_eq!(report.deprel, FieldScore { correct: 2, total: 2 });
    }

    #[test]
    fn test_wrong_values_are_counted_as_incorrect() {
        let mut current = tree();
        if let Some(token) = current.tokens.get_mut(&TokenId::Word(1)) {
            token.deprel = "obj".to_string();
        }
        current.tokens.remove(&TokenId::Word(2));

        let report = accuracy(&current, &tree());
        assert_eq!(report.deprel, FieldScore { correct: 0, total: 2 });
        assert_eq!(report.head, FieldScore { correct: 1, total: 2 });
        assert_eq!(FieldScore::default().ratio(), None);
    }
}
