//! Optional concatenation stage: merges each example's context and question
//! into one sequence, with an optional separator id between them.

use super::SortLength;
use crate::error::Result;
use crate::example::Example;
use crate::vocab::TokenId;

/// An example whose context and question were joined into one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedExample {
    /// The combined sequence, in the configured order.
    pub sequence: Vec<TokenId>,
    /// Answer entity id.
    pub answer: TokenId,
    /// Candidate entity ids.
    pub candidates: Vec<TokenId>,
}

impl SortLength for JoinedExample {
    fn sort_length(&self) -> usize {
        self.sequence.len()
    }
}

/// Order-preserving, one-to-one transformer from [`Example`] to
/// [`JoinedExample`].
#[derive(Debug)]
pub struct ConcatStage<I> {
    inner: I,
    question_before: bool,
    separator: Option<TokenId>,
}

impl<I> ConcatStage<I> {
    /// Creates the stage. With `question_before` the output reads
    /// question, separator, context; otherwise context, separator, question.
    /// Without a separator the two sequences are joined back to back.
    pub fn new(inner: I, question_before: bool, separator: Option<TokenId>) -> Self {
        Self {
            inner,
            question_before,
            separator,
        }
    }

    fn join(&self, example: Example) -> JoinedExample {
        let Example {
            context,
            question,
            answer,
            candidates,
        } = example;

        let (first, second) = if self.question_before {
            (question, context)
        } else {
            (context, question)
        };

        let sep_len = usize::from(self.separator.is_some());
        let mut sequence = Vec::with_capacity(first.len() + sep_len + second.len());
        sequence.extend(first);
        sequence.extend(self.separator);
        sequence.extend(second);

        JoinedExample {
            sequence,
            answer,
            candidates,
        }
    }
}

impl<I> Iterator for ConcatStage<I>
where
    I: Iterator<Item = Result<Example>>,
{
    type Item = Result<JoinedExample>;

    fn next(&mut self) -> Option<Self::Item> {
        let example = self.inner.next()?;
        Some(example.map(|e| self.join(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(context: Vec<TokenId>, question: Vec<TokenId>) -> Result<Example> {
        Ok(Example {
            context,
            question,
            answer: 0,
            candidates: vec![0],
        })
    }

    #[test]
    fn question_before_with_separator() {
        let input = vec![example(vec![1, 2], vec![3])];
        let mut stage = ConcatStage::new(input.into_iter(), true, Some(9));

        let joined = stage.next().unwrap().unwrap();
        assert_eq!(joined.sequence, vec![3, 9, 1, 2]);
        assert!(stage.next().is_none());
    }

    #[test]
    fn context_before_without_separator() {
        let input = vec![example(vec![1, 2], vec![3])];
        let mut stage = ConcatStage::new(input.into_iter(), false, None);

        let joined = stage.next().unwrap().unwrap();
        assert_eq!(joined.sequence, vec![1, 2, 3]);
    }

    #[test]
    fn answer_and_candidates_pass_through() {
        let input = vec![Ok(Example {
            context: vec![5],
            question: vec![6],
            answer: 2,
            candidates: vec![2, 3],
        })];
        let joined = ConcatStage::new(input.into_iter(), false, Some(7))
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(joined.answer, 2);
        assert_eq!(joined.candidates, vec![2, 3]);
        assert_eq!(joined.sort_length(), 3);
    }

    #[test]
    fn errors_pass_through() {
        use crate::error::PrepError;
        use std::path::PathBuf;

        let input = vec![Err(PrepError::TruncatedExample {
            path: PathBuf::from("q"),
            expected: 7,
            found: 0,
        })];
        let mut stage = ConcatStage::new(input.into_iter(), false, None);
        assert!(stage.next().unwrap().is_err());
    }
}
