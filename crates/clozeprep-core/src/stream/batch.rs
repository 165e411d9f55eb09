//! Batch stage: chunks the sorted stream into fixed-size mini-batches and
//! pads each variable-length field to the batch maximum with a 1/0 mask.

use super::SortLength;
use super::concat::JoinedExample;
use crate::error::Result;
use crate::example::Example;
use crate::vocab::TokenId;

/// Fill value for padded positions. Real positions are told apart by the
/// mask, not by the fill value.
pub const PAD_ID: TokenId = 0;

/// A rectangular batch field: every row padded to the batch maximum, with a
/// same-shaped mask marking real positions as 1 and padding as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedField {
    /// Row-major padded values, one row per example.
    pub values: Vec<Vec<TokenId>>,
    /// Companion mask, same shape as `values`.
    pub mask: Vec<Vec<u8>>,
}

impl PaddedField {
    /// Pads `rows` to their common maximum length with [`PAD_ID`].
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<TokenId>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut values = Vec::with_capacity(rows.len());
        let mut mask = Vec::with_capacity(rows.len());
        for mut row in rows {
            let mut row_mask = vec![1u8; row.len()];
            row.resize(width, PAD_ID);
            row_mask.resize(width, 0);
            values.push(row);
            mask.push(row_mask);
        }
        Self { values, mask }
    }

    /// Number of rows (examples).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.values.len()
    }

    /// Common padded row length.
    #[must_use]
    pub fn width(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }
}

/// A mini-batch with context and question kept as separate fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBatch {
    pub context: PaddedField,
    pub question: PaddedField,
    pub candidates: PaddedField,
    /// Answers are single ids and are stacked without padding.
    pub answer: Vec<TokenId>,
}

impl SplitBatch {
    /// Number of examples in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.answer.len()
    }

    /// Returns `true` if the batch holds no examples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answer.is_empty()
    }
}

/// A mini-batch of joined context-and-question sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedBatch {
    pub sequence: PaddedField,
    pub candidates: PaddedField,
    pub answer: Vec<TokenId>,
}

impl JoinedBatch {
    /// Number of examples in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.answer.len()
    }

    /// Returns `true` if the batch holds no examples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answer.is_empty()
    }
}

/// Stacks a chunk of records into one batch, padding designated fields.
pub trait Collate: SortLength + Sized {
    /// The batch type produced.
    type Batch;

    /// Collates a non-empty chunk of records.
    fn collate(items: Vec<Self>) -> Self::Batch;
}

impl Collate for Example {
    type Batch = SplitBatch;

    fn collate(items: Vec<Self>) -> SplitBatch {
        let mut contexts = Vec::with_capacity(items.len());
        let mut questions = Vec::with_capacity(items.len());
        let mut candidates = Vec::with_capacity(items.len());
        let mut answers = Vec::with_capacity(items.len());
        for item in items {
            contexts.push(item.context);
            questions.push(item.question);
            candidates.push(item.candidates);
            answers.push(item.answer);
        }
        SplitBatch {
            context: PaddedField::from_rows(contexts),
            question: PaddedField::from_rows(questions),
            candidates: PaddedField::from_rows(candidates),
            answer: answers,
        }
    }
}

impl Collate for JoinedExample {
    type Batch = JoinedBatch;

    fn collate(items: Vec<Self>) -> JoinedBatch {
        let mut sequences = Vec::with_capacity(items.len());
        let mut candidates = Vec::with_capacity(items.len());
        let mut answers = Vec::with_capacity(items.len());
        for item in items {
            sequences.push(item.sequence);
            candidates.push(item.candidates);
            answers.push(item.answer);
        }
        JoinedBatch {
            sequence: PaddedField::from_rows(sequences),
            candidates: PaddedField::from_rows(candidates),
            answer: answers,
        }
    }
}

/// Chunks the input into batches of `batch_size`; the last batch may be
/// short. An empty chunk at end of data ends the stream without error.
#[derive(Debug)]
pub struct BatchStage<I> {
    inner: I,
    batch_size: usize,
    done: bool,
}

impl<I> BatchStage<I> {
    /// Creates the stage with a fixed batch size.
    pub fn new(inner: I, batch_size: usize) -> Self {
        Self {
            inner,
            batch_size,
            done: false,
        }
    }
}

impl<T, I> Iterator for BatchStage<I>
where
    T: Collate,
    I: Iterator<Item = Result<T>>,
{
    type Item = Result<T::Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut items = Vec::with_capacity(self.batch_size);
        while items.len() < self.batch_size {
            match self.inner.next() {
                Some(Ok(item)) => items.push(item),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        if items.is_empty() {
            return None;
        }
        Some(Ok(T::collate(items)))
    }
}
