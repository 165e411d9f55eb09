//! # Stream pipeline
//!
//! Pull-based pipeline stages, composed by explicit structs: example files
//! flow through loading, optional concatenation, length-sorting pools, and
//! batching with padding. Every stage produces one record on demand; errors
//! are fatal and end the stream after being yielded once.

mod batch;
mod concat;
mod sort_pool;

pub use batch::{BatchStage, Collate, JoinedBatch, PAD_ID, PaddedField, SplitBatch};
pub use concat::{ConcatStage, JoinedExample};
pub use sort_pool::SortPool;

use std::path::Path;

use oorandom::Rand32;

use crate::config::StreamConfig;
use crate::corpus::{DirPass, ExampleDir};
use crate::error::{PrepError, Result};
use crate::example::{Example, ExampleLoader};
use crate::vocab::Vocabulary;

/// Length of the field the sort pool orders by.
///
/// Split records sort by context length; joined records by the combined
/// sequence length. Sorting similar lengths together keeps padding waste low.
pub trait SortLength {
    /// Length of the designated length-determining field.
    fn sort_length(&self) -> usize;
}

impl SortLength for Example {
    fn sort_length(&self) -> usize {
        self.context.len()
    }
}

/// Source stage: loads one example per enumerated file.
#[derive(Debug)]
pub struct ExampleStream<'v> {
    loader: ExampleLoader<'v>,
    files: DirPass,
    rng: Rand32,
}

impl<'v> ExampleStream<'v> {
    /// Creates a stream over one directory pass.
    pub fn new(vocab: &'v Vocabulary, files: DirPass, rng: Rand32) -> Self {
        Self {
            loader: ExampleLoader::new(vocab),
            files,
            rng,
        }
    }
}

impl Iterator for ExampleStream<'_> {
    type Item = Result<Example>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        Some(self.loader.load(&path, &mut self.rng))
    }
}

/// A mini-batch from either pipeline shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedBatch {
    /// Context and question batched as separate fields.
    Split(SplitBatch),
    /// Context and question joined into one sequence.
    Joined(JoinedBatch),
}

impl PreparedBatch {
    /// Number of examples in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Split(batch) => batch.len(),
            Self::Joined(batch) => batch.len(),
        }
    }

    /// Returns `true` if the batch holds no examples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The fully assembled batch stream for one pass over a dataset.
#[derive(Debug)]
pub enum BatchStream<'v> {
    /// No concatenation: (context, question, answer, candidates) batches.
    Split(BatchStage<SortPool<ExampleStream<'v>, Example>>),
    /// Concatenation enabled: (sequence, answer, candidates) batches.
    Joined(BatchStage<SortPool<ConcatStage<ExampleStream<'v>>, JoinedExample>>),
}

impl Iterator for BatchStream<'_> {
    type Item = Result<PreparedBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Split(stage) => stage.next().map(|b| b.map(PreparedBatch::Split)),
            Self::Joined(stage) => stage.next().map(|b| b.map(PreparedBatch::Joined)),
        }
    }
}

/// Wires the full pipeline for one pass: enumerate, load, optionally join,
/// sort by length in pools, batch and pad.
///
/// The configuration is validated first and must agree with the vocabulary
/// (same entity count; a `<SEP>` token when concatenation is on). All
/// shuffling draws from a single RNG seeded with `seed`, so two streams
/// built with the same inputs produce identical batches.
pub fn build_stream<'v>(
    vocab: &'v Vocabulary,
    data_dir: &Path,
    config: &StreamConfig,
    seed: u64,
) -> Result<BatchStream<'v>> {
    config.validate()?;
    if config.n_entities != vocab.n_entities() {
        return Err(PrepError::InvalidConfig(format!(
            "config has n_entities = {} but vocabulary was built with {}",
            config.n_entities,
            vocab.n_entities()
        )));
    }
    if config.needs_sep_token() && vocab.sep_id().is_none() {
        return Err(PrepError::InvalidConfig(
            "concat_ctx_and_question requires a vocabulary built with a <SEP> token".into(),
        ));
    }

    let mut rng = Rand32::new(seed);
    let corpus = ExampleDir::new(data_dir, config.shuffle_questions);
    let files = corpus.pass(&mut rng)?;
    let examples = ExampleStream::new(vocab, files, rng);
    let pool_size = config.sort_pool_size();

    if config.concat_ctx_and_question {
        let joined = ConcatStage::new(examples, config.concat_question_before, vocab.sep_id());
        let sorted = SortPool::new(joined, pool_size);
        Ok(BatchStream::Joined(BatchStage::new(sorted, config.batch_size)))
    } else {
        let sorted = SortPool::new(examples, pool_size);
        Ok(BatchStream::Split(BatchStage::new(sorted, config.batch_size)))
    }
}
