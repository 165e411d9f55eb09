//! # Example loading
//!
//! Reads one question file, anonymizes its entity tokens through a fresh
//! random remapping, and converts every field to vocabulary ids.
//!
//! Question files follow the DeepMind QA layout (zero-indexed): line 2 is the
//! context, line 4 the question, line 6 the answer, and lines 8 onward list
//! one candidate per line as `<entity-token>:<suffix>`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use oorandom::Rand32;
use tracing::warn;

use crate::error::{PrepError, Result};
use crate::shuffle::shuffle;
use crate::vocab::{ENTITY_PREFIX, TokenId, Vocabulary};

/// Line offsets of the fixed question-file layout.
const CONTEXT_LINE: usize = 2;
const QUESTION_LINE: usize = 4;
const ANSWER_LINE: usize = 6;
const CANDIDATES_START: usize = 8;

/// One fully converted question instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// Context passage as vocabulary ids.
    pub context: Vec<TokenId>,
    /// Question as vocabulary ids; contains the `@placeholder` id.
    pub question: Vec<TokenId>,
    /// Answer as an entity id, always below `n_entities`.
    pub answer: TokenId,
    /// Candidate entity ids, each below `n_entities`.
    pub candidates: Vec<TokenId>,
}

/// Converts question files into [`Example`]s against a fixed vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct ExampleLoader<'v> {
    vocab: &'v Vocabulary,
}

impl<'v> ExampleLoader<'v> {
    /// Creates a loader over the given vocabulary.
    #[must_use]
    pub fn new(vocab: &'v Vocabulary) -> Self {
        Self { vocab }
    }

    /// Loads and converts one question file.
    ///
    /// Entity anonymization draws from `rng`: candidate tokens are zipped
    /// with a freshly shuffled pool of entity ids, so the same file yields
    /// different (but internally consistent) ids on every call unless the
    /// seed is fixed.
    pub fn load(&self, path: &Path, rng: &mut Rand32) -> Result<Example> {
        let text = fs::read_to_string(path).map_err(|source| PrepError::Io {
            path: path.to_owned(),
            source,
        })?;
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() <= ANSWER_LINE {
            return Err(PrepError::TruncatedExample {
                path: path.to_owned(),
                expected: ANSWER_LINE + 1,
                found: lines.len(),
            });
        }

        let candidate_tokens: Vec<&str> = lines
            .get(CANDIDATES_START..)
            .unwrap_or_default()
            .iter()
            .copied()
            .map(|line| line.split(':').next().unwrap_or(line))
            .collect();
        let mapping = self.candidate_mapping(&candidate_tokens, path, rng);

        let context = self.word_ids(lines[CONTEXT_LINE], &mapping, path)?;
        let question = self.word_ids(lines[QUESTION_LINE], &mapping, path)?;
        let answer = self.word_id(lines[ANSWER_LINE], &mapping, path)?;
        let candidates = candidate_tokens
            .iter()
            .map(|token| self.word_id(token, &mapping, path))
            .collect::<Result<Vec<_>>>()?;

        let example = Example {
            context,
            question,
            answer,
            candidates,
        };
        self.validate(&example, path)?;
        Ok(example)
    }

    /// Builds the per-example entity remapping: candidate tokens zipped with
    /// a shuffled pool of entity ids.
    ///
    /// When an example carries more candidates than entity slots, the pool is
    /// duplicated until it is large enough; the resulting ids repeat. This is
    /// a degraded fallback for malformed data, logged once per example.
    ///
    /// An empty pool (zero-entity vocabulary) cannot grow; the candidates are
    /// left unmapped and surface as [`PrepError::UnmappedEntity`] when the
    /// example's words are resolved.
    fn candidate_mapping(
        &self,
        candidate_tokens: &[&str],
        path: &Path,
        rng: &mut Rand32,
    ) -> HashMap<String, TokenId> {
        let n_entities = self.vocab.n_entities();
        let mut pool: Vec<TokenId> = (0..n_entities as TokenId).collect();
        if candidate_tokens.len() > pool.len() {
            warn!(
                candidates = candidate_tokens.len(),
                n_entities,
                path = %path.display(),
                "more candidates than entity slots, reusing entity ids"
            );
            while !pool.is_empty() && candidate_tokens.len() > pool.len() {
                pool.extend_from_within(..);
            }
        }
        shuffle(rng, &mut pool);

        candidate_tokens
            .iter()
            .zip(pool)
            .map(|(token, id)| ((*token).to_owned(), id))
            .collect()
    }

    /// Resolves one word to an id: per-example remapping first, then the
    /// global vocabulary, then `<UNK>`. An entity token missing from the
    /// remapping means the file references an entity outside its candidate
    /// list, which is fatal.
    fn word_id(
        &self,
        word: &str,
        mapping: &HashMap<String, TokenId>,
        path: &Path,
    ) -> Result<TokenId> {
        if let Some(&id) = mapping.get(word) {
            return Ok(id);
        }
        if word.starts_with(ENTITY_PREFIX) {
            return Err(PrepError::UnmappedEntity {
                token: word.to_owned(),
                path: path.to_owned(),
            });
        }
        Ok(self.vocab.id_of(word).unwrap_or_else(|| self.vocab.unk_id()))
    }

    /// Converts a whitespace-separated line to ids. Splitting is a naive
    /// single-space split; punctuation must already be space-separated in
    /// the source files.
    fn word_ids(
        &self,
        line: &str,
        mapping: &HashMap<String, TokenId>,
        path: &Path,
    ) -> Result<Vec<TokenId>> {
        line.split(' ')
            .map(|word| self.word_id(word, mapping, path))
            .collect()
    }

    fn validate(&self, example: &Example, path: &Path) -> Result<()> {
        let n_entities = self.vocab.n_entities();
        let vocab_size = self.vocab.len();

        if example.answer as usize >= n_entities {
            return Err(PrepError::AnswerOutOfRange {
                id: example.answer,
                n_entities,
                path: path.to_owned(),
            });
        }
        for &id in &example.candidates {
            if id as usize >= n_entities {
                return Err(PrepError::CandidateOutOfRange {
                    id,
                    n_entities,
                    path: path.to_owned(),
                });
            }
        }
        for (field, ids) in [("context", &example.context), ("question", &example.question)] {
            for &id in ids.iter() {
                if id as usize >= vocab_size {
                    return Err(PrepError::WordIdOutOfBounds {
                        field,
                        id,
                        vocab_size,
                        path: path.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}
