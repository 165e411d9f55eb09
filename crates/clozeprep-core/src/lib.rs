//! # Clozeprep Core
//!
//! Batch preparation for cloze-style question answering datasets (DeepMind
//! CNN / Daily Mail question files). Tokenizes raw examples into vocabulary
//! ids, anonymizes entity tokens through a per-example random remapping, and
//! assembles length-sorted, padded mini-batches for training.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use clozeprep_core::{StreamConfig, Vocabulary, build_stream};
//!
//! let config = StreamConfig {
//!     n_entities: 550,
//!     batch_size: 32,
//!     ..StreamConfig::default()
//! };
//! let vocab = Vocabulary::from_word_file(
//!     Path::new("stats/training/vocab.txt"),
//!     config.n_entities,
//!     config.needs_sep_token(),
//! ).unwrap();
//!
//! for batch in build_stream(&vocab, Path::new("questions/training"), &config, 42).unwrap() {
//!     let batch = batch.unwrap();
//!     println!("{} examples", batch.len());
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod error;
pub mod example;
pub mod shuffle;
pub mod stream;
pub mod vocab;

#[cfg(test)]
mod testlog;

// Re-export primary API
pub use config::StreamConfig;
pub use corpus::{DirPass, ExampleDir};
pub use error::{PrepError, Result};
pub use example::{Example, ExampleLoader};
pub use stream::{
    BatchStage, BatchStream, ConcatStage, ExampleStream, JoinedBatch, JoinedExample, PAD_ID,
    PaddedField, PreparedBatch, SortLength, SortPool, SplitBatch, build_stream,
};
pub use vocab::{TokenId, Vocabulary};
