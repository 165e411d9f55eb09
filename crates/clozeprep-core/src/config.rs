//! Stream configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Options controlling how examples are loaded, ordered, and batched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Number of `@entityN` placeholder tokens in the vocabulary.
    pub n_entities: usize,

    /// Shuffle the example order at the start of each pass.
    pub shuffle_questions: bool,

    /// Join context and question into a single sequence.
    pub concat_ctx_and_question: bool,

    /// When joining, put the question before the context.
    pub concat_question_before: bool,

    /// Examples per mini-batch.
    pub batch_size: usize,

    /// Sort pools hold `batch_size * sort_batch_count` examples.
    pub sort_batch_count: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            n_entities: 550,
            shuffle_questions: false,
            concat_ctx_and_question: false,
            concat_question_before: false,
            batch_size: 32,
            sort_batch_count: 20,
        }
    }
}

impl StreamConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| PrepError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| PrepError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects inconsistent or out-of-range settings.
    pub fn validate(&self) -> Result<()> {
        if self.n_entities == 0 {
            return Err(PrepError::InvalidConfig("n_entities must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(PrepError::InvalidConfig("batch_size must be positive".into()));
        }
        if self.sort_batch_count == 0 {
            return Err(PrepError::InvalidConfig(
                "sort_batch_count must be positive".into(),
            ));
        }
        if self.concat_question_before && !self.concat_ctx_and_question {
            return Err(PrepError::InvalidConfig(
                "concat_question_before requires concat_ctx_and_question".into(),
            ));
        }
        Ok(())
    }

    /// The vocabulary needs a `<SEP>` token only when sequences are joined.
    #[must_use]
    pub fn needs_sep_token(&self) -> bool {
        self.concat_ctx_and_question
    }

    /// Number of examples gathered into one sort pool.
    #[must_use]
    pub fn sort_pool_size(&self) -> usize {
        self.batch_size * self.sort_batch_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        assert!(StreamConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = StreamConfig {
            batch_size: 0,
            ..StreamConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PrepError::InvalidConfig(_))
        ));
    }

    #[test]
    fn question_before_requires_concat() {
        let config = StreamConfig {
            concat_question_before: true,
            concat_ctx_and_question: false,
            ..StreamConfig::default()
        };
        assert!(config.validate().is_err());

        let config = StreamConfig {
            concat_question_before: true,
            concat_ctx_and_question: true,
            ..StreamConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sep_token_follows_concat_flag() {
        let mut config = StreamConfig::default();
        assert!(!config.needs_sep_token());
        config.concat_ctx_and_question = true;
        assert!(config.needs_sep_token());
    }

    #[test]
    fn json_roundtrip() {
        let config = StreamConfig {
            n_entities: 5,
            batch_size: 4,
            sort_batch_count: 8,
            shuffle_questions: true,
            ..StreamConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: StreamConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn from_json_file_applies_defaults_and_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"n_entities": 3, "batch_size": 2}}"#).unwrap();

        let config = StreamConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.n_entities, 3);
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.sort_batch_count, StreamConfig::default().sort_batch_count);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"{{"batch_size": 0}}"#).unwrap();
        assert!(StreamConfig::from_json_file(bad.path()).is_err());
    }
}
