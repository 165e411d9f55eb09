//! # Vocabulary
//!
//! Static token-to-id mapping built once per dataset: synthetic entity
//! placeholders first, then the word list in file order, then the special
//! tokens. Ids are dense integers `0..vocab_size`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{PrepError, Result};

/// Integer id of a vocabulary token.
pub type TokenId = u32;

/// Token emitted for words absent from the vocabulary.
pub const UNK_TOKEN: &str = "<UNK>";
/// Token standing in for the blanked-out answer slot in a question.
pub const PLACEHOLDER_TOKEN: &str = "@placeholder";
/// Separator inserted between context and question when they are joined.
pub const SEP_TOKEN: &str = "<SEP>";
/// Prefix shared by all anonymized entity tokens (`@entity0`, `@entity1`, ...).
pub const ENTITY_PREFIX: &str = "@entity";

/// Dataset vocabulary: entity placeholders, word list, special tokens.
///
/// The id order is significant and fixed: `@entity0..@entity(N-1)` occupy
/// ids `0..N`, the word list follows in file order, then `<UNK>`,
/// `@placeholder`, and `<SEP>` (only when requested).
///
/// Duplicate words in the list keep the last occurrence's id in the
/// token-to-id map (a warning is logged per duplicate); earlier ids remain
/// decodable but are unreachable when encoding.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, TokenId>,
    n_entities: usize,
    unk: TokenId,
    placeholder: TokenId,
    sep: Option<TokenId>,
}

impl Vocabulary {
    /// Builds a vocabulary from a newline-delimited word list file.
    ///
    /// `n_entities` fixes how many `@entityN` placeholders lead the
    /// vocabulary; `need_sep` appends `<SEP>` after the special tokens.
    pub fn from_word_file(path: &Path, n_entities: usize, need_sep: bool) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| PrepError::Io {
            path: path.to_owned(),
            source,
        })?;
        Ok(Self::from_words(
            text.lines().map(str::to_owned),
            n_entities,
            need_sep,
        ))
    }

    /// Builds a vocabulary from an in-memory word sequence.
    pub fn from_words<I>(words: I, n_entities: usize, need_sep: bool) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut tokens: Vec<String> = (0..n_entities)
            .map(|i| format!("{ENTITY_PREFIX}{i}"))
            .collect();
        tokens.extend(words);
        tokens.push(UNK_TOKEN.to_owned());
        tokens.push(PLACEHOLDER_TOKEN.to_owned());
        if need_sep {
            tokens.push(SEP_TOKEN.to_owned());
        }

        let mut index = HashMap::with_capacity(tokens.len());
        for (id, token) in tokens.iter().enumerate() {
            let id = id as TokenId;
            if let Some(previous) = index.insert(token.clone(), id) {
                warn!(token = %token, first = previous, second = id,
                      "duplicate vocabulary token, keeping the later id");
            }
        }

        let unk = index[UNK_TOKEN];
        let placeholder = index[PLACEHOLDER_TOKEN];
        let sep = need_sep.then(|| index[SEP_TOKEN]);

        Self {
            tokens,
            index,
            n_entities,
            unk,
            placeholder,
            sep,
        }
    }

    /// Total number of tokens, including entities and special tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the vocabulary holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of `@entityN` placeholder tokens.
    #[must_use]
    pub fn n_entities(&self) -> usize {
        self.n_entities
    }

    /// Looks up the id of a token, if present.
    #[must_use]
    pub fn id_of(&self, token: &str) -> Option<TokenId> {
        self.index.get(token).copied()
    }

    /// Decodes an id back to its token, if in range.
    #[must_use]
    pub fn token_of(&self, id: TokenId) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Id of the `<UNK>` token.
    #[must_use]
    pub fn unk_id(&self) -> TokenId {
        self.unk
    }

    /// Id of the `@placeholder` token.
    #[must_use]
    pub fn placeholder_id(&self) -> TokenId {
        self.placeholder
    }

    /// Id of the `<SEP>` token, when the vocabulary was built with one.
    #[must_use]
    pub fn sep_id(&self) -> Option<TokenId> {
        self.sep
    }
}
