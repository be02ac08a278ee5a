//! Word-chain validation.

use std::collections::HashSet;
use std::sync::Arc;

use derive_more::{Display, Error};
use tracing::{debug, instrument};

use crate::WordDictionary;
use crate::dictionary::normalize;

/// Why a submitted word was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum IllegalWordReason {
    /// Nothing but whitespace was submitted.
    #[display("no word was given")]
    Empty,
    /// The word is not in the dictionary.
    #[display("not in the dictionary")]
    NotInDictionary,
    /// The word was already played this session.
    #[display("already used")]
    AlreadyUsed,
    /// The word does not start with the last letter of the previous word.
    #[display("must start with '{}'", expected)]
    BrokenChain {
        /// Letter the word had to start with.
        expected: char,
    },
}

/// A word refused by a [`WordValidator`]; its submitter is eliminated.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Illegal word '{}': {}", word, reason)]
pub struct IllegalWordError {
    /// The word as submitted.
    pub word: String,
    /// Why it was refused.
    pub reason: IllegalWordReason,
}

impl IllegalWordError {
    /// Creates a new illegal word error.
    pub fn new(word: impl Into<String>, reason: IllegalWordReason) -> Self {
        Self {
            word: word.into(),
            reason,
        }
    }
}

/// Decides whether a submitted word is legal given the words before it.
///
/// A validator is stateful for the length of one session.
pub trait WordValidator: Send {
    /// Submits the next word of the chain.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalWordError`] if the word breaks the rules; the chain is
    /// left unchanged in that case.
    fn submit_word(&mut self, word: &str) -> Result<(), IllegalWordError>;
}

/// Shiritori rules: each word must be a dictionary word that has not been
/// played yet and starts with the last letter of the previous word.
#[derive(Debug, Clone)]
pub struct ShiritoriValidator {
    dictionary: Arc<WordDictionary>,
    used: HashSet<String>,
    last_word: Option<String>,
}

impl ShiritoriValidator {
    /// Creates a validator with an empty chain.
    #[instrument(skip(dictionary), fields(words = dictionary.len()))]
    pub fn new(dictionary: Arc<WordDictionary>) -> Self {
        Self {
            dictionary,
            used: HashSet::new(),
            last_word: None,
        }
    }

    /// The most recently accepted word.
    pub fn last_word(&self) -> Option<&str> {
        self.last_word.as_deref()
    }

    /// Number of words accepted so far.
    pub fn chain_len(&self) -> usize {
        self.used.len()
    }

    fn expected_initial(&self) -> Option<char> {
        self.last_word.as_deref().and_then(|w| w.chars().last())
    }
}

impl WordValidator for ShiritoriValidator {
    #[instrument(skip(self))]
    fn submit_word(&mut self, word: &str) -> Result<(), IllegalWordError> {
        let normalized = normalize(word);
        if normalized.is_empty() {
            return Err(IllegalWordError::new(word, IllegalWordReason::Empty));
        }
        if !self.dictionary.contains(&normalized) {
            return Err(IllegalWordError::new(word, IllegalWordReason::NotInDictionary));
        }
        if self.used.contains(&normalized) {
            return Err(IllegalWordError::new(word, IllegalWordReason::AlreadyUsed));
        }
        if let Some(expected) = self.expected_initial()
            && !normalized.starts_with(expected)
        {
            return Err(IllegalWordError::new(
                word,
                IllegalWordReason::BrokenChain { expected },
            ));
        }

        debug!(word = %normalized, chain_len = self.used.len() + 1, "Word accepted");
        self.used.insert(normalized.clone());
        self.last_word = Some(normalized);
        Ok(())
    }
}
