//! Word dictionary used by the validator.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use derive_more::{Display, Error};
use tracing::{debug, info, instrument};

/// Read-only set of legal words.
///
/// Words are stored trimmed and lowercased; lookups normalize the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDictionary {
    words: HashSet<String>,
}

impl WordDictionary {
    /// Builds a dictionary from an explicit word list.
    pub fn of<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| normalize(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Parses a dictionary from comma- or newline-delimited text.
    #[instrument(skip(text), fields(bytes = text.len()))]
    pub fn parse(text: &str) -> Self {
        let dictionary = Self::of(text.split([',', '\n']));
        debug!(words = dictionary.len(), "Parsed dictionary");
        dictionary
    }

    /// Reads a comma- or newline-delimited word stream.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError`] if the stream cannot be read as UTF-8.
    #[instrument(skip(reader))]
    pub fn from_reader(mut reader: impl Read) -> Result<Self, DictionaryError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| DictionaryError::new(format!("Failed to read word stream: {}", e)))?;
        Ok(Self::parse(&text))
    }

    /// Loads a dictionary file.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError`] if the file cannot be opened or read.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            DictionaryError::new(format!(
                "Failed to open dictionary {}: {}",
                path.display(),
                e
            ))
        })?;
        let dictionary = Self::from_reader(file)?;
        info!(words = dictionary.len(), "Dictionary loaded");
        Ok(dictionary)
    }

    /// Returns `true` if `word` is a legal word.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&normalize(word))
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the dictionary has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Canonical form used for storage and lookup.
pub(crate) fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Dictionary loading error.
#[derive(Debug, Clone, Display, Error)]
#[display("Dictionary error: {} at {}:{}", message, file, line)]
pub struct DictionaryError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DictionaryError {
    /// Creates a new dictionary error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
