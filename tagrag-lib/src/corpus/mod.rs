//! Tag-structured document corpus
//!
//! A corpus source is a markdown-ish text where every line starting with a
//! single top-level heading marker (`# `) opens a new tagged section:
//!
//! ```text
//! # Login API
//! Allows user authentication via token.
//!
//! # Export API
//! Generates CSV exports of reports.
//! ```
//!
//! The corpus is parsed again for every query; nothing is cached between
//! calls, so parsing must stay deterministic for a fixed source.
//!
//! # Usage
//!
//! ```ignore
//! use tagrag_lib::corpus::{CorpusSource, FileSource};
//!
//! let source = FileSource::new("manual.md");
//! let corpus = source.load()?;
//! for tag in corpus.tags() {
//!     println!("{tag}");
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One tagged section of the corpus
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Document {
    /// Unique topic/API name taken from the heading
    pub tag: String,
    /// Section text following the heading, trimmed
    pub body: String,
}

/// Ordered mapping from tag to document.
///
/// Iteration follows source order. Inserting an existing tag replaces its body
/// but keeps the position of the first occurrence.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Corpus {
    documents: Vec<Document>,
    positions: HashMap<String, usize>,
}

impl Corpus {
    /// Create an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, last write wins.
    pub fn insert(&mut self, tag: String, body: String) {
        match self.positions.get(&tag) {
            Some(&i) => self.documents[i].body = body,
            None => {
                self.positions.insert(tag.clone(), self.documents.len());
                self.documents.push(Document { tag, body });
            }
        }
    }

    /// Look up a document by exact tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Document> {
        self.positions.get(tag).map(|&i| &self.documents[i])
    }

    /// Returns `true` if the tag exists.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.positions.contains_key(tag)
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.tag.as_str())
    }

    /// Documents in insertion order.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Iterate over documents in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Returns the number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no documents were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Trait for anything that can produce a fresh corpus snapshot.
///
/// Implementations read their source in full on every call.
pub trait CorpusSource: Send + Sync {
    /// Parse the current contents of the source.
    fn load(&self) -> Result<Corpus>;

    /// Human readable description used in logs.
    fn describe(&self) -> String;
}

/// List every tag of a freshly loaded corpus in source order.
pub fn list_tags(source: &(impl CorpusSource + ?Sized)) -> Result<Vec<String>> {
    Ok(source.load()?.tags().map(str::to_string).collect())
}

mod parser;
mod source;

pub use parser::*;
pub use source::*;
