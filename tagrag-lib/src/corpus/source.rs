use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::corpus::{Corpus, CorpusSource, TagParser};
use crate::{Error, Result};

/// Corpus backed by a file on disk, re-read on every load.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for the given path. The file is not touched until [`load`](CorpusSource::load).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path this source reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CorpusSource for FileSource {
    fn load(&self) -> Result<Corpus> {
        let bytes = fs::read(&self.path)
            .map_err(|e| Error::Corpus(format!("{}: {e}", self.path.display())))?;
        let corpus = TagParser.parse(&String::from_utf8_lossy(&bytes));
        debug!(path = %self.path.display(), documents = corpus.len(), "loaded corpus");
        Ok(corpus)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Corpus backed by an in-memory string.
#[derive(Debug, Clone, Default)]
pub struct TextSource {
    text: String,
}

impl TextSource {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl CorpusSource for TextSource {
    fn load(&self) -> Result<Corpus> {
        Ok(TagParser.parse(&self.text))
    }

    fn describe(&self) -> String {
        format!("<in-memory, {} bytes>", self.text.len())
    }
}
