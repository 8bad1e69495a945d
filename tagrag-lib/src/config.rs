//! Pipeline configuration
//!
//! Every knob has a default, so an empty TOML file (or no file at all) is a
//! valid configuration.
//!
//! ```toml
//! top_k = 3
//! overview_prefix_chars = 100
//! flattery_token = "讚"
//! answer_language = "Traditional Chinese"
//! timeout_secs = 30
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sanitize::sanitize;
use crate::{Error, Result};

/// Tunable parameters of the retrieval and answer pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of documents kept by each similarity ranking
    pub top_k: usize,
    /// Characters of each body shown in overview excerpts
    pub overview_prefix_chars: usize,
    /// Questions containing this token are always refused
    pub flattery_token: String,
    /// Fixed answer when the relevance gate rejects a question
    pub refusal_message: String,
    /// Excerpt used when no search strategy found anything
    pub no_content_sentinel: String,
    /// Language the final answer must be written in
    pub answer_language: String,
    /// Per-request timeout for external services, in seconds
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            overview_prefix_chars: 100,
            flattery_token: "讚".to_string(),
            refusal_message: "對不起，這個問題與文件內容無關。".to_string(),
            no_content_sentinel: "知識庫中無相關內容".to_string(),
            answer_language: "Traditional Chinese".to_string(),
            timeout_secs: 30,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// External call timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        if self.flattery_token.trim().is_empty() {
            return Err(Error::Config("flattery_token must not be empty".to_string()));
        }
        // questions are sanitized before the token is searched for
        if sanitize(&self.flattery_token) != self.flattery_token {
            return Err(Error::Config(format!(
                "flattery_token {:?} would not survive question sanitizing",
                self.flattery_token
            )));
        }
        Ok(())
    }
}
