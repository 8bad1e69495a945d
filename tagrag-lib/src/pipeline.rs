//! Question answering pipeline
//!
//! ```text
//! START ──> RETRIEVE ──> GENERATE ──> DONE
//! ```
//!
//! One [`QueryRecord`] flows through the stages and is mutated in place.
//! RETRIEVE always hands over to GENERATE, even with an empty or sentinel
//! result; the relevance gate decides whether anything useful was found.
//! A failed stage drops the record, so callers only ever see a finished
//! answer or an error.
//!
//! # Usage
//!
//! ```ignore
//! use tagrag_lib::pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::new(source, embedder, generator, config);
//! println!("{}", pipeline.answer("列出所有 API")?);
//! ```

use tracing::{debug, info};

use crate::answer::AnswerGenerator;
use crate::config::PipelineConfig;
use crate::corpus::{self, CorpusSource};
use crate::embed::Embedder;
use crate::generate::Generator;
use crate::retrieve::{Excerpt, HybridRetriever};
use crate::sanitize::sanitize;
use crate::Result;

/// Working state of a single question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRecord {
    /// Question as the caller asked it
    pub question: String,
    /// Excerpts produced by retrieval, in delivery order
    pub retrieved: Vec<Excerpt>,
    /// Final answer text
    pub answer: String,
}

impl QueryRecord {
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }
}

/// Pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Retrieve,
    Generate,
    Done,
}

/// Retrieval and gated generation over a corpus source.
///
/// The embedder and generator are owned by the pipeline but constructed by
/// the caller; the corpus is re-read from `source` for every question.
pub struct Pipeline<S: CorpusSource, E: Embedder, G: Generator> {
    source: S,
    embedder: E,
    generator: G,
    config: PipelineConfig,
}

impl<S: CorpusSource, E: Embedder, G: Generator> Pipeline<S, E, G> {
    #[must_use]
    pub fn new(source: S, embedder: E, generator: G, config: PipelineConfig) -> Self {
        Self {
            source,
            embedder,
            generator,
            config,
        }
    }

    /// Answer a question end to end.
    pub fn answer(&mut self, question: &str) -> Result<String> {
        self.run(question).map(|record| record.answer)
    }

    /// Run the full pipeline and return the finished record.
    pub fn run(&mut self, question: &str) -> Result<QueryRecord> {
        let mut record = QueryRecord::default();
        let mut stage = Stage::Start;

        loop {
            debug!(?stage, "pipeline stage");
            stage = match stage {
                Stage::Start => {
                    record = QueryRecord::new(question);
                    Stage::Retrieve
                }
                Stage::Retrieve => {
                    record.retrieved = self.retrieve_only(&record.question)?;
                    Stage::Generate
                }
                Stage::Generate => {
                    record.answer = AnswerGenerator::new(&self.generator, &self.config)
                        .generate(&record.question, &record.retrieved)?;
                    Stage::Done
                }
                Stage::Done => break,
            };
        }

        info!(excerpts = record.retrieved.len(), "answered question");
        Ok(record)
    }

    /// Run only the retrieval stage for a question.
    pub fn retrieve_only(&mut self, question: &str) -> Result<Vec<Excerpt>> {
        let question = sanitize(question);
        let corpus = self.source.load()?;
        info!(
            source = %self.source.describe(),
            documents = corpus.len(),
            "retrieving"
        );
        HybridRetriever::new(&mut self.embedder, &self.generator, &self.config)
            .retrieve(&question, &corpus)
    }

    /// List every tag of the current corpus in source order.
    pub fn list_tags(&self) -> Result<Vec<String>> {
        corpus::list_tags(&self.source)
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns a reference to the generator.
    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }
}
