//! Relevance-gated answer generation
//!
//! Answering takes two generation calls. The first is a strict yes/no gate
//! asking whether the question relates to the retrieved excerpts; anything
//! other than a literal "yes" ends with the configured refusal message. Only
//! a passing gate leads to the second call, which writes the answer from the
//! excerpts alone.
//!
//! Questions containing the flattery token are refused before the gate is
//! even asked.

use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::generate::Generator;
use crate::prompt;
use crate::retrieve::{join_excerpts, Excerpt};
use crate::sanitize::sanitize;
use crate::Result;

/// Outcome of the relevance gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// The service confirmed the question relates to the excerpts
    Related,
    /// The service answered anything but "yes"
    Unrelated,
    /// The question contains the flattery token; no call was made
    Flattery,
}

impl GateVerdict {
    #[must_use]
    pub fn passed(self) -> bool {
        self == Self::Related
    }
}

/// Generator wrapped with the relevance gate.
pub struct AnswerGenerator<'a, G: Generator + ?Sized> {
    generator: &'a G,
    config: &'a PipelineConfig,
}

impl<'a, G: Generator + ?Sized> AnswerGenerator<'a, G> {
    #[must_use]
    pub fn new(generator: &'a G, config: &'a PipelineConfig) -> Self {
        Self { generator, config }
    }

    /// Decide whether `question` is related to the joined excerpts.
    ///
    /// `question` must already be sanitized.
    pub fn check_relevance(&self, question: &str, context: &str) -> Result<GateVerdict> {
        if question.contains(self.config.flattery_token.as_str()) {
            return Ok(GateVerdict::Flattery);
        }
        let reply = self.generator.generate(&prompt::relevance_gate(
            question,
            context,
            &self.config.flattery_token,
        ))?;
        debug!(reply = reply.trim(), "relevance gate replied");
        Ok(if prompt::is_yes(&reply) {
            GateVerdict::Related
        } else {
            GateVerdict::Unrelated
        })
    }

    /// Produce the final answer for `question` from `excerpts`.
    ///
    /// Returns the refusal message when the gate does not pass. Service
    /// failures from either call are returned as errors.
    pub fn generate(&self, question: &str, excerpts: &[Excerpt]) -> Result<String> {
        let question = sanitize(question);
        let context = join_excerpts(excerpts);

        let verdict = self.check_relevance(&question, &context)?;
        if !verdict.passed() {
            warn!(?verdict, "question refused by relevance gate");
            return Ok(self.config.refusal_message.clone());
        }

        let reply = self.generator.generate(&prompt::answer(
            &question,
            &context,
            &self.config.answer_language,
        ))?;
        Ok(reply.trim().to_string())
    }
}
