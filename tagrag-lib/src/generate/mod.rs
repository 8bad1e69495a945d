//! Text generation services
//!
//! Every classifier check, the relevance gate and answer synthesis are
//! instances of one operation: send a prompt, get text back. Failures are
//! reported as [`Error::Generation`](crate::Error::Generation); callers decide
//! whether to degrade or propagate.

use crate::Result;

/// Trait implemented by concrete generation backends.
pub trait Generator: Send + Sync {
    /// Send a single prompt and return the raw response text.
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

mod gemini;
mod openai;

pub use gemini::*;
pub use openai::*;
