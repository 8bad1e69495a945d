//! tagrag - question answering over tag-structured documents
//!
//! # Architecture
//!
//! ```text
//! Question -> Sanitizer -> Intent Classifier ──┐
//!                                              v
//! Corpus Source -> Tag Parser -> Corpus -> Hybrid Retriever -> Excerpts
//!                                                                 |
//!                         Answer <- Relevance-Gated Generator <───┘
//! ```
//!
//! The embedding and generation services are external. They sit behind the
//! [`embed::Embedder`] and [`generate::Generator`] traits and are handed to
//! the [`pipeline::Pipeline`] by the caller.
//!
//! # Example
//!
//! ```ignore
//! use tagrag_lib::{
//!     config::PipelineConfig,
//!     corpus::FileSource,
//!     embed::MiniLmEmbedder,
//!     generate::GeminiGenerator,
//!     pipeline::Pipeline,
//! };
//!
//! let config = PipelineConfig::default();
//! let generator = GeminiGenerator::new(&api_key, "gemini-1.5-flash", config.timeout())?;
//! let mut pipeline = Pipeline::new(
//!     FileSource::new("manual.md"),
//!     MiniLmEmbedder::new()?,
//!     generator,
//!     config,
//! );
//!
//! let answer = pipeline.answer("How do I export reports?")?;
//! ```

pub mod answer;
pub mod config;
pub mod corpus;
pub mod embed;
pub mod error;
pub mod generate;
pub mod intent;
pub mod pipeline;
pub mod prompt;
pub mod retrieve;
pub mod sanitize;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
