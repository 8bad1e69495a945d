//! Hybrid retrieval
//!
//! Turns a sanitized question and a corpus snapshot into an ordered list of
//! excerpts. Strategies are tried in a fixed priority order:
//!
//! ```text
//! Enumeration ──> one excerpt listing every tag            (terminal)
//! Overview ─────> one short excerpt per tag                (terminal)
//! NamedLookup ──> full body of each named tag that exists  (terminal, may be empty)
//! GeneralSearch:
//!     keyword AND-match ──> non-empty? return it alone
//!     similarity (tag, body) top-k ++ similarity (body, tag) top-k distinct bodies
//!     nothing at all ──> "no relevant content" sentinel
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tagrag_lib::retrieve::HybridRetriever;
//!
//! let mut retriever = HybridRetriever::new(&mut embedder, &generator, &config);
//! let excerpts = retriever.retrieve("how do I export reports", &corpus)?;
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::corpus::{Corpus, Document};
use crate::embed::{cosine_similarity, Embedder, Embedding};
use crate::generate::Generator;
use crate::intent::{Intent, IntentClassifier};
use crate::Result;

/// A formatted piece of context handed to the generation step.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Excerpt {
    /// Source tag, absent for synthetic excerpts (tag lists, sentinel)
    pub tag: Option<String>,
    /// Text as delivered to the generator
    pub text: String,
}

impl Excerpt {
    fn synthetic(text: String) -> Self {
        Self { tag: None, text }
    }

    /// "tag then body" layout used by lookups, keyword matches and the first ranking.
    fn tag_first(doc: &Document) -> Self {
        Self {
            tag: Some(doc.tag.clone()),
            text: format!("API: {}\nContent: {}", doc.tag, doc.body),
        }
    }

    /// "body then tag" layout used by the second ranking.
    fn body_first(doc: &Document) -> Self {
        Self {
            tag: Some(doc.tag.clone()),
            text: format!("Content: {}\nAPI: {}", doc.body, doc.tag),
        }
    }
}

impl fmt::Display for Excerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Join excerpts into the context block given to the generator.
#[must_use]
pub fn join_excerpts(excerpts: &[Excerpt]) -> String {
    excerpts
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A document with its similarity to the question.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'c> {
    pub document: &'c Document,
    pub score: f32,
}

/// Rank every document by cosine similarity to `query`, highest first.
///
/// `embeddings[i]` belongs to the i-th document of `corpus`. The sort is
/// stable, so equal scores keep corpus order.
#[must_use]
pub fn rank_by_similarity<'c>(
    query: &[f32],
    corpus: &'c Corpus,
    embeddings: &[Embedding],
) -> Vec<Scored<'c>> {
    let mut ranked: Vec<Scored<'c>> = corpus
        .iter()
        .zip(embeddings)
        .map(|(document, embedding)| Scored {
            document,
            score: cosine_similarity(query, embedding),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Documents whose `tag + " " + body` contains every whitespace token of the question.
///
/// Matching is case-sensitive substring search. A question with no tokens
/// matches every document.
#[must_use]
pub fn keyword_matches<'c>(question: &str, corpus: &'c Corpus) -> Vec<&'c Document> {
    let tokens: Vec<&str> = question.split_whitespace().collect();
    corpus
        .iter()
        .filter(|doc| {
            let haystack = format!("{} {}", doc.tag, doc.body);
            tokens.iter().all(|token| haystack.contains(token))
        })
        .collect()
}

/// Retriever combining intent shortcuts, keyword overlap and embedding similarity.
pub struct HybridRetriever<'a, E: Embedder + ?Sized, G: Generator + ?Sized> {
    embedder: &'a mut E,
    classifier: IntentClassifier<'a, G>,
    config: &'a PipelineConfig,
}

impl<'a, E: Embedder + ?Sized, G: Generator + ?Sized> HybridRetriever<'a, E, G> {
    #[must_use]
    pub fn new(embedder: &'a mut E, generator: &'a G, config: &'a PipelineConfig) -> Self {
        Self {
            embedder,
            classifier: IntentClassifier::new(generator),
            config,
        }
    }

    /// Resolve the question's intent and retrieve excerpts for it.
    ///
    /// `question` must already be sanitized.
    pub fn retrieve(&mut self, question: &str, corpus: &Corpus) -> Result<Vec<Excerpt>> {
        let intent = self.classifier.resolve(question, corpus);
        self.retrieve_for(&intent, question, corpus)
    }

    /// Retrieve excerpts for an already resolved intent.
    pub fn retrieve_for(
        &mut self,
        intent: &Intent,
        question: &str,
        corpus: &Corpus,
    ) -> Result<Vec<Excerpt>> {
        let excerpts = match intent {
            Intent::Enumeration => vec![self.enumerate(corpus)],
            Intent::Overview => self.overview(corpus),
            Intent::NamedLookup(names) => lookup(names, corpus),
            Intent::GeneralSearch => self.search(question, corpus)?,
        };
        debug!(count = excerpts.len(), "retrieved excerpts");
        Ok(excerpts)
    }

    fn enumerate(&self, corpus: &Corpus) -> Excerpt {
        let tags: Vec<&str> = corpus.tags().collect();
        Excerpt::synthetic(format!(
            "All APIs in the document ({}):\n{}",
            tags.len(),
            tags.join("\n")
        ))
    }

    fn overview(&self, corpus: &Corpus) -> Vec<Excerpt> {
        corpus
            .iter()
            .map(|doc| {
                let prefix: String = doc
                    .body
                    .chars()
                    .take(self.config.overview_prefix_chars)
                    .collect();
                Excerpt {
                    tag: Some(doc.tag.clone()),
                    text: format!("API: {}\nSummary: {prefix}...", doc.tag),
                }
            })
            .collect()
    }

    fn search(&mut self, question: &str, corpus: &Corpus) -> Result<Vec<Excerpt>> {
        // Keyword hits replace both rankings, so the embedder is only called
        // without them. An embedding outage therefore fails only those queries.
        let keyword = keyword_matches(question, corpus);
        if !keyword.is_empty() {
            debug!(matches = keyword.len(), "keyword match takes priority");
            return Ok(keyword.into_iter().map(Excerpt::tag_first).collect());
        }

        if corpus.is_empty() {
            return Ok(vec![Excerpt::synthetic(
                self.config.no_content_sentinel.clone(),
            )]);
        }

        let query = self.embedder.embed_query(question)?;
        let bodies: Vec<&str> = corpus.iter().map(|d| d.body.as_str()).collect();
        let embeddings = self.embedder.embed_documents(&bodies)?;

        let k = self.config.top_k;
        let by_tag = rank_by_similarity(&query, corpus, &embeddings);
        let by_body = rank_by_similarity(&query, corpus, &embeddings);

        let mut excerpts: Vec<Excerpt> = by_tag
            .iter()
            .take(k)
            .map(|s| Excerpt::tag_first(s.document))
            .collect();

        let mut seen = HashSet::new();
        excerpts.extend(
            by_body
                .iter()
                .filter(|s| seen.insert(s.document.body.as_str()))
                .take(k)
                .filter_map(|s| first_with_body(corpus, &s.document.body))
                .map(Excerpt::body_first),
        );

        if excerpts.is_empty() {
            excerpts.push(Excerpt::synthetic(self.config.no_content_sentinel.clone()));
        }
        Ok(excerpts)
    }
}

fn lookup(names: &[String], corpus: &Corpus) -> Vec<Excerpt> {
    names
        .iter()
        .filter_map(|name| corpus.get(name))
        .map(Excerpt::tag_first)
        .collect()
}

fn first_with_body<'c>(corpus: &'c Corpus, body: &str) -> Option<&'c Document> {
    corpus.iter().find(|doc| doc.body == body)
}
