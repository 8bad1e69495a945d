//! Intent classification
//!
//! Before any similarity search the question is checked for three special
//! intents, each a narrow query against the generation service:
//!
//! - enumeration: "list all APIs", "how many APIs are there"
//! - overview: "what is this document about"
//! - named lookup: the question names one or more known tags
//!
//! A failing check never aborts the query. It degrades to "not this intent"
//! so retrieval falls through to the broader general search.

use tracing::{debug, warn};

use crate::corpus::Corpus;
use crate::generate::Generator;
use crate::prompt;
use crate::Result;

/// Resolved retrieval intent for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// List every tag and the count
    Enumeration,
    /// Summarize the whole corpus
    Overview,
    /// Fetch the named entries in the order given
    NamedLookup(Vec<String>),
    /// Similarity and keyword search
    GeneralSearch,
}

/// Classifier issuing the intent checks through a [`Generator`].
pub struct IntentClassifier<'g, G: Generator + ?Sized> {
    generator: &'g G,
}

impl<'g, G: Generator + ?Sized> IntentClassifier<'g, G> {
    #[must_use]
    pub fn new(generator: &'g G) -> Self {
        Self { generator }
    }

    /// Ask whether the question wants the full tag list or count.
    pub fn is_enumeration_intent(&self, question: &str) -> Result<bool> {
        let reply = self.generator.generate(&prompt::enumeration_check(question))?;
        Ok(prompt::is_yes(&reply))
    }

    /// Ask whether the question is about the corpus as a whole.
    pub fn is_overview_intent(&self, question: &str) -> Result<bool> {
        let reply = self.generator.generate(&prompt::overview_check(question))?;
        Ok(prompt::is_yes(&reply))
    }

    /// Ask which of `tags` the question names.
    ///
    /// Names are returned as the service spelled them; callers filter out
    /// anything absent from the corpus.
    pub fn extract_named_entries(&self, question: &str, tags: &[&str]) -> Result<Vec<String>> {
        let reply = self
            .generator
            .generate(&prompt::named_entries(question, tags))?;
        Ok(prompt::parse_entry_list(&reply))
    }

    /// Run the checks in priority order and return the first intent that applies.
    ///
    /// Later checks are skipped once one matches.
    pub fn resolve(&self, question: &str, corpus: &Corpus) -> Intent {
        if or_default(self.is_enumeration_intent(question), "enumeration") {
            debug!("resolved enumeration intent");
            return Intent::Enumeration;
        }
        if or_default(self.is_overview_intent(question), "overview") {
            debug!("resolved overview intent");
            return Intent::Overview;
        }

        let tags: Vec<&str> = corpus.tags().collect();
        let named = or_default(self.extract_named_entries(question, &tags), "named entry");
        if !named.is_empty() {
            debug!(?named, "resolved named lookup");
            return Intent::NamedLookup(named);
        }

        debug!("falling back to general search");
        Intent::GeneralSearch
    }
}

fn or_default<T: Default>(result: Result<T>, check: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!(check, error = %e, "intent check failed, assuming no match");
        T::default()
    })
}
