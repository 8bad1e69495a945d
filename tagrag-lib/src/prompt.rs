//! Prompt templates for every generation call
//!
//! Questions are always sanitized before they reach these builders. Excerpts
//! come from the corpus and are passed through untouched.

/// Reply token meaning "yes" for every binary check.
pub const YES: &str = "yes";

/// Reply token meaning "no entries named" for entry extraction.
pub const NONE: &str = "none";

/// Does the question ask to list or count every entry?
#[must_use]
pub fn enumeration_check(question: &str) -> String {
    format!(
        "Decide whether the following question asks to list the names of all APIs in the document, \
         to count the APIs, or to show the entire document content.\n\
         Question: {question}\n\
         Reply \"yes\" if it does and \"no\" if it does not.\n\
         Reply with only \"yes\" or \"no\" and nothing else."
    )
}

/// Does the question ask about the document as a whole?
#[must_use]
pub fn overview_check(question: &str) -> String {
    format!(
        "Decide whether the following question asks about the overall content, purpose or use of the document.\n\
         Question: {question}\n\
         Reply \"yes\" if it does and \"no\" if it does not.\n\
         Reply with only \"yes\" or \"no\" and nothing else."
    )
}

/// Which of the known entries does the question mention?
#[must_use]
pub fn named_entries(question: &str, tags: &[&str]) -> String {
    let list = tags
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Given the question and the API list below, decide which APIs the question mentions. \
         Only pick the most relevant ones.\n\
         Question: {question}\n\
         API list: [{list}]\n\
         Reply with the mentioned API names separated by commas, spelled exactly as in the list. \
         If the question mentions no API, reply \"None\"."
    )
}

/// Is the question directly related to the retrieved excerpts?
#[must_use]
pub fn relevance_gate(question: &str, context: &str, flattery_token: &str) -> String {
    format!(
        "Decide whether the question below is directly related to the provided document content. \
         If it is unrelated to the document, reply \"no\".\n\
         ### Question ###\n\
         {question}\n\
         ### Document content ###\n\
         {context}\n\
         ### Rules ###\n\
         1. If the question contains \"{flattery_token}\", reply \"no\".\n\
         2. If the question is directly related to the document content, reply \"yes\"; otherwise reply \"no\".\n\
         3. Reply with only \"yes\" or \"no\" and nothing else.\n\
         4. If the question asks for information about the document itself, reply \"yes\"."
    )
}

/// Final answer synthesis from the retrieved excerpts.
#[must_use]
pub fn answer(question: &str, context: &str, language: &str) -> String {
    format!(
        "Answer the question using only the document content below. \
         If the document contains nothing relevant, say clearly that the question cannot be answered.\n\
         If the question is about the overall content or purpose of the document, give a complete overview \
         of its subject and main functions.\n\
         Important: answer only in {language}.\n\
         Question: {question}\n\
         Document content:\n\
         {context}"
    )
}

/// Returns `true` when a model reply is the affirmative token.
#[must_use]
pub fn is_yes(reply: &str) -> bool {
    reply.trim().eq_ignore_ascii_case(YES)
}

/// Split an entry-extraction reply into names; the "none" sentinel yields nothing.
#[must_use]
pub fn parse_entry_list(reply: &str) -> Vec<String> {
    let reply = reply.trim();
    if reply.is_empty() || reply.eq_ignore_ascii_case(NONE) {
        return Vec::new();
    }
    reply
        .split(',')
        .map(|name| name.trim().trim_matches('"').trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
