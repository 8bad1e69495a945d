use crate::corpus::Corpus;

/// Heading marker that opens a new tagged section.
pub const HEADING_MARKER: &str = "# ";

/// Tag parser - splits a source on top-level headings
///
/// Lines before the first heading are ignored. A heading with an empty title
/// discards everything up to the next heading, and a heading with no body
/// lines at all is not recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagParser;

impl TagParser {
    /// Parse a complete source text into a corpus.
    #[must_use]
    pub fn parse(&self, content: &str) -> Corpus {
        let mut corpus = Corpus::new();
        let mut current: Option<&str> = None;
        let mut lines: Vec<&str> = Vec::new();

        for line in content.split('\n') {
            if let Some(title) = line.strip_prefix(HEADING_MARKER) {
                flush(&mut corpus, current, &lines);
                let title = title.trim();
                current = (!title.is_empty()).then_some(title);
                lines.clear();
            } else if current.is_some() {
                lines.push(line);
            }
        }
        flush(&mut corpus, current, &lines);

        corpus
    }
}

fn flush(corpus: &mut Corpus, tag: Option<&str>, lines: &[&str]) {
    let Some(tag) = tag else {
        return;
    };
    if lines.is_empty() {
        return;
    }
    corpus.insert(tag.to_string(), lines.join("\n").trim().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANUAL: &str = "# Login API\nAllows user authentication via token.\n\n# Export API\nGenerates CSV exports of reports.\n";

    #[test]
    fn test_two_sections() {
        let corpus = TagParser.parse(MANUAL);

        assert_eq!(corpus.len(), 2);
        assert_eq!(
            corpus.get("Login API").unwrap().body,
            "Allows user authentication via token."
        );
        assert_eq!(
            corpus.get("Export API").unwrap().body,
            "Generates CSV exports of reports."
        );
        let tags: Vec<_> = corpus.tags().collect();
        assert_eq!(tags, vec!["Login API", "Export API"]);
    }

    #[test]
    fn test_preamble_discarded() {
        let corpus = TagParser.parse("intro text\nmore intro\n# Only\nbody");
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get("Only").unwrap().body, "body");
    }

    #[test]
    fn test_no_headings() {
        assert!(TagParser.parse("just some text\nwithout headings").is_empty());
        assert!(TagParser.parse("").is_empty());
    }

    #[test]
    fn test_subheadings_stay_in_body() {
        let corpus = TagParser.parse("# Top\n## Params\n- id\n### Notes\nnone");
        assert_eq!(corpus.len(), 1);
        assert_eq!(
            corpus.get("Top").unwrap().body,
            "## Params\n- id\n### Notes\nnone"
        );
    }

    #[test]
    fn test_multiline_body_trimmed() {
        let corpus = TagParser.parse("#  Spaced Tag  \n\n  line one\nline two  \n\n");
        assert_eq!(corpus.get("Spaced Tag").unwrap().body, "line one\nline two");
    }

    #[test]
    fn test_repeated_heading_last_wins() {
        let corpus = TagParser.parse("# A\nfirst\n# B\nb\n# A\nsecond");
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("A").unwrap().body, "second");
        let tags: Vec<_> = corpus.tags().collect();
        assert_eq!(tags, vec!["A", "B"]);
    }

    #[test]
    fn test_heading_without_lines_skipped() {
        let corpus = TagParser.parse("# Empty\n# Full\ncontent");
        assert_eq!(corpus.len(), 1);
        assert!(corpus.get("Empty").is_none());
    }

    #[test]
    fn test_marker_requires_space() {
        let corpus = TagParser.parse("# Real\n#hashtag line\nbody");
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get("Real").unwrap().body, "#hashtag line\nbody");
    }

    #[test]
    fn test_round_trip_n_sections() {
        let mut source = String::new();
        for i in 0..25 {
            source.push_str(&format!("# Tag {i}\nBody number {i}\nsecond line {i}\n\n"));
        }
        let corpus = TagParser.parse(&source);

        assert_eq!(corpus.len(), 25);
        for (i, doc) in corpus.iter().enumerate() {
            assert_eq!(doc.tag, format!("Tag {i}"));
            assert_eq!(doc.body, format!("Body number {i}\nsecond line {i}"));
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(TagParser.parse(MANUAL), TagParser.parse(MANUAL));
    }
}
