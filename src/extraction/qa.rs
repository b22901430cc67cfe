//! Question/answer segmentation of free-form review text.
//!
//! Review sections are often a transcript of a questionnaire: the question text followed by the
//! reviewer's answer, all run together in one paragraph. Given the known question phrasings (as
//! regular expressions, tried in order), the text is cut at every question boundary and each
//! answer is attached to the question before it.
//!
//! Behaviour worth knowing about:
//!
//! - Patterns are regular expressions used verbatim. A `*` standing for the vendor name is a
//!   quantifier on the preceding character, not a wildcard for the name, so the name usually ends
//!   up at the start of the following answer. [`strip_leading_question`] removes it up to the
//!   first `?`.
//! - Text before the first recognized question is dropped.
//! - A question that gets no answer is still emitted, without an `A:` line.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static LEADING_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*?\?\s*").expect("leading question pattern is valid")
});

/// One recognized question and the answer text that followed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaPair {
    /// Question as found in the text, ending in `?` or `.`.
    pub question: String,
    /// Answer segments joined by a space; `None` when the next question followed immediately.
    pub answer: Option<String>,
}

/// Ordered, pre-compiled question phrasings.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    matchers: Option<Matchers>,
}

#[derive(Debug, Clone)]
struct Matchers {
    /// Alternation of every pattern, used to locate boundaries anywhere in the text.
    boundary: Regex,
    /// Same alternation anchored at the start, used to classify a trimmed segment.
    leading: Regex,
}

impl QuestionSet {
    /// Compile `patterns` into one alternation. Earlier patterns win when several match at the
    /// same position.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        if patterns.is_empty() {
            return Ok(Self { matchers: None });
        }
        let alternation = patterns
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            matchers: Some(Matchers {
                boundary: Regex::new(&alternation)?,
                leading: Regex::new(&format!("^(?:{alternation})"))?,
            }),
        })
    }

    /// Structured pairs in document order.
    pub fn pairs(&self, text: &str) -> Vec<QaPair> {
        let Some(matchers) = &self.matchers else {
            return Vec::new();
        };

        let mut pairs = Vec::new();
        let mut question: Option<String> = None;
        let mut answers: Vec<String> = Vec::new();

        for segment in split_keeping_matches(&matchers.boundary, text) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            if matchers.leading.is_match(segment) {
                if let Some(previous) = question.take() {
                    pairs.push(QaPair {
                        question: previous,
                        answer: join_answers(&answers),
                    });
                }
                answers.clear();

                let mut next = segment.to_string();
                if !next.ends_with('?') && !next.ends_with('.') {
                    next.push('?');
                }
                question = Some(next);
            } else {
                answers.push(strip_leading_question(segment.trim_start_matches('?').trim()));
            }
        }

        if let Some(last) = question {
            pairs.push(QaPair {
                question: last,
                answer: join_answers(&answers),
            });
        }

        pairs
    }

    /// Readable rendering: `Q:`/`A:` lines, answered pairs separated by a blank line. Empty when
    /// no question is recognized.
    pub fn extract(&self, text: &str) -> String {
        render(&self.pairs(text))
    }
}

/// Compile `patterns` and extract in one go. Prefer a cached [`QuestionSet`] on hot paths.
pub fn extract_qa<S: AsRef<str>>(text: &str, patterns: &[S]) -> Result<String, regex::Error> {
    Ok(QuestionSet::new(patterns)?.extract(text))
}

/// Remove everything up to and including the first `?` (and the whitespace after it).
pub fn strip_leading_question(answer: &str) -> String {
    LEADING_QUESTION.replace(answer, "").trim().to_string()
}

fn join_answers(answers: &[String]) -> Option<String> {
    (!answers.is_empty()).then(|| answers.join(" "))
}

fn render(pairs: &[QaPair]) -> String {
    let mut lines = Vec::with_capacity(pairs.len() * 3);
    for (index, pair) in pairs.iter().enumerate() {
        lines.push(format!("Q: {}", pair.question));
        if let Some(answer) = &pair.answer {
            lines.push(format!("A: {answer}"));
            if index + 1 < pairs.len() {
                lines.push(String::new());
            }
        }
    }
    lines.join("\n")
}

/// Text between matches interleaved with the matches themselves.
fn split_keeping_matches<'t>(regex: &Regex, text: &'t str) -> Vec<&'t str> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in regex.find_iter(text) {
        segments.push(&text[cursor..found.start()]);
        segments.push(found.as_str());
        cursor = found.end();
    }
    segments.push(&text[cursor..]);
    segments
}
