//! Segmentation of raw manuscript text into words, sentences and paragraphs.
//!
//! Every span is a byte range into the original text. Sentence splitting is
//! punctuation-only: abbreviations, decimals and quoted dialogue are not
//! special-cased, and readability calibration depends on that.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());
static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());
static PARAGRAPH_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").unwrap());
static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)"|“([^”]*)”"#).unwrap());

/// A whitespace-delimited token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub word_count: usize,
}

impl Sentence {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub start: usize,
    pub end: usize,
    pub word_count: usize,
}

/// Immutable segmented view of one manuscript.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    words: Vec<Word>,
    sentences: Vec<Sentence>,
    paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let words = words(&text);
        let sentences = sentences(&text);
        let paragraphs = paragraphs(&text);
        Self {
            text,
            words,
            sentences,
            paragraphs,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Index of the sentence containing `offset`, if any.
    pub fn sentence_at(&self, offset: usize) -> Option<usize> {
        let idx = self.sentences.partition_point(|s| s.end <= offset);
        self.sentences
            .get(idx)
            .filter(|s| s.start <= offset)
            .map(|_| idx)
    }

    /// Byte range covered by the words `[start_word, end_word)`.
    pub fn word_span(&self, start_word: usize, end_word: usize) -> Range<usize> {
        if start_word >= end_word || end_word > self.words.len() {
            return 0..0;
        }
        self.words[start_word].start..self.words[end_word - 1].end
    }
}

/// Split on whitespace, dropping empty pieces.
pub fn words(text: &str) -> Vec<Word> {
    WORD_RE
        .find_iter(text)
        .map(|m| Word {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Split on runs of `.`, `!` and `?`, dropping blank pieces.
pub fn sentences(text: &str) -> Vec<Sentence> {
    split_trimmed(text, &SENTENCE_END_RE)
        .into_iter()
        .map(|(start, end)| {
            let piece = &text[start..end];
            Sentence {
                text: piece.to_string(),
                start,
                end,
                word_count: piece.split_whitespace().count(),
            }
        })
        .collect()
}

/// Split on blank lines.
pub fn paragraphs(text: &str) -> Vec<Paragraph> {
    split_trimmed(text, &PARAGRAPH_BREAK_RE)
        .into_iter()
        .map(|(start, end)| Paragraph {
            start,
            end,
            word_count: text[start..end].split_whitespace().count(),
        })
        .collect()
}

/// Byte ranges of text inside straight or curly double quotes, quote
/// marks excluded. An unmatched opening quote is ignored.
pub fn quoted_spans(text: &str) -> Vec<Range<usize>> {
    QUOTE_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.range())
        .collect()
}

/// Pieces of `text` between matches of `sep`, trimmed, as byte ranges.
fn split_trimmed(text: &str, sep: &Regex) -> Vec<(usize, usize)> {
    let mut pieces = Vec::new();
    let mut last = 0;
    let mut push = |from: usize, to: usize| {
        let raw = &text[from..to];
        let trimmed_start = raw.trim_start();
        let lead = raw.len() - trimmed_start.len();
        let trimmed = trimmed_start.trim_end();
        if !trimmed.is_empty() {
            pieces.push((from + lead, from + lead + trimmed.len()));
        }
    };
    for m in sep.find_iter(text) {
        push(last, m.start());
        last = m.end();
    }
    push(last, text.len());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_split_on_any_whitespace() {
        let w = words("  The\tcat \n sat.  ");
        let texts: Vec<_> = w.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["The", "cat", "sat."]);
        assert_eq!(w[0].start, 2);
        assert_eq!(w[2].end, 16);
    }

    #[test]
    fn test_sentences_split_on_punctuation_runs() {
        let s = sentences("Wait... what?! No. ");
        let texts: Vec<_> = s.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Wait", "what", "No"]);
        assert_eq!(s[1].start, 8);
    }

    #[test]
    fn test_sentences_do_not_special_case_abbreviations() {
        let s = sentences("Mr. Smith paid 3.50 dollars.");
        assert_eq!(s.len(), 3);
        assert_eq!(s[0].text, "Mr");
    }

    #[test]
    fn test_paragraphs_record_offsets_and_counts() {
        let text = "One two three.\n\n  \nFour five.\nSix.\n\n\n";
        let p = paragraphs(text);
        assert_eq!(p.len(), 2);
        assert_eq!(p[0].start, 0);
        assert_eq!(p[0].word_count, 3);
        assert_eq!(&text[p[1].start..p[1].end], "Four five.\nSix.");
        assert_eq!(p[1].word_count, 3);
    }

    #[test]
    fn test_empty_and_blank_text_yield_nothing() {
        for text in ["", " ", "\n\n\n"] {
            let doc = Document::new(text);
            assert!(doc.words().is_empty(), "no words in {text:?}");
            assert!(doc.sentences().is_empty(), "no sentences in {text:?}");
        }
        assert!(sentences("...!?").is_empty());
        let doc = Document::new("");
        assert!(doc.is_empty());
        assert!(doc.paragraphs().is_empty());
    }

    #[test]
    fn test_sentence_at_offset() {
        let doc = Document::new("First one. Second one.");
        assert_eq!(doc.sentence_at(0), Some(0));
        assert_eq!(doc.sentence_at(12), Some(1));
        // The period between sentences belongs to neither.
        assert_eq!(doc.sentence_at(9), None);
    }

    #[test]
    fn test_quoted_spans() {
        let text = "\"Run,\" she said. “Now.” \"unterminated";
        let spans = quoted_spans(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].clone()], "Run,");
        assert_eq!(&text[spans[1].clone()], "Now.");
        assert!(quoted_spans("no dialogue here").is_empty());
    }

    #[test]
    fn test_word_span() {
        let doc = Document::new("a bb ccc");
        assert_eq!(doc.word_span(1, 3), 2..8);
        assert_eq!(doc.word_span(2, 2), 0..0);
        assert_eq!(doc.word_span(0, 9), 0..0);
    }
}
