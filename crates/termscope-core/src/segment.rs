//! Section and sentence segmentation for terms-of-service text.
//!
//! A single forward pass over the normalized text groups lines into sections
//! at heading lines; each section is split into sentences as soon as it
//! closes, so no part of the text is rescanned.
//!
//! # Heading heuristics
//!
//! - Numbered: `1.`, `2.3`, `4)`, `Section 5`, `Article IV`
//! - Upper case: `LIMITATION OF LIABILITY`
//! - Titled: short unpunctuated lines such as `Governing Law` or `Privacy`
//!
//! Offsets are UTF-8 byte offsets into the normalized text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)*[.)]?|(?i:section|article|clause)\s+[0-9ivxlc]+[.:)]?)\s+\S")
        .expect("valid regex")
});

static TOPIC_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:privacy|data|terms|conditions|liability|arbitration|termination)\b")
        .expect("valid regex")
});

/// Upper bound on words in an upper-case or titled heading line.
const MAX_HEADING_WORDS: usize = 10;

/// Words allowed in lower case inside a title-case heading.
const TITLE_MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

/// Lower-case abbreviations that end with a period but not a sentence.
const ABBREVIATIONS: &[&str] = &[
    "e.g.", "i.e.", "vs.", "mr.", "mrs.", "ms.", "dr.", "prof.", "inc.", "ltd.", "co.", "corp.",
    "llc.", "no.", "nos.", "sec.", "art.", "para.", "u.s.", "st.", "fig.", "approx.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Section,
    Sentence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in document order; sections precede their sentences.
    pub id: usize,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub kind: SegmentKind,
    /// Enclosing section for sentences, `None` for sections.
    pub parent: Option<usize>,
}

impl Segment {
    pub fn is_sentence(&self) -> bool {
        self.kind == SegmentKind::Sentence
    }

    pub fn is_section(&self) -> bool {
        self.kind == SegmentKind::Section
    }
}

/// Normalize line endings and invisible whitespace.
///
/// CRLF and lone CR become LF, NBSP becomes a space, a leading BOM is
/// dropped. Borrows when nothing changes.
pub fn normalize(text: &str) -> Cow<'_, str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if !text.contains(['\r', '\u{a0}']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\u{a0}' => out.push(' '),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Split text into sections and the sentences nested in them.
///
/// Empty or whitespace-only text yields no segments. The result is a pure
/// function of `text`, so re-segmenting is deterministic.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut section_start: Option<usize> = None;
    let mut section_end = 0;
    let mut offset = 0;
    let mut after_break = true;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let heading = is_heading(line, after_break);
        if heading && let Some(start) = section_start.take() {
            push_section(text, start, section_end, &mut segments);
        }

        if !line.trim().is_empty() {
            section_start.get_or_insert(line_start);
            section_end = offset;
        }
        after_break = heading || closes_line(line);
    }

    if let Some(start) = section_start {
        push_section(text, start, section_end, &mut segments);
    }

    segments
}

/// Text with every whitespace run collapsed to a single space.
///
/// Sentences hard-wrapped across lines read as one line, so phrase patterns
/// and encoders see the same words either way. Each byte of the flattened
/// text remembers where it came from, so hits map back to source offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    pub text: String,
    origin: Vec<usize>,
}

impl Flattened {
    pub fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin = Vec::with_capacity(source.len() + 1);
        let mut in_space = false;
        for (i, c) in source.char_indices() {
            if c.is_whitespace() {
                if !in_space {
                    text.push(' ');
                    origin.push(i);
                }
                in_space = true;
            } else {
                text.push(c);
                origin.extend(i..i + c.len_utf8());
                in_space = false;
            }
        }
        origin.push(source.len());
        Self { text, origin }
    }

    /// Byte offset in the source of byte `i` of the flattened text. Offsets
    /// past the end map to the end of the source.
    pub fn source_offset(&self, i: usize) -> usize {
        self.origin
            .get(i)
            .or(self.origin.last())
            .copied()
            .unwrap_or(0)
    }
}

/// Iterate the sentence segments in document order.
pub fn sentences(segments: &[Segment]) -> impl Iterator<Item = &Segment> {
    segments.iter().filter(|s| s.is_sentence())
}

fn push_section(text: &str, start: usize, end: usize, segments: &mut Vec<Segment>) {
    let Some((start, end)) = trim_span(text, start, end) else {
        return;
    };
    let section_id = segments.len();
    let section_text = &text[start..end];
    segments.push(Segment {
        id: section_id,
        text: section_text.to_string(),
        start_offset: start,
        end_offset: end,
        kind: SegmentKind::Section,
        parent: None,
    });

    for (s, e) in split_sentences(section_text) {
        segments.push(Segment {
            id: segments.len(),
            text: section_text[s..e].to_string(),
            start_offset: start + s,
            end_offset: start + e,
            kind: SegmentKind::Sentence,
            parent: Some(section_id),
        });
    }
}

/// Sentence spans within one section, relative to the section start.
///
/// Boundaries: terminal punctuation followed by whitespace (unless it looks
/// like an abbreviation), the end of a heading line, and blank lines.
fn split_sentences(section: &str) -> Vec<(usize, usize)> {
    let bytes = section.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut line_start = 0;
    let mut after_break = true;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'.' | b'!' | b'?' => {
                let end = absorb_closers(section, i + 1);
                let followed_by_space = end >= bytes.len() || bytes[end].is_ascii_whitespace();
                if followed_by_space && !is_false_boundary(&section[start..end], &section[end..]) {
                    push_span(section, start, end, &mut spans);
                    start = end;
                }
                i = end;
            }
            b'\n' => {
                let line = &section[line_start..i];
                let rest = &section[i + 1..];
                let blank_next = rest.split('\n').next().is_some_and(|l| l.trim().is_empty());
                let heading = is_heading(line, after_break);
                if heading || blank_next {
                    push_span(section, start, i, &mut spans);
                    start = i + 1;
                }
                after_break = heading || closes_line(line);
                line_start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    push_span(section, start, bytes.len(), &mut spans);

    spans
}

/// Skip repeated terminal punctuation and closing quotes or brackets.
fn absorb_closers(s: &str, mut end: usize) -> usize {
    loop {
        let rest = &s[end..];
        match rest.chars().next() {
            Some(c @ ('.' | '!' | '?' | '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}')) => {
                end += c.len_utf8();
            }
            _ => return end,
        }
    }
}

fn is_false_boundary(left: &str, right: &str) -> bool {
    // Lower-case continuation means the period was not terminal.
    if right
        .trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_lowercase())
    {
        return true;
    }

    let last_word = left
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_start_matches(['(', '"', '\'']);
    if !last_word.ends_with('.') {
        return false;
    }

    // A bare list marker such as "1." or "2.3." at the start of a span.
    if left.trim() == last_word && last_word.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return true;
    }

    let lower = last_word.to_lowercase();
    if ABBREVIATIONS.contains(&lower.as_str()) {
        return true;
    }

    // Single initial, e.g. "J." in "J. Smith".
    let mut chars = last_word.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.'), None) if c.is_uppercase()
    )
}

fn push_span(section: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    if let Some(span) = trim_span(section, start, end) {
        spans.push(span);
    }
}

/// Shrink `[start, end)` past surrounding whitespace; `None` if nothing is left.
fn trim_span(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lead = raw.len() - raw.trim_start().len();
    Some((start + lead, start + lead + trimmed.len()))
}

/// Whether a line leaves no sentence open: blank, or ending in terminal
/// punctuation (closing quotes and brackets allowed after it).
fn closes_line(line: &str) -> bool {
    let t = line
        .trim()
        .trim_end_matches(['"', '\'', ')', ']', '\u{201d}', '\u{2019}']);
    t.is_empty() || t.ends_with(['.', '!', '?', ':', ';'])
}

/// `after_break` is true when the previous line closed its sentence. Topic
/// words only open a section there; mid-paragraph they are ordinary wrapped
/// text.
fn is_heading(line: &str, after_break: bool) -> bool {
    let t = line.trim();
    if t.is_empty() || t.len() > 120 {
        return false;
    }
    if NUMBERED_HEADING.is_match(t) {
        return true;
    }

    let words: Vec<&str> = t.split_whitespace().collect();
    if words.len() > MAX_HEADING_WORDS || t.ends_with(['.', ',', ';', '?', '!']) {
        return false;
    }

    let letters = t.chars().filter(|c| c.is_alphabetic()).count();
    if letters >= 3 && t.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase()) {
        return true;
    }

    (after_break && TOPIC_HEADING.is_match(t)) || is_title_case(&words)
}

fn is_title_case(words: &[&str]) -> bool {
    if words.is_empty() || words.len() > 6 {
        return false;
    }
    words.iter().enumerate().all(|(i, w)| {
        let Some(first) = w.chars().find(|c| c.is_alphanumeric()) else {
            return true;
        };
        first.is_uppercase()
            || first.is_numeric()
            || (i > 0 && TITLE_MINOR_WORDS.contains(&w.to_lowercase().as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence_texts(segments: &[Segment]) -> Vec<&str> {
        sentences(segments).map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\n  \t").is_empty());
    }

    #[test]
    fn single_sentence() {
        let text = "We may share your personal information with third parties for marketing.";
        let segs = segment(text);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].kind, SegmentKind::Section);
        assert_eq!(segs[1].kind, SegmentKind::Sentence);
        assert_eq!(segs[1].text, text);
        assert_eq!(segs[1].parent, Some(0));
        assert_eq!((segs[1].start_offset, segs[1].end_offset), (0, text.len()));
    }

    #[test]
    fn no_terminal_punctuation_is_one_sentence() {
        let text = "we keep your data forever and share it with everyone we like";
        let segs = segment(text);
        assert_eq!(sentence_texts(&segs), vec![text]);
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let segs = segment("You agree to these terms. We may change them! Do you accept? Yes.");
        assert_eq!(
            sentence_texts(&segs),
            vec![
                "You agree to these terms.",
                "We may change them!",
                "Do you accept?",
                "Yes."
            ]
        );
    }

    #[test]
    fn abbreviations_do_not_split() {
        let segs = segment(
            "Acme Inc. may share data, e.g. your email, with Dr. Smith. J. Doe agrees.",
        );
        assert_eq!(
            sentence_texts(&segs),
            vec![
                "Acme Inc. may share data, e.g. your email, with Dr. Smith.",
                "J. Doe agrees."
            ]
        );
    }

    #[test]
    fn lowercase_continuation_does_not_split() {
        let segs = segment("Fees are approx. ten dollars. See sec. four for details.");
        assert_eq!(sentence_texts(&segs).len(), 2);
    }

    #[test]
    fn decimals_do_not_split() {
        let segs = segment("Liability is capped at $10.50 per claim. That is all.");
        assert_eq!(
            sentence_texts(&segs),
            vec!["Liability is capped at $10.50 per claim.", "That is all."]
        );
    }

    #[test]
    fn closing_quotes_stay_with_sentence() {
        let segs = segment("The service is provided \"as is.\" Use it carefully.");
        assert_eq!(
            sentence_texts(&segs),
            vec!["The service is provided \"as is.\"", "Use it carefully."]
        );
    }

    #[test]
    fn numbered_headings_start_sections() {
        let text = "1. Introduction\nWelcome to the service.\n2. Privacy\nWe collect data.\n";
        let segs = segment(text);
        let sections: Vec<&Segment> = segs.iter().filter(|s| s.is_section()).collect();
        assert_eq!(sections.len(), 2);
        assert!(sections[0].text.starts_with("1. Introduction"));
        assert!(sections[1].text.starts_with("2. Privacy"));
        assert_eq!(
            sentence_texts(&segs),
            vec![
                "1. Introduction",
                "Welcome to the service.",
                "2. Privacy",
                "We collect data."
            ]
        );
    }

    #[test]
    fn uppercase_and_title_headings_start_sections() {
        let text = "LIMITATION OF LIABILITY\nWe are not liable.\n\nGoverning Law\nThe laws of Delaware apply.";
        let segs = segment(text);
        assert_eq!(segs.iter().filter(|s| s.is_section()).count(), 2);
    }

    #[test]
    fn wrapped_topic_word_stays_in_paragraph() {
        let text = "We collect information about you and\ndata from our partners and\nuse it for marketing.\n";
        let segs = segment(text);
        assert_eq!(segs.iter().filter(|s| s.is_section()).count(), 1);
        assert_eq!(sentence_texts(&segs), vec![text.trim_end()]);
    }

    #[test]
    fn topic_heading_after_closed_sentence() {
        let text = "Welcome to the service.\nPrivacy\nWe collect data.";
        let segs = segment(text);
        assert_eq!(segs.iter().filter(|s| s.is_section()).count(), 2);
        assert_eq!(
            sentence_texts(&segs),
            vec!["Welcome to the service.", "Privacy", "We collect data."]
        );
    }

    #[test]
    fn blank_line_ends_unpunctuated_sentence() {
        let segs = segment("first item without a stop\n\nsecond item without a stop");
        assert_eq!(
            sentence_texts(&segs),
            vec!["first item without a stop", "second item without a stop"]
        );
    }

    #[test]
    fn offsets_index_into_text_and_increase() {
        let text = "1. Terms\nYou agree. We may update these.\n\n2. Data\nWe sell data. We share data.";
        let segs = segment(text);
        for s in &segs {
            assert_eq!(&text[s.start_offset..s.end_offset], s.text);
        }
        for kind in [SegmentKind::Section, SegmentKind::Sentence] {
            let spans: Vec<(usize, usize)> = segs
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| (s.start_offset, s.end_offset))
                .collect();
            for pair in spans.windows(2) {
                assert!(pair[0].1 <= pair[1].0, "{kind:?} spans overlap: {pair:?}");
            }
        }
    }

    #[test]
    fn sentences_nest_inside_their_section() {
        let text = "1. Terms\nYou agree. We may update these.\n2. Data\nWe sell data.";
        let segs = segment(text);
        for s in sentences(&segs) {
            let parent = &segs[s.parent.unwrap()];
            assert!(parent.is_section());
            assert!(parent.start_offset <= s.start_offset && s.end_offset <= parent.end_offset);
        }
    }

    #[test]
    fn ids_follow_document_order() {
        let segs = segment("A sentence. Another one.\n\nSECOND PART\nMore text.");
        for (i, s) in segs.iter().enumerate() {
            assert_eq!(s.id, i);
        }
    }

    #[test]
    fn segmentation_is_deterministic() {
        let text = "1. Terms\nYou agree. We may update these at any time.";
        assert_eq!(segment(text), segment(text));
    }

    #[test]
    fn flattening_collapses_whitespace_runs() {
        let source = "share your\n  data  with\tthird parties";
        let flat = Flattened::new(source);
        assert_eq!(flat.text, "share your data with third parties");
        let at = flat.text.find("data").unwrap();
        assert_eq!(&source[flat.source_offset(at)..][..4], "data");
        let at = flat.text.find("third").unwrap();
        assert_eq!(&source[flat.source_offset(at)..][..5], "third");
        assert_eq!(flat.source_offset(flat.text.len()), source.len());
        assert_eq!(flat.source_offset(usize::MAX), source.len());
    }

    #[test]
    fn flattening_keeps_multibyte_offsets() {
        let source = "données\npartagées";
        let flat = Flattened::new(source);
        assert_eq!(flat.text, "données partagées");
        let at = flat.text.find("partagées").unwrap();
        assert_eq!(flat.source_offset(at), source.find("partagées").unwrap());
    }

    #[test]
    fn normalize_line_endings_and_nbsp() {
        assert_eq!(normalize("a\r\nb\rc\u{a0}d"), "a\nb\nc d");
        assert_eq!(normalize("\u{feff}plain"), "plain");
        assert!(matches!(normalize("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn multibyte_text_keeps_char_boundaries() {
        let text = "Les données sont partagées. Vous acceptez \u{201c}tout\u{201d}.";
        let segs = segment(text);
        assert_eq!(sentence_texts(&segs).len(), 2);
    }
}
