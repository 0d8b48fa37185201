//! Pattern library: dictionaries, alternations, numerals and scanning.
//!
//! Locale packs describe their vocabulary as plain `(word, value)` slices.
//! This module turns those into regex alternations (longest word first, so
//! an abbreviation never shadows a longer word sharing its prefix) and maps
//! matched tokens back to values.

use std::collections::HashMap;

use regex::{Captures, Regex, RegexBuilder};

use crate::error::WhenError;

/// A locale vocabulary: surface word → value.
pub type Dictionary<T> = &'static [(&'static str, T)];

/// Build a non-capturing alternation matching any of `words`.
///
/// Alternatives are ordered by length (longest first, ties alphabetical) and
/// regex-escaped; a space inside a word matches any run of whitespace.
///
/// ```
/// use when_engine::pattern::match_any_pattern;
///
/// assert_eq!(match_any_pattern(["jan", "januari", "jan."]), r"(?:januari|jan\.|jan)");
/// ```
pub fn match_any_pattern<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    let mut words: Vec<&str> = words.into_iter().collect();
    words.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    words.dedup();

    let alternatives: Vec<String> = words
        .iter()
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect();
    format!("(?:{})", alternatives.join("|"))
}

/// Lowercase a token and collapse inner whitespace, for dictionary lookup.
pub fn normalize_token(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A compiled dictionary: case-insensitive lookup plus its alternation.
#[derive(Debug, Clone)]
pub struct WordTable<T> {
    entries: HashMap<String, T>,
    pattern: String,
}

impl<T: Copy> WordTable<T> {
    pub fn new(dictionary: &[(&str, T)]) -> Self {
        let entries = dictionary
            .iter()
            .map(|(word, value)| (normalize_token(word), *value))
            .collect();
        let pattern = match_any_pattern(dictionary.iter().map(|(word, _)| *word));
        Self { entries, pattern }
    }

    pub fn get(&self, word: &str) -> Option<T> {
        self.entries.get(&normalize_token(word)).copied()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A vague quantity word and the number it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VagueQuantity {
    pub pattern: &'static str,
    pub value: f64,
}

/// Vague quantities every locale understands.
pub const VAGUE_QUANTITIES: &[VagueQuantity] = &[
    VagueQuantity { pattern: r"half(?:\s*an?)?", value: 0.5 },
    VagueQuantity { pattern: r"an?\s*few|few", value: 3.0 },
    VagueQuantity { pattern: r"a?\s*couple\s*(?:of)?", value: 2.0 },
    VagueQuantity { pattern: r"several", value: 7.0 },
    VagueQuantity { pattern: r"an?", value: 1.0 },
];

/// Numeral recognition: spelled-out words, digits, and vague quantities.
#[derive(Debug, Clone)]
pub struct Numerals {
    words: WordTable<u32>,
    vague: Vec<(Regex, f64)>,
    pattern: String,
}

impl Numerals {
    /// Combine a locale's number words and extra vague quantities with the
    /// fixed set in [`VAGUE_QUANTITIES`].
    pub fn new(words: &[(&str, u32)], extra_vague: &[VagueQuantity]) -> Result<Self, WhenError> {
        let words = WordTable::new(words);
        let vague_entries: Vec<&VagueQuantity> =
            extra_vague.iter().chain(VAGUE_QUANTITIES).collect();

        let vague = vague_entries
            .iter()
            .map(|q| compile("vague quantity", &format!("^(?:{})$", q.pattern)).map(|re| (re, q.value)))
            .collect::<Result<Vec<_>, _>>()?;

        let vague_alternatives: Vec<&str> = vague_entries.iter().map(|q| q.pattern).collect();
        let pattern = format!(
            "(?:{}|[0-9]+(?:\\.[0-9]+)?|{})",
            words.pattern(),
            vague_alternatives.join("|")
        );

        Ok(Self {
            words,
            vague,
            pattern,
        })
    }

    /// Alternation matching any numeral this table can parse.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Value of a matched numeral token.
    ///
    /// Spelled-out words win over digits, digits over vague quantities.
    pub fn parse(&self, token: &str) -> Option<f64> {
        let token = normalize_token(token);
        if let Some(value) = self.words.get(&token) {
            return Some(value as f64);
        }
        if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit() || c == '.') {
            if let Ok(value) = token.parse::<f64>() {
                return Some(value);
            }
        }
        self.vague
            .iter()
            .find(|(re, _)| re.is_match(&token))
            .map(|(_, value)| *value)
    }

    /// Value of a numeral token that must be a whole number.
    pub fn parse_integer(&self, token: &str) -> Option<i32> {
        let value = self.parse(token)?;
        (value.fract() == 0.0).then_some(value as i32)
    }
}

/// Compile a case-insensitive pattern, naming it in the error on failure.
pub fn compile(name: &str, pattern: &str) -> Result<Regex, WhenError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| WhenError::pattern(name, e))
}

/// Turn every named capture group into a non-capturing group.
///
/// Lets one literal pattern be embedded several times in a larger pattern,
/// which the regex crate would otherwise reject for duplicate names.
pub fn strip_captures(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(pos) = rest.find("(?") {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        let after = &tail[2..];
        let name_start = if after.starts_with("P<") {
            Some(2)
        } else if after.starts_with('<') {
            Some(1)
        } else {
            None
        };
        match name_start.and_then(|start| after[start..].find('>').map(|end| start + end + 1)) {
            Some(skip) => {
                out.push_str("(?:");
                rest = &after[skip..];
            }
            None => {
                out.push_str("(?");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The character before `index` is not part of a word.
pub(crate) fn starts_at_boundary(text: &str, index: usize) -> bool {
    text[..index]
        .chars()
        .next_back()
        .map_or(true, |c| !is_word_char(c))
}

/// The character at `index` is not part of a word.
pub(crate) fn ends_at_boundary(text: &str, index: usize) -> bool {
    text[index..].chars().next().map_or(true, |c| !is_word_char(c))
}

/// Byte offset of the character after the one starting at `index`.
fn next_char_index(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| index + c.len_utf8())
}

/// Find the first acceptable match of `regex` at or after `offset`.
///
/// A candidate must sit on word boundaries on both sides and `extract` must
/// accept it; otherwise the search resumes one character after the
/// candidate's start.
pub(crate) fn scan<'t, T>(
    regex: &Regex,
    text: &'t str,
    offset: usize,
    mut extract: impl FnMut(&Captures<'t>) -> Option<T>,
) -> Option<T> {
    let mut pos = offset;
    while pos <= text.len() {
        let caps = regex.captures_at(text, pos)?;
        let whole = caps.get(0)?;
        if !whole.is_empty()
            && starts_at_boundary(text, whole.start())
            && ends_at_boundary(text, whole.end())
        {
            if let Some(found) = extract(&caps) {
                return Some(found);
            }
        }
        pos = next_char_index(text, whole.start());
    }
    None
}
