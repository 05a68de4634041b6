//! Pattern parsing and rendering.
//!
//! A pattern such as `<Project>/shots/<Episode>/<Sequence>` is split into
//! segments at separator characters. When every token of a segment is an
//! absent optional token, the whole segment is dropped together with one
//! adjoining separator, so a missing episode never yields `//` or `__`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::context::TokenValues;
use super::token::Token;
use crate::error::CoreError;

/// Characters that delimit pattern segments.
pub const SEPARATORS: [char; 4] = ['/', '_', '.', '-'];

/// Compiled regex for `<Token>` extraction.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z]+)>").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Token(Token),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    /// Separator preceding this segment; `None` only for the first segment.
    separator: Option<char>,
    pieces: Vec<Piece>,
}

impl Segment {
    fn new(separator: Option<char>) -> Self {
        Self {
            separator,
            pieces: Vec::new(),
        }
    }

    fn push_char(&mut self, ch: char) {
        match self.pieces.last_mut() {
            Some(Piece::Literal(text)) => text.push(ch),
            _ => self.pieces.push(Piece::Literal(ch.to_string())),
        }
    }
}

/// A parsed folder or file-name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a pattern. The error is a human-readable reason.
    pub fn parse(source: &str) -> Result<Self, String> {
        if source.trim().is_empty() {
            return Err("pattern is empty".to_string());
        }

        let mut segments = vec![Segment::new(None)];
        let mut cursor = 0;

        for caps in TOKEN_RE.captures_iter(source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            push_literal(&mut segments, &source[cursor..whole.start()])?;
            let name = &caps[1];
            let token = Token::from_name(name)
                .ok_or_else(|| format!("unknown token <{name}> in '{source}'"))?;
            if let Some(segment) = segments.last_mut() {
                segment.pieces.push(Piece::Token(token));
            }
            cursor = whole.end();
        }
        push_literal(&mut segments, &source[cursor..])?;

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct tokens referenced by the pattern.
    pub fn tokens(&self) -> BTreeSet<Token> {
        self.segments
            .iter()
            .flat_map(|s| s.pieces.iter())
            .filter_map(|p| match p {
                Piece::Token(t) => Some(*t),
                Piece::Literal(_) => None,
            })
            .collect()
    }

    /// The pattern split at `/`: for each component, the tokens of each of
    /// its segments. A literal-only segment has an empty set.
    pub fn components(&self) -> Vec<Vec<BTreeSet<Token>>> {
        let mut components: Vec<Vec<BTreeSet<Token>>> = Vec::new();
        for segment in &self.segments {
            let tokens = segment
                .pieces
                .iter()
                .filter_map(|p| match p {
                    Piece::Token(t) => Some(*t),
                    Piece::Literal(_) => None,
                })
                .collect();
            match components.last_mut() {
                Some(component) if segment.separator != Some('/') => component.push(tokens),
                _ => components.push(vec![tokens]),
            }
        }
        components
    }

    pub fn uses_separator(&self, separator: char) -> bool {
        self.segments.iter().any(|s| s.separator == Some(separator))
    }

    /// Substitute `values` into the pattern.
    ///
    /// `is_optional` decides whether an absent token drops its segment or
    /// fails with `MissingToken` (reported against `context`).
    pub fn render(
        &self,
        values: &TokenValues,
        is_optional: impl Fn(Token) -> bool,
        context: &str,
    ) -> Result<String, CoreError> {
        let mut out = String::new();
        let mut emitted = false;

        for segment in &self.segments {
            let mut text = String::new();
            let mut seen = 0;
            let mut present = 0;

            for piece in &segment.pieces {
                match piece {
                    Piece::Literal(literal) => text.push_str(literal),
                    Piece::Token(token) => {
                        seen += 1;
                        match values.get(*token) {
                            Some(value) => {
                                present += 1;
                                text.push_str(value);
                            }
                            None if is_optional(*token) => {}
                            None => {
                                return Err(CoreError::MissingToken {
                                    token: token.name(),
                                    context: context.to_string(),
                                })
                            }
                        }
                    }
                }
            }

            if seen > 0 && present == 0 {
                continue;
            }
            if emitted {
                if let Some(separator) = segment.separator {
                    out.push(separator);
                }
            }
            out.push_str(&text);
            emitted = true;
        }

        Ok(out)
    }
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) -> Result<(), String> {
    if text.contains(['<', '>']) {
        return Err(format!("malformed token in '{text}'"));
    }
    for ch in text.chars() {
        if SEPARATORS.contains(&ch) {
            segments.push(Segment::new(Some(ch)));
        } else if let Some(segment) = segments.last_mut() {
            segment.push_char(ch);
        }
    }
    Ok(())
}
