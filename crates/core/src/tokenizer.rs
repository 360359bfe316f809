//! Quote-aware splitting of command lines into tokens.
//!
//! Tokens are separated by whitespace. A double-quoted run is part of a single
//! token and keeps its quotes, so that a quoted value which happens to start
//! with a switch delimiter is never classified as a switch. [`unquote`] removes
//! the quotes and escapes when the value is finally converted.

use crate::descriptor::{LONG_DELIMITER, SHORT_DELIMITER};

/// Token that routes every following token to the variadic descriptor.
pub const SENTINEL: &str = "--";

const QUOTE: char = '"';
const ESCAPE: char = '\\';

/// A token together with its byte offset in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub text: String,
}

impl TokenSpan {
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Splits `line` into tokens, keeping quotes on quoted tokens.
#[must_use]
pub fn split_all(line: &str) -> Vec<String> {
    scan(line).into_iter().map(|span| span.text).collect()
}

/// Splits the text left of the cursor for completion.
///
/// An unterminated trailing quote is accepted and yields a partial token. When
/// the text is empty or ends in unquoted whitespace, an empty token positioned
/// at the end is appended, because the user is about to start a new token.
#[must_use]
pub fn match_completion(text: &str) -> Vec<TokenSpan> {
    let mut spans = scan(text);
    let ends_inside_token = spans.last().is_some_and(|span| span.end() == text.len());
    if !ends_inside_token {
        spans.push(TokenSpan {
            start: text.len(),
            text: String::new(),
        });
    }
    spans
}

fn scan(text: &str) -> Vec<TokenSpan> {
    let mut spans = Vec::new();
    let mut current: Option<usize> = None;
    let mut in_quote = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        if in_quote {
            match c {
                ESCAPE => escaped = true,
                QUOTE => in_quote = false,
                _ => {}
            }
            continue;
        }

        if c.is_whitespace() {
            if let Some(start) = current.take() {
                spans.push(TokenSpan {
                    start,
                    text: text[start..i].to_string(),
                });
            }
            continue;
        }

        if current.is_none() {
            current = Some(i);
        }
        if c == QUOTE {
            in_quote = true;
        }
    }

    if let Some(start) = current {
        spans.push(TokenSpan {
            start,
            text: text[start..].to_string(),
        });
    }

    spans
}

#[must_use]
pub fn is_wrapped_in_quotes(token: &str) -> bool {
    token.len() >= 2 && token.starts_with(QUOTE) && token.ends_with(QUOTE)
}

/// Whether the token has switch syntax, recognized or not.
///
/// `--name` and `-n` are switches; `--` alone, negative numbers such as `-5`
/// and quoted tokens are not.
#[must_use]
pub fn is_switch(token: &str) -> bool {
    let rest = if let Some(rest) = token.strip_prefix(LONG_DELIMITER) {
        rest
    } else if let Some(rest) = token.strip_prefix(SHORT_DELIMITER) {
        rest
    } else {
        return false;
    };

    rest.chars().next().is_some_and(char::is_alphabetic)
}

/// Strips surrounding quotes and resolves escapes; other tokens are returned as is.
#[must_use]
pub fn unquote(token: &str) -> String {
    if !is_wrapped_in_quotes(token) {
        return token.to_string();
    }

    let inner = &token[1..token.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != ESCAPE {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => result.push(other),
            None => result.push(ESCAPE),
        }
    }

    result
}

/// Removes a leading and/or trailing quote from a possibly unterminated token.
#[must_use]
pub fn trim_quotes(token: &str) -> &str {
    let token = token.strip_prefix(QUOTE).unwrap_or(token);
    token.strip_suffix(QUOTE).unwrap_or(token)
}
