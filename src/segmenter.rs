//! Splits input into convertible runs and verbatim separators.
//!
//! The split is a regular partition: maximal runs of delimiter characters
//! become one [`Token::Separator`], maximal runs of anything else become one
//! [`Token::Text`], so the two kinds strictly alternate. Concatenating the
//! tokens in order reproduces the input exactly.

use crate::delimiter_set::is_delimiter;

/// One piece of segmented input, borrowed from the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text the matcher may rewrite.
    Text(&'a str),
    /// Punctuation or whitespace copied through untouched.
    Separator(&'a str),
}

impl<'a> Token<'a> {
    #[inline]
    pub fn as_str(&self) -> &'a str {
        match *self {
            Token::Text(s) | Token::Separator(s) => s,
        }
    }

    #[inline]
    pub fn is_separator(&self) -> bool {
        matches!(self, Token::Separator(_))
    }
}

/// Segments `text` around delimiters.
///
/// ```
/// use opencc_chain::segmenter::{segment, Token};
///
/// let tokens = segment("你好，世界！");
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Text("你好"),
///         Token::Separator("，"),
///         Token::Text("世界"),
///         Token::Separator("！"),
///     ]
/// );
/// ```
pub fn segment(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_separator: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let sep = is_delimiter(ch);
        match in_separator {
            Some(prev) if prev != sep => {
                tokens.push(make_token(&text[start..idx], prev));
                start = idx;
            }
            _ => {}
        }
        in_separator = Some(sep);
    }

    if let Some(prev) = in_separator {
        tokens.push(make_token(&text[start..], prev));
    }

    tokens
}

#[inline]
fn make_token(slice: &str, separator: bool) -> Token<'_> {
    if separator {
        Token::Separator(slice)
    } else {
        Token::Text(slice)
    }
}
