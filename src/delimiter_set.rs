use once_cell::sync::Lazy;

/// Punctuation that always ends a convertible run.
///
/// ASCII and full-width marks plus the common CJK clause punctuation. None of
/// these may appear inside a dictionary key, so splitting on them never hides
/// a match. Whitespace is handled separately (every Unicode whitespace char,
/// plus `U+001C..=U+001F`, is a delimiter), see [`FULL_DELIMITER_SET`].
pub const SENTENCE_DELIMITERS: &str =
    "-,.?!*　，。、；：？！…“”‘’『』「」﹁﹂—－（）《》〈〉～．／＼︒︑︔︓︿﹀︹︺︙︐［﹇］﹈︕︖︰︳︴︽︾︵︶｛︷｝︸﹃﹄【︻】︼";

/// Compact delimiter set for per-character membership tests.
///
/// # Design
///
/// * **ASCII fast path**: `U+0000..=U+007F` live in a single [`u128`] mask.
/// * **BMP**: `U+0000..=U+FFFF` live in a 65,536-bit table (`[u64; 1024]`,
///   ~8 KB), one bit per code point.
/// * **Astral**: `U+10000..` are never delimiters.
#[derive(Copy, Clone)]
pub struct DelimiterSet {
    ascii_mask: u128,      // bits 0..=127
    bmp_bits: [u64; 1024], // 0x0000..=0xFFFF
}

impl DelimiterSet {
    /// Builds a set from explicit characters, optionally adding all Unicode
    /// whitespace plus the information separators `U+001C..=U+001F`.
    pub fn build(chars: &str, with_whitespace: bool) -> Self {
        let mut set = DelimiterSet {
            ascii_mask: 0,
            bmp_bits: [0u64; 1024],
        };
        for ch in chars.chars() {
            set.insert(ch);
        }
        if with_whitespace {
            (0u32..=0xFFFF)
                .filter_map(char::from_u32)
                .filter(|c| c.is_whitespace())
                .for_each(|c| set.insert(c));
            // Not Unicode White_Space, but they still end a run.
            ('\u{1C}'..='\u{1F}').for_each(|c| set.insert(c));
        }
        set
    }

    fn insert(&mut self, ch: char) {
        let u = ch as u32;
        if u <= 0x7F {
            self.ascii_mask |= 1u128 << u;
        }
        if u <= 0xFFFF {
            let i = (u >> 6) as usize;
            let b = u & 63;
            self.bmp_bits[i] |= 1u64 << b;
        }
    }

    /// Tests whether `c` is in this set.
    ///
    /// ```
    /// use opencc_chain::delimiter_set::FULL_DELIMITER_SET;
    /// assert!(FULL_DELIMITER_SET.contains('。'));
    /// assert!(FULL_DELIMITER_SET.contains('\u{3000}'));
    /// assert!(!FULL_DELIMITER_SET.contains('鼠'));
    /// ```
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        let u = c as u32;
        if u <= 0x7F {
            return ((self.ascii_mask >> u) & 1) == 1;
        }
        if u <= 0xFFFF {
            let i = (u >> 6) as usize;
            let b = u & 63;
            return ((self.bmp_bits[i] >> b) & 1) == 1;
        }
        false
    }
}

/// [`SENTENCE_DELIMITERS`] plus all Unicode whitespace, built once.
pub static FULL_DELIMITER_SET: Lazy<DelimiterSet> =
    Lazy::new(|| DelimiterSet::build(SENTENCE_DELIMITERS, true));

#[inline]
pub fn is_delimiter(c: char) -> bool {
    FULL_DELIMITER_SET.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_punctuation_and_whitespace_are_delimiters() {
        for c in SENTENCE_DELIMITERS.chars() {
            assert!(is_delimiter(c), "{c:?} should be a delimiter");
        }
        for c in [
            ' ', '\t', '\n', '\r', '\u{0B}', '\u{0C}', '\u{85}', '\u{3000}', '\u{00A0}',
            '\u{1C}', '\u{1D}', '\u{1E}', '\u{1F}',
        ] {
            assert!(is_delimiter(c), "{c:?} should be a delimiter");
        }
    }

    #[test]
    fn text_characters_are_not_delimiters() {
        for c in ['a', 'Z', '0', '(', ':', '鼠', '標', '𠁞', '·'] {
            assert!(!is_delimiter(c), "{c:?} should not be a delimiter");
        }
    }
}
