//! Character classes and name normalization shared by the lexer and the
//! interpreter's environment.

use std::borrow::Cow;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::{UnicodeNormalization, is_nfc};

const DEVANAGARI_ZERO: char = '\u{0966}';
const DEVANAGARI_NINE: char = '\u{096F}';

/// A character that may appear anywhere in an identifier: `_`, anything that
/// can start a Unicode identifier, or a combining mark (vowel signs, virama,
/// anusvara and friends). Digits are excluded.
pub fn is_identifier_char(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c) || is_combining_mark(c)
}

/// ASCII or Devanagari decimal digit.
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || (DEVANAGARI_ZERO..=DEVANAGARI_NINE).contains(&c)
}

/// Map a digit accepted by [`is_digit`] to its ASCII form; other characters
/// pass through unchanged.
pub fn to_ascii_digit(c: char) -> char {
    if (DEVANAGARI_ZERO..=DEVANAGARI_NINE).contains(&c) {
        let value = c as u32 - DEVANAGARI_ZERO as u32;
        char::from_digit(value, 10).unwrap_or(c)
    } else {
        c
    }
}

/// Canonical (NFC) form of a name. Borrows when the input is already NFC.
pub fn normalize_name(name: &str) -> Cow<'_, str> {
    if is_nfc(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(name.nfc().collect())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case('क', true)]
    #[case('ि', true)] // vowel sign i, spacing mark
    #[case('्', true)] // virama
    #[case('ं', true)] // anusvara
    #[case('_', true)]
    #[case('x', true)]
    #[case('1', false)]
    #[case('५', false)]
    #[case('+', false)]
    #[case(' ', false)]
    fn identifier_chars(#[case] c: char, #[case] expected: bool) {
        assert_eq!(is_identifier_char(c), expected);
    }

    #[test]
    fn devanagari_digits_map_to_ascii() {
        let mapped: String = "०१२३४५६७८९".chars().map(to_ascii_digit).collect();
        assert_eq!(mapped, "0123456789");
        assert_eq!(to_ascii_digit('7'), '7');
    }

    #[test]
    fn normalize_composes_nukta_sequences() {
        // DEVANAGARI LETTER QA (U+0958) is a composition exclusion: NFC keeps
        // it decomposed as KA + NUKTA, so both spellings meet there.
        let precomposed = "\u{0958}";
        let decomposed = "\u{0915}\u{093C}";
        assert_eq!(normalize_name(precomposed), normalize_name(decomposed));
    }

    #[test]
    fn normalize_composes_latin_marks() {
        assert_eq!(normalize_name("e\u{0301}"), "\u{00E9}");
        assert!(matches!(normalize_name("plain"), Cow::Borrowed(_)));
    }
}
