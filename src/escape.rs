//! The HL7 escape sequence codec: each of the five delimiter/escape
//! characters maps to a fixed three-character sequence bracketed by the
//! escape character itself.

use crate::separators::Separators;

/// Escape sequence codes, in the fixed order the five reserved characters
/// are checked in both directions.
const CODES: [(fn(&Separators) -> char, char); 5] = [
    (|s| s.field, 'F'),
    (|s| s.component, 'S'),
    (|s| s.repeat, 'R'),
    (|s| s.subcomponent, 'T'),
    (|s| s.escape, 'E'),
];

/// Replace every occurrence of the five reserved characters with their
/// three-character escape sequence. The escape character itself is escaped
/// last, so that escaping a delimiter doesn't get re-escaped by the pass
/// that escapes `\` itself.
pub fn escape(s: &str, separators: &Separators) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == separators.escape {
            out.push(separators.escape);
            out.push('E');
            out.push(separators.escape);
        } else if let Some((_, code)) = CODES.iter().find(|(get, _)| get(separators) == c) {
            out.push(separators.escape);
            out.push(*code);
            out.push(separators.escape);
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverse [`escape`]. Any `<esc>X<esc>` sequence whose code `X` isn't one
/// of the five recognized codes is left untouched.
pub fn unescape(s: &str, separators: &Separators) -> String {
    let esc = separators.escape;
    let mut out = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == esc && i + 2 < chars.len() && chars[i + 2] == esc {
            let code = chars[i + 1];
            if let Some((get, _)) = CODES.iter().find(|(_, c)| *c == code) {
                out.push(get(separators));
                i += 3;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_field_and_component_separators() {
        let seps = Separators::default();
        assert_eq!(escape("a|b^c", &seps), r"a\F\b\S\c");
    }

    #[test]
    fn escapes_the_escape_character() {
        let seps = Separators::default();
        assert_eq!(escape(r"a\b", &seps), r"a\E\b");
    }

    #[test]
    fn escape_unescape_roundtrips() {
        let seps = Separators::default();
        for s in ["a|b^c", r"a\b", "plain text", "a~b&c", ""] {
            assert_eq!(unescape(&escape(s, &seps), &seps), s);
        }
    }

    #[test]
    fn unescape_leaves_unrecognized_sequences_alone() {
        let seps = Separators::default();
        assert_eq!(unescape(r"a\Z\b", &seps), r"a\Z\b");
    }

    #[test]
    fn unescape_leaves_plain_text_untouched() {
        let seps = Separators::default();
        assert_eq!(unescape("hello world", &seps), "hello world");
    }
}
