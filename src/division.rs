//! Splitting a buffer on a delimiter into addressable spans, and the
//! padding/splice primitives that writes are built from.

use std::ops::Range;

/// An immutable span `{ offset, length }` into some buffer. A `length` of
/// zero represents an empty slot between two consecutive delimiters (or at
/// either end of the buffer).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StringDivision {
    /// Absolute byte offset into the buffer this division was computed over.
    pub offset: usize,
    /// Byte length of the division. Never negative by construction.
    pub length: usize,
}

impl StringDivision {
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Split `buffer[bounds]` on `delimiter`, returning spans with offsets
/// absolute into `buffer` (not relative to `bounds`).
///
/// An empty input yields exactly one zero-length span. `n` occurrences of
/// `delimiter` yield `n + 1` spans. A division never includes the delimiter
/// character itself.
pub fn divisions(buffer: &str, delimiter: char, bounds: Range<usize>) -> Vec<StringDivision> {
    let slice = &buffer[bounds.clone()];
    let mut out = Vec::new();
    let mut offset = bounds.start;
    for part in slice.split(delimiter) {
        out.push(StringDivision {
            offset,
            length: part.len(),
        });
        offset += part.len() + delimiter.len_utf8();
    }
    out
}

/// Split the whole of `buffer` on `delimiter` (equivalent to
/// `divisions(buffer, delimiter, 0..buffer.len())`).
pub fn divisions_all(buffer: &str, delimiter: char) -> Vec<StringDivision> {
    divisions(buffer, delimiter, 0..buffer.len())
}

/// For a write into slot `index` of `value`, extend `value` with the
/// minimum number of trailing `delimiter`s so that slot `index` exists (as
/// an empty slot), and return the extended value alongside its fresh
/// division table.
///
/// If slot `index` already exists, `value` is returned unchanged along with
/// its existing division table — the same operation serves both the
/// in-range splice and the beyond-range append, which a write then
/// performs uniformly by splicing into whatever division table comes back
/// (see the note on unifying the two write branches in `divider`).
pub fn padded(value: &str, index: usize, delimiter: char) -> (String, Vec<StringDivision>) {
    let divs = divisions_all(value, delimiter);
    if index < divs.len() {
        return (value.to_string(), divs);
    }
    let needed = index + 1 - divs.len();
    let mut extended = String::with_capacity(value.len() + needed);
    extended.push_str(value);
    for _ in 0..needed {
        extended.push(delimiter);
    }
    let divs = divisions_all(&extended, delimiter);
    (extended, divs)
}

/// Replace the span `offset..offset + length` of `source` with `replacement`.
pub fn splice(source: &str, offset: usize, length: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() - length + replacement.len());
    out.push_str(&source[..offset]);
    out.push_str(replacement);
    out.push_str(&source[offset + length..]);
    out
}
