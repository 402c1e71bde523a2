//! Character-wise cursor helpers over best-effort UTF-8 byte strings.
//!
//! Content lines are raw bytes, so nothing here assumes validity: malformed lead bytes
//! count as one-byte characters and every function is total.

/// Byte length of the character starting at `s[0]`.
///
/// Returns 0 for an empty slice and 1 for any byte that is not a valid lead byte.
pub fn char_len(s: &[u8]) -> usize {
    let Some(&c) = s.first() else {
        return 0;
    };
    if c < 0x80 {
        1
    } else if c & 0xE0 == 0xC0 {
        2
    } else if c & 0xF0 == 0xE0 {
        3
    } else if c & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

#[inline]
fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// Offset of the character that ends just before `pos`.
///
/// Scans backward from `pos - 1` over continuation bytes and stops at 0.
pub fn prev_char_start(s: &[u8], pos: usize) -> usize {
    if pos == 0 {
        return 0;
    }
    let mut p = pos.min(s.len()).saturating_sub(1);
    while p > 0 && is_continuation(s[p]) {
        p -= 1;
    }
    p
}

/// Step one character forward from `pos`, never past the end.
pub fn next_char_start(s: &[u8], pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let step = char_len(&s[pos..]).max(1);
    (pos + step).min(s.len())
}

/// Number of characters in `s`.
pub fn char_count(s: &[u8]) -> usize {
    char_count_until(s, s.len())
}

/// Number of characters that start before `byte_limit`.
pub fn char_count_until(s: &[u8], byte_limit: usize) -> usize {
    let limit = byte_limit.min(s.len());
    let mut pos = 0;
    let mut chars = 0;
    while pos < limit {
        pos = next_char_start(s, pos);
        chars += 1;
    }
    chars
}

/// Walk at most `max_chars` characters; returns `(chars_taken, bytes_advanced)`.
///
/// A trailing multi-byte sequence cut short by the end of `s` counts as one character
/// covering the remaining bytes.
pub fn take_chars(s: &[u8], max_chars: usize) -> (usize, usize) {
    let mut pos = 0;
    let mut chars = 0;
    while pos < s.len() && chars < max_chars {
        pos = next_char_start(s, pos);
        chars += 1;
    }
    (chars, pos)
}

/// Byte offset of the `n`th character, or `s.len()` if the line is shorter.
pub fn byte_offset_of_char(s: &[u8], n: usize) -> usize {
    take_chars(s, n).1
}
