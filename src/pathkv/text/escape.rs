// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Backtick-quoting and backslash-escaping shared by the parser and the
//! emitter.
//!
//! Only `` ` `` and `\` are "real" escapes; any other backslash sequence is
//! preserved verbatim (including its leading backslash) by the parser, so
//! `escape` only ever needs to double those two bytes to make `unescape`
//! round-trip exactly.

/// The length a byte string would have once wrapped in backticks and
/// escaped — i.e. its length plus one extra byte for every `` ` `` or `\`
/// it contains. Does not count the two surrounding backticks themselves;
/// callers that need the on-the-wire column width add 2 (see
/// `text::emitter`).
pub fn escaped_len(bytes: &[u8]) -> usize {
    bytes.len() + bytes.iter().filter(|&&b| b == b'`' || b == b'\\').count()
}

/// Wraps `bytes` in backticks, escaping interior `` ` `` and `\` bytes.
pub fn escape(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(b'`');
    for &b in bytes {
        if b == b'`' || b == b'\\' {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b'`');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_backtick_and_backslash() {
        assert_eq!(escape(b"plain"), b"`plain`");
        assert_eq!(escape(b"a`b"), b"`a\\`b`");
        assert_eq!(escape(b"a\\b"), b"`a\\\\b`");
    }

    #[test]
    fn escaped_len_counts_escape_bytes_only() {
        assert_eq!(escaped_len(b"plain"), 5);
        assert_eq!(escaped_len(b"a`b"), 4);
        assert_eq!(escaped_len(b"a\\b"), 4);
    }
}
