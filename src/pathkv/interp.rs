// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Interpolator: bounded recursive `${path}` substitution against a
//! `Store`.
//!
//! The scan always works on the *leftmost* `}` in the buffer, then walks
//! backwards from two bytes before it looking for the nearest preceding
//! `${` — the nearest one, not the outermost, which is what makes nested
//! references like `${k${n}}` resolve inside-out without any extra
//! bookkeeping. A `}` with no matching `${` ahead of it, or an unresolvable
//! sub-path, stops the whole pass and returns whatever has been built so
//! far; neither is an error. Only exceeding the configured recursion depth
//! is.

use crate::pathkv::error::{recursion_limit, PathKvResult};
use crate::pathkv::store::Store;

/// Resolves every `${path}` occurrence in `input` against `store`,
/// recursively, up to the Store's configured `max_interp_depth`.
pub fn interpolate(store: &mut Store, input: &[u8]) -> PathKvResult<Vec<u8>> {
    interpolate_at_depth(store, input, 0)
}

/// Finds the nearest `${` preceding `close_idx`, the index of a `}` byte in
/// `buf`. Mirrors the original backward scan: start two bytes before the
/// close brace and walk towards the start of the buffer.
fn find_open_brace(buf: &[u8], close_idx: usize) -> Option<usize> {
    if close_idx < 2 {
        return None;
    }
    let mut t = close_idx - 2;
    loop {
        if buf[t] == b'$' && buf.get(t + 1) == Some(&b'{') {
            return Some(t);
        }
        if t == 0 {
            return None;
        }
        t -= 1;
    }
}

fn interpolate_at_depth(store: &mut Store, input: &[u8], depth: u32) -> PathKvResult<Vec<u8>> {
    let max_depth = store.config().limits.max_interp_depth;
    if depth == max_depth {
        return Err(recursion_limit(
            String::from_utf8_lossy(input).into_owned(),
            max_depth,
        ));
    }

    let mut buf = input.to_vec();
    loop {
        let close_idx = match buf.iter().position(|&b| b == b'}') {
            Some(i) => i,
            None => break,
        };

        let open_idx = match find_open_brace(&buf, close_idx) {
            Some(i) => i,
            // no matching `${` precedes this `}`: it's literal, stop here.
            None => break,
        };

        let sub_path = buf[open_idx + 2..close_idx].to_vec();
        if sub_path.is_empty() {
            // `${}` is preserved literally; no further substitution.
            break;
        }

        let raw = match store.get(&sub_path)? {
            Some(v) => v,
            // unresolvable reference: stop, return what's built so far.
            None => break,
        };

        let resolved = interpolate_at_depth(store, &raw, depth + 1)?;

        let mut next = Vec::with_capacity(open_idx + resolved.len() + buf.len() - close_idx - 1);
        next.extend_from_slice(&buf[..open_idx]);
        next.extend_from_slice(&resolved);
        next.extend_from_slice(&buf[close_idx + 1..]);
        buf = next;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    #[test]
    fn no_pattern_is_a_fixed_point() {
        let mut s = Store::new();
        let out = interpolate(&mut s, b"plain text").unwrap();
        assert_eq!(out, b"plain text");
    }

    #[test]
    fn simple_substitution() {
        let mut s = Store::new();
        s.set(b"k1", b"2").unwrap();
        let out = interpolate(&mut s, b"asdf${k1}zxcv").unwrap();
        assert_eq!(out, v("asdf2zxcv"));
    }

    #[test]
    fn nested_reference_resolves_innermost_first() {
        let mut s = Store::new();
        s.set(b"k1", b"2").unwrap();
        s.set(b"k2", b"asdf2zxcv").unwrap();
        let out = interpolate(&mut s, b"${k${k1}}").unwrap();
        assert_eq!(out, v("asdf2zxcv"));
    }

    #[test]
    fn empty_path_is_preserved_literally() {
        let mut s = Store::new();
        let out = interpolate(&mut s, b"a${}b").unwrap();
        assert_eq!(out, v("a${}b"));
    }

    #[test]
    fn lone_close_brace_is_preserved() {
        let mut s = Store::new();
        let out = interpolate(&mut s, b"oops }").unwrap();
        assert_eq!(out, v("oops }"));
    }

    #[test]
    fn unresolvable_variable_stops_without_error() {
        let mut s = Store::new();
        let out = interpolate(&mut s, b"x${missing}y").unwrap();
        assert_eq!(out, v("x${missing}y"));
    }

    #[test]
    fn mutual_recursion_hits_the_depth_limit() {
        let mut s = Store::new();
        s.set(b"k9", b"${k10}").unwrap();
        s.set(b"k10", b"${k9}").unwrap();
        let val = s.get(b"k9").unwrap().unwrap();
        let result = interpolate(&mut s, &val);
        assert!(result.is_err());
    }
}
