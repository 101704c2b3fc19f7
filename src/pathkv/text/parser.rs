// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! The text-format reader: a deterministic state machine over backtick-
//! quoted keys and values, with a two-verb grammar (assignment and
//! removal) and bounded error recovery.
//!
//! States mirror the original design one-for-one: `WaitingForKey`,
//! `Comment`, `QuotedString`, `WaitingForEqOrRemove`, `WaitingForValue`,
//! `WaitingForEol`, `Escape`. `QuotedString` remembers which state to
//! resume into once the closing backtick is seen (`stack_state`), since the
//! same quoting logic is shared by keys and values.

use crate::pathkv::config;
use crate::pathkv::error::{open_failure, syntax_error, PathKvError, PathKvResult};
use crate::pathkv::store::Store;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Past this many reported syntax errors, the parser gives up on the rest
/// of the file rather than flooding the caller with diagnostics.
const MAX_REPORTED_ERRORS: usize = 12;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    WaitingForKey,
    Comment,
    QuotedString,
    WaitingForEqOrRemove,
    WaitingForValue,
    WaitingForEol,
    Escape,
}

struct Parser<'a> {
    store: &'a mut Store,
    quiet: bool,
    errors: Vec<(u64, String)>,
}

impl<'a> Parser<'a> {
    fn record_error(&mut self, line: u64, message: &str) -> bool {
        if self.errors.len() >= MAX_REPORTED_ERRORS {
            return true;
        }
        config::warn(self.quiet, format!("line {}: {}", line, message));
        self.errors.push((line, message.to_string()));
        false
    }
}

fn burn_to_eol(bytes: &[u8], mut pos: usize, line: &mut u64) -> usize {
    while let Some(&b) = bytes.get(pos) {
        pos += 1;
        if b == b'\n' {
            *line += 1;
            break;
        }
    }
    pos
}

/// Loads a text-format file into `store`. Existing keys are overwritten
/// (last load wins); `store` may already contain entries.
pub fn load_file(store: &mut Store, path: impl AsRef<Path>) -> PathKvResult<()> {
    let quiet = store.config().quiet();
    let mut file = File::open(&path).map_err(|e| {
        open_failure(path.as_ref().display().to_string(), e.to_string())
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| {
        open_failure(path.as_ref().display().to_string(), e.to_string())
    })?;
    parse_bytes(store, &bytes, quiet)
}

/// Loads a text-format document from an in-memory byte string. Exposed
/// separately from `load_file` so embedders and tests can feed documents
/// that never touch a filesystem.
pub fn load_bytes(store: &mut Store, bytes: &[u8]) -> PathKvResult<()> {
    let quiet = store.config().quiet();
    parse_bytes(store, bytes, quiet)
}

fn parse_bytes(store: &mut Store, bytes: &[u8], quiet: bool) -> PathKvResult<()> {
    let mut parser = Parser {
        store,
        quiet,
        errors: Vec::new(),
    };

    let mut pos = 0usize;
    let mut line = 1u64;
    let mut state = State::WaitingForKey;
    let mut stack_state = State::WaitingForKey;
    let mut current_key: Vec<u8> = Vec::new();
    let mut current_value: Vec<u8> = Vec::new();
    let mut filling_value = false;
    let mut awaiting_set = false;
    let mut halted = false;

    'outer: loop {
        let byte = bytes.get(pos).copied();

        match state {
            State::WaitingForKey => match byte {
                None => break,
                Some(b' ') | Some(b'\t') => pos += 1,
                Some(b'\n') => {
                    pos += 1;
                    line += 1;
                }
                Some(b'#') => {
                    state = State::Comment;
                    pos += 1;
                }
                Some(b'`') => {
                    current_key.clear();
                    filling_value = false;
                    stack_state = State::WaitingForEqOrRemove;
                    state = State::QuotedString;
                    pos += 1;
                }
                Some(_) => {
                    if parser.record_error(line, "expected a comment or a backtick-quoted key") {
                        halted = true;
                        break 'outer;
                    }
                    pos = burn_to_eol(bytes, pos, &mut line);
                    state = State::WaitingForKey;
                }
            },
            State::Comment => match byte {
                None => break,
                Some(b'\n') => {
                    state = State::WaitingForKey;
                    pos += 1;
                    line += 1;
                }
                Some(_) => pos += 1,
            },
            State::QuotedString => match byte {
                None => {
                    let _ = parser.record_error(line, "unterminated quoted string");
                    break 'outer;
                }
                Some(b'`') => {
                    state = stack_state;
                    pos += 1;
                }
                Some(b'\n') => {
                    if parser.record_error(line, "newline inside quoted string") {
                        halted = true;
                        break 'outer;
                    }
                    pos = burn_to_eol(bytes, pos, &mut line);
                    state = State::WaitingForKey;
                }
                Some(b'\\') => {
                    state = State::Escape;
                    pos += 1;
                }
                Some(b) => {
                    if filling_value {
                        current_value.push(b);
                    } else {
                        current_key.push(b);
                    }
                    pos += 1;
                }
            },
            State::Escape => match byte {
                None => {
                    let _ = parser.record_error(line, "unterminated escape sequence");
                    break 'outer;
                }
                Some(b) => {
                    let target = if filling_value {
                        &mut current_value
                    } else {
                        &mut current_key
                    };
                    if b == b'`' || b == b'\\' {
                        target.push(b);
                    } else {
                        target.push(b'\\');
                        target.push(b);
                    }
                    pos += 1;
                    state = State::QuotedString;
                }
            },
            State::WaitingForEqOrRemove => match byte {
                None => {
                    let _ = parser.record_error(line, "expected `=` or `remove`, found end of file");
                    break 'outer;
                }
                Some(b' ') | Some(b'\t') => pos += 1,
                Some(b'=') => {
                    state = State::WaitingForValue;
                    pos += 1;
                }
                Some(b'r') if bytes[pos..].starts_with(b"remove") => {
                    let after = pos + "remove".len();
                    let boundary_ok = !matches!(bytes.get(after), Some(b) if !b.is_ascii_whitespace() && *b != b'#');
                    if boundary_ok {
                        if let Err(e) = parser.store.remove(&current_key) {
                            return Err(e);
                        }
                        pos = after;
                        awaiting_set = false;
                        state = State::WaitingForEol;
                    } else if parser.record_error(line, "expected `=` or `remove`") {
                        halted = true;
                        break 'outer;
                    } else {
                        pos = burn_to_eol(bytes, pos, &mut line);
                        state = State::WaitingForKey;
                    }
                }
                Some(_) => {
                    if parser.record_error(line, "expected `=` or `remove`") {
                        halted = true;
                        break 'outer;
                    }
                    pos = burn_to_eol(bytes, pos, &mut line);
                    state = State::WaitingForKey;
                }
            },
            State::WaitingForValue => match byte {
                None => {
                    let _ = parser.record_error(line, "expected a backtick-quoted value, found end of file");
                    break 'outer;
                }
                Some(b' ') | Some(b'\t') => pos += 1,
                Some(b'`') => {
                    current_value.clear();
                    filling_value = true;
                    awaiting_set = true;
                    stack_state = State::WaitingForEol;
                    state = State::QuotedString;
                    pos += 1;
                }
                Some(_) => {
                    if parser.record_error(line, "expected a backtick-quoted value") {
                        halted = true;
                        break 'outer;
                    }
                    pos = burn_to_eol(bytes, pos, &mut line);
                    state = State::WaitingForKey;
                }
            },
            State::WaitingForEol => match byte {
                None => {
                    if awaiting_set {
                        if let Err(e) = parser.store.set(&current_key, &current_value) {
                            return Err(e);
                        }
                    }
                    break;
                }
                Some(b' ') | Some(b'\t') => pos += 1,
                Some(b'\n') => {
                    if awaiting_set {
                        if let Err(e) = parser.store.set(&current_key, &current_value) {
                            return Err(e);
                        }
                    }
                    awaiting_set = false;
                    pos += 1;
                    line += 1;
                    state = State::WaitingForKey;
                }
                Some(_) => {
                    // a comment (or anything else) on the same line as a
                    // value/removal is forbidden.
                    if parser.record_error(line, "a comment may not follow a value on the same line") {
                        halted = true;
                        break 'outer;
                    }
                    pos = burn_to_eol(bytes, pos, &mut line);
                    state = State::WaitingForKey;
                }
            },
        }
    }

    if halted {
        let (first_line, first_message) = parser.errors[0].clone();
        return Err(syntax_error(
            first_line,
            format!(
                "{} (stopped after {} errors)",
                first_message,
                parser.errors.len()
            ),
        ));
    }
    if let Some((first_line, first_message)) = parser.errors.first().cloned() {
        let extra = parser.errors.len() - 1;
        let message = if extra == 0 {
            first_message
        } else {
            format!("{} (and {} more error(s))", first_message, extra)
        };
        return Err(PathKvError::SyntaxError {
            line: first_line,
            message,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(doc: &str) -> Store {
        let mut s = Store::new();
        load_bytes(&mut s, doc.as_bytes()).unwrap();
        s
    }

    #[test]
    fn simple_assignment() {
        let mut s = load("`jack` = `daniel's`\n`seagram's` = `7`\n");
        assert_eq!(s.get(b"jack").unwrap(), Some(b"daniel's".to_vec()));
        assert_eq!(s.get(b"seagram's").unwrap(), Some(b"7".to_vec()));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let mut s = load("# a comment\n\n`k` = `v`\n  # trailing comment\n");
        assert_eq!(s.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn remove_verb_deletes_existing_key() {
        let mut s = Store::new();
        s.set(b"k", b"v").unwrap();
        load_bytes(&mut s, b"`k` remove\n").unwrap();
        assert_eq!(s.get(b"k").unwrap(), None);
    }

    #[test]
    fn escaped_backtick_and_backslash_round_trip() {
        let mut s = load("`\\`key\\\\` = `\\\\val\\``\n");
        assert_eq!(s.get(b"`key\\").unwrap(), Some(b"\\val`".to_vec()));
    }

    #[test]
    fn unrecognized_escape_preserves_backslash() {
        let mut s = load("`k` = `a\\nb`\n");
        assert_eq!(s.get(b"k").unwrap(), Some(b"a\\nb".to_vec()));
    }

    #[test]
    fn comment_after_value_is_a_syntax_error() {
        let mut s = Store::new();
        let result = load_bytes(&mut s, b"`k` = `v` # not allowed\n");
        assert!(result.is_err());
    }

    #[test]
    fn caps_reported_errors_at_twelve() {
        let mut doc = String::new();
        for _ in 0..20 {
            doc.push_str("!!!\n");
        }
        let mut s = Store::new();
        let result = load_bytes(&mut s, doc.as_bytes());
        match result.unwrap_err() {
            PathKvError::SyntaxError { message, .. } => {
                assert!(message.contains("stopped after"));
            }
            other => panic!("expected SyntaxError, got {:?}", other),
        }
    }
}
