// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! The text-format writer: one `` `key` = `value` `` line per stored
//! entry, in PathOrder, with optional column alignment and optional
//! on-write variable interpolation of values.
//!
//! Persistence atomicity (crash-consistency) is an explicit non-goal here,
//! unlike the teacher's CSV writer, which stages to a temp file and renames
//! into place. `save` writes the destination path directly; a failure
//! partway through may leave a partially-written file. What this module
//! does preserve is distinguishing *where* a write failed: a
//! `PathKvError::WriteError` means one specific line's `write_all` failed,
//! a `PathKvError::CloseError` means every line wrote fine but the final
//! `flush` did not — the same distinction the original made between a
//! `fprintf` failure and the `fclose` check that catches a full disk.

use crate::pathkv::error::{close_error, write_error, PathKvResult};
use crate::pathkv::interp::interpolate;
use crate::pathkv::store::Store;
use crate::pathkv::text::escape::{escape, escaped_len};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Options controlling how `save` renders a Store to text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitOptions {
    /// Pad every key column to a common width.
    pub align: bool,
    /// Resolve `${path}` references in values before writing them.
    pub interpolate: bool,
}

/// Serializes `store` to `path` using `options`.
pub fn save_file(store: &mut Store, path: impl AsRef<Path>, options: EmitOptions) -> PathKvResult<()> {
    let file = File::create(&path).map_err(|e| {
        crate::pathkv::error::open_failure(path.as_ref().display().to_string(), e.to_string())
    })?;
    let display_path = path.as_ref().display().to_string();
    let mut writer = BufWriter::new(file);
    write_entries(store, &mut writer, options, &display_path)?;
    writer
        .flush()
        .map_err(|e| close_error(display_path, e.to_string()))
}

/// Serializes `store` to an in-memory byte buffer, identical in content to
/// what `save_file` would write. Used by tests and by embedders that want
/// the bytes without touching a filesystem.
pub fn save_bytes(store: &mut Store, options: EmitOptions) -> PathKvResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_entries(store, &mut buf, options, "<memory>")?;
    Ok(buf)
}

fn write_entries<W: Write>(
    store: &mut Store,
    writer: &mut W,
    options: EmitOptions,
    path_for_errors: &str,
) -> PathKvResult<()> {
    let width = if options.align {
        store
            .sorted_entries()
            .iter()
            .map(|e| escaped_len(&e.key) + 2)
            .max()
            .unwrap_or(0)
    } else {
        0
    };

    // Interpolation needs read access to `store` while iterating its own
    // entries; snapshot the keys/values first so there is no overlapping
    // borrow of `store` across the loop.
    let snapshot: Vec<(Vec<u8>, Vec<u8>)> = store
        .sorted_entries()
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect();

    for (key, value) in snapshot {
        let value = if options.interpolate {
            interpolate(store, &value)?
        } else {
            value
        };

        let escaped_key = escape(&key);
        let escaped_value = escape(&value);

        let write_result = (|| -> std::io::Result<()> {
            writer.write_all(&escaped_key)?;
            if options.align {
                let pad = width.saturating_sub(escaped_key.len());
                writer.write_all(&vec![b' '; pad])?;
            }
            writer.write_all(b" = ")?;
            writer.write_all(&escaped_value)?;
            writer.write_all(b"\n")
        })();

        write_result.map_err(|e| write_error(path_for_errors.to_string(), e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_output_matches_sorted_order() {
        let mut s = Store::new();
        s.set(b"seagram's", b"7").unwrap();
        s.set(b"jack", b"daniel's").unwrap();
        let bytes = save_bytes(&mut s, EmitOptions::default()).unwrap();
        assert_eq!(bytes, b"`jack` = `daniel's`\n`seagram's` = `7`\n");
    }

    #[test]
    fn alignment_pads_key_column() {
        let mut s = Store::new();
        s.set(b"a", b"1").unwrap();
        s.set(b"longer", b"2").unwrap();
        let bytes = save_bytes(
            &mut s,
            EmitOptions {
                align: true,
                interpolate: false,
            },
        )
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].find('='), lines[1].find('='));
    }

    #[test]
    fn interpolation_is_applied_to_values_not_keys() {
        let mut s = Store::new();
        s.set(b"k1", b"2").unwrap();
        s.set(b"k2", b"asdf${k1}zxcv").unwrap();
        let bytes = save_bytes(
            &mut s,
            EmitOptions {
                align: false,
                interpolate: true,
            },
        )
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("`k2` = `asdf2zxcv`"));
    }
}
