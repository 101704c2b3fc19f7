// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Hierarchy queries: `getKeys`, `getAllKeys`, `hasValue`, `hasKeys`,
//! `exists` — every one of them a range scan over the Store once it has
//! been forced into sorted form, relying on PathOrder grouping all
//! descendants of a path into one contiguous run.

use crate::pathkv::order::is_descendant_of;
use crate::pathkv::store::{self, Store};

/// Returns the immediate child segments below `path`, de-duplicated. An
/// empty `path` returns the immediate segments of the root, i.e. every
/// entry's first segment.
///
/// ## Behaviour
/// `path` itself, if stored as a leaf, is skipped: `getKeys` enumerates
/// strictly-below entries, never the path's own value.
pub fn get_keys(store: &mut Store, path: &[u8]) -> Vec<Vec<u8>> {
    let entries = store.sorted_entries();
    let n = entries.len();

    let (start, end, subkey_offset) = if path.is_empty() {
        (0usize, n, 0usize)
    } else {
        let ideal = store::ideal_index(entries, path);
        if ideal >= n {
            return Vec::new();
        }
        let mut start = ideal;
        if entries[start].key == path {
            start += 1;
        }
        let mut end = start;
        while end < n && is_descendant_of(&entries[end].key, path) {
            end += 1;
        }
        (start, end, path.len() + 2)
    };

    let mut result: Vec<Vec<u8>> = Vec::new();
    for entry in &entries[start..end] {
        let rest = &entry.key[subkey_offset..];
        let seg_end = rest
            .windows(2)
            .position(|w| w == b"::")
            .unwrap_or(rest.len());
        let segment = rest[..seg_end].to_vec();
        if result.last().map_or(true, |last| last != &segment) {
            result.push(segment);
        }
    }
    result
}

/// Returns every stored key, in PathOrder.
pub fn get_all_keys(store: &mut Store) -> Vec<Vec<u8>> {
    store
        .sorted_entries()
        .iter()
        .map(|e| e.key.clone())
        .collect()
}

/// True iff an entry with exactly this key is stored (a leaf).
pub fn has_value(store: &mut Store, key: &[u8]) -> bool {
    let entries = store.sorted_entries();
    store::find_index(entries, key).is_some()
}

/// True iff some stored key has the form `path` + `::` + at least one more
/// byte (an interior path with at least one descendant).
///
/// ## Behaviour
/// Guards the "skip the exact match, then look at the next slot" step
/// against running off the end of the array — the original C source skips
/// this bounds check (see SPEC_FULL.md §9, Open Question 1).
pub fn has_keys(store: &mut Store, path: &[u8]) -> bool {
    let entries = store.sorted_entries();
    let n = entries.len();
    let mut idx = store::ideal_index(entries, path);
    if idx >= n {
        return false;
    }
    if entries[idx].key == path {
        idx += 1;
        if idx >= n {
            return false;
        }
    }
    is_descendant_of(&entries[idx].key, path)
}

/// True iff `key_or_path` is either a stored leaf or the prefix of at least
/// one stored descendant — the logical OR of `has_value`/`has_keys`,
/// computed in a single pass over the ideal index rather than two.
pub fn exists(store: &mut Store, key_or_path: &[u8]) -> bool {
    let entries = store.sorted_entries();
    let n = entries.len();
    let idx = store::ideal_index(entries, key_or_path);
    if idx >= n {
        return false;
    }

    let is_leaf = entries[idx].key == key_or_path;
    let next = if is_leaf { idx + 1 } else { idx };
    let has_descendant = next < n && is_descendant_of(&entries[next].key, key_or_path);

    is_leaf || has_descendant
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(keys: &[&str]) -> Store {
        let mut s = Store::new();
        for k in keys {
            s.set(k.as_bytes(), b"").unwrap();
        }
        s
    }

    #[test]
    fn get_keys_groups_numeric_siblings_by_path_order() {
        let mut s = populate(&[
            "b_level::1",
            "b_level::2",
            "b_level::3",
            "b_level::4",
            "b_level::5",
            "b_level::6",
            "b_level::7",
            "b_level::8",
            "b_level::9",
            "b_level::10",
            "b_level::1::0",
            "b_level::1::1",
        ]);
        let keys = get_keys(&mut s, b"b_level");
        let keys: Vec<&str> = keys.iter().map(|k| std::str::from_utf8(k).unwrap()).collect();
        assert_eq!(
            keys,
            vec!["1", "10", "2", "3", "4", "5", "6", "7", "8", "9"]
        );
    }

    #[test]
    fn get_keys_on_empty_path_returns_root_segments() {
        let mut s = populate(&["a", "a::b", "c"]);
        let mut keys = get_keys(&mut s, b"");
        keys.sort();
        let keys: Vec<&str> = keys.iter().map(|k| std::str::from_utf8(k).unwrap()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn get_keys_skips_the_leaf_itself() {
        let mut s = populate(&["p", "p::a"]);
        let keys = get_keys(&mut s, b"p");
        assert_eq!(keys, vec![b"a".to_vec()]);
    }

    #[test]
    fn get_keys_past_end_of_array_is_empty() {
        let mut s = populate(&["a"]);
        assert!(get_keys(&mut s, b"zzz").is_empty());
    }

    #[test]
    fn has_value_is_exact_match_only() {
        let mut s = populate(&["a::b"]);
        assert!(!has_value(&mut s, b"a"));
        assert!(has_value(&mut s, b"a::b"));
    }

    #[test]
    fn has_keys_requires_a_real_descendant() {
        let mut s = populate(&["a", "a::b"]);
        assert!(has_keys(&mut s, b"a"));
        assert!(!has_keys(&mut s, b"a::b"));
    }

    #[test]
    fn has_keys_on_last_entry_does_not_read_past_the_end() {
        let mut s = populate(&["a"]);
        assert!(!has_keys(&mut s, b"a"));
    }

    #[test]
    fn exists_is_leaf_or_interior() {
        let mut s = populate(&["a::b"]);
        assert!(exists(&mut s, b"a"));
        assert!(exists(&mut s, b"a::b"));
        assert!(!exists(&mut s, b"zzz"));
    }

    #[test]
    fn get_all_keys_returns_full_sorted_set() {
        let mut s = populate(&["c", "a", "b"]);
        let keys = get_all_keys(&mut s);
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }
}
