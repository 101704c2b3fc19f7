// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Store: a lazily-sorted doubling array of key/value entries.
//!
//! The backing array is kept in two regions: `[0, sorted_prefix)`, strictly
//! increasing under `order::cmp`, and `[sorted_prefix, data.len())`, an
//! unsorted tail of recent appends that may contain duplicate keys.
//! `ensure_sorted` reconciles the tail into the sorted region, collapsing
//! duplicates (last write wins). Every read-side operation calls
//! `ensure_sorted` first.
//!
//! This two-region design is what makes loading an already-sorted multi-
//! million-entry file cheap: `set` recognises the common case (incoming key
//! greater than the last sorted key) and appends in O(1) amortised time,
//! without ever touching the binary search or the incorporation pass.

use crate::pathkv::config::PathKvConfig;
use crate::pathkv::entry::Entry;
use crate::pathkv::error::{invalid_argument, PathKvResult};
use crate::pathkv::order;
use crate::pathkv::text::escape::escaped_len;
use std::cmp::Ordering;

/// The ordered, lazily-sorted key/value index at the heart of pathkv.
pub struct Store {
    data: Vec<Entry>,
    capacity: usize,
    sorted_prefix: usize,
    config: PathKvConfig,
}

/// Returns the unique index in `slice` (sorted under `order::cmp`) where
/// `key` does or would live. `hi` starts at `slice.len()`, not
/// `slice.len() - 1`: the loop converges `lo == hi` without ever needing an
/// equality branch inside it.
pub(crate) fn ideal_index(slice: &[Entry], key: &[u8]) -> usize {
    let mut lo = 0usize;
    let mut hi = slice.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if order::cmp(&slice[mid].key, key) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// `ideal_index` plus the single equality check that turns it into an exact
/// lookup.
pub(crate) fn find_index(slice: &[Entry], key: &[u8]) -> Option<usize> {
    let idx = ideal_index(slice, key);
    if idx < slice.len() && slice[idx].key == key {
        Some(idx)
    } else {
        None
    }
}

impl Store {
    /// Creates a new, empty Store using default configuration.
    pub fn new() -> Self {
        Self::with_config(PathKvConfig::default())
    }

    /// Creates a new, empty Store with the given configuration.
    pub fn with_config(config: PathKvConfig) -> Self {
        let capacity = config.limits.min_capacity.max(16);
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            sorted_prefix: 0,
            config,
        }
    }

    pub fn config(&self) -> &PathKvConfig {
        &self.config
    }

    fn validate_length(&self, argument: &str, bytes: &[u8]) -> PathKvResult<()> {
        let len = escaped_len(bytes);
        if len > self.config.limits.l_max {
            return Err(invalid_argument(
                argument,
                format!(
                    "escaped length {} exceeds configured limit {}",
                    len, self.config.limits.l_max
                ),
            ));
        }
        Ok(())
    }

    fn grow_if_needed(&mut self) {
        if self.data.len() == self.capacity {
            self.capacity *= 2;
            let additional = self.capacity - self.data.len();
            self.data.reserve(additional);
        }
    }

    /// Halves capacity when usage has dropped well below half, with a small
    /// hysteresis margin (`-2`) so an insert/remove loop straddling the
    /// threshold doesn't thrash between two capacities on every call.
    fn maybe_shrink(&mut self) {
        let min_cap = self.config.limits.min_capacity;
        if self.capacity <= min_cap {
            return;
        }
        let half = self.capacity / 2;
        if half >= 2 && self.data.len() < half - 2 {
            self.capacity = half.max(min_cap);
        }
    }

    /// Sets `key` to `value`, overwriting any existing value for `key`
    /// (last write wins). Rejects keys/values whose escaped length exceeds
    /// the configured `l_max`.
    ///
    /// ## Performance
    /// O(1) amortised when `key` sorts after every previously-set key (the
    /// common case when loading an already-sorted file); otherwise O(1)
    /// amortised append to the unsorted tail, with the cost of
    /// reconciliation deferred to the next `ensure_sorted`.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> PathKvResult<()> {
        self.validate_length("key", key)?;
        self.validate_length("value", value)?;

        if self.data.is_empty() {
            self.grow_if_needed();
            self.data.push(Entry::new(key.to_vec(), value.to_vec()));
            self.sorted_prefix = 1;
            return Ok(());
        }

        if self.sorted_prefix == self.data.len() {
            let last_key = &self.data[self.data.len() - 1].key;
            if order::cmp(last_key, key) == Ordering::Less {
                self.grow_if_needed();
                self.data.push(Entry::new(key.to_vec(), value.to_vec()));
                self.sorted_prefix += 1;
                return Ok(());
            }

            let idx = ideal_index(&self.data, key);
            if idx < self.data.len() && self.data[idx].key.as_slice() == key {
                self.data[idx].value = value.to_vec();
                return Ok(());
            }
        }

        self.grow_if_needed();
        self.data.push(Entry::new(key.to_vec(), value.to_vec()));
        Ok(())
    }

    /// Returns a copy of the value stored at `key`, or `None` if absent.
    /// A missing key is a normal outcome, not an error (see `error.rs`).
    pub fn get(&mut self, key: &[u8]) -> PathKvResult<Option<Vec<u8>>> {
        self.ensure_sorted();
        Ok(find_index(&self.data, key).map(|idx| self.data[idx].value.clone()))
    }

    /// Removes `key` if present; a no-op if absent.
    pub fn remove(&mut self, key: &[u8]) -> PathKvResult<()> {
        self.ensure_sorted();
        if let Some(idx) = find_index(&self.data, key) {
            self.data.remove(idx);
            self.sorted_prefix -= 1;
            self.maybe_shrink();
        }
        Ok(())
    }

    /// Number of distinct live keys. Forces `ensure_sorted` so duplicates
    /// in an unreconciled tail are collapsed before counting.
    pub fn size(&mut self) -> usize {
        self.ensure_sorted();
        self.data.len()
    }

    /// Reconciles the unsorted tail into the sorted region, collapsing
    /// duplicate keys (last write wins). No-op if already fully sorted.
    ///
    /// Each tail entry is always found at index `sorted_prefix` at the
    /// start of its turn: entries ahead of it in the tail haven't been
    /// touched yet, and entries behind it have already been folded into
    /// `[0, sorted_prefix)`. Removing it and re-inserting at its ideal
    /// index (or merging it into an existing duplicate) is exactly the
    /// memmove-based incorporation the design calls for, expressed through
    /// `Vec::remove`/`Vec::insert`.
    pub fn ensure_sorted(&mut self) {
        while self.sorted_prefix < self.data.len() {
            let entry = self.data.remove(self.sorted_prefix);
            let ideal = ideal_index(&self.data[..self.sorted_prefix], &entry.key);
            if ideal < self.sorted_prefix && self.data[ideal].key == entry.key {
                self.data[ideal].value = entry.value;
            } else {
                self.data.insert(ideal, entry);
                self.sorted_prefix += 1;
            }
        }
    }

    /// Forces the store into sorted form and returns the full entry slice.
    /// Used by `hierarchy` and `text::emitter`, which both need to scan the
    /// sorted array directly rather than go through point lookups.
    pub fn sorted_entries(&mut self) -> &[Entry] {
        self.ensure_sorted();
        &self.data
    }

    /// A compact textual dump of the store's internal bookkeeping, in the
    /// spirit of the original implementation's debug-print routine. Not
    /// part of the persisted format; intended for troubleshooting only.
    pub fn debug_dump(&self) -> String {
        let mut out = format!(
            "capacity={} used={} sorted_prefix={} sorted={}\n",
            self.capacity,
            self.data.len(),
            self.sorted_prefix,
            self.sorted_prefix == self.data.len()
        );
        for (i, e) in self.data.iter().enumerate() {
            out.push_str(&format!(
                "[{:03}] {:?} => {:?}\n",
                i,
                String::from_utf8_lossy(&e.key),
                String::from_utf8_lossy(&e.value)
            ));
        }
        out
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut s = Store::new();
        s.set(b"a", b"1").unwrap();
        assert_eq!(s.get(b"a").unwrap(), Some(kv("1")));
    }

    #[test]
    fn last_write_wins() {
        let mut s = Store::new();
        s.set(b"a", b"1").unwrap();
        s.set(b"a", b"2").unwrap();
        assert_eq!(s.get(b"a").unwrap(), Some(kv("2")));
        assert_eq!(s.size(), 1);
    }

    #[test]
    fn missing_key_is_none_not_error() {
        let mut s = Store::new();
        assert_eq!(s.get(b"missing").unwrap(), None);
    }

    #[test]
    fn out_of_order_inserts_are_reconciled_by_ensure_sorted() {
        let mut s = Store::new();
        s.set(b"c", b"3").unwrap();
        s.set(b"a", b"1").unwrap();
        s.set(b"b", b"2").unwrap();
        s.set(b"a", b"1-new").unwrap(); // duplicate in the unsorted tail
        let entries = s.sorted_entries();
        let keys: Vec<&[u8]> = entries.iter().map(|e| e.key.as_slice()).collect();
        assert_eq!(keys, vec![b"a".as_slice(), b"b", b"c"]);
        assert_eq!(s.get(b"a").unwrap(), Some(kv("1-new")));
    }

    #[test]
    fn remove_absent_key_is_a_no_op() {
        let mut s = Store::new();
        s.set(b"a", b"1").unwrap();
        s.remove(b"missing").unwrap();
        assert_eq!(s.size(), 1);
    }

    #[test]
    fn remove_then_reinsert_keeps_order() {
        let mut s = Store::new();
        for k in ["a", "b", "c", "d"] {
            s.set(k.as_bytes(), b"v").unwrap();
        }
        s.remove(b"b").unwrap();
        assert_eq!(s.get(b"b").unwrap(), None);
        assert_eq!(s.size(), 3);
    }

    #[test]
    fn capacity_grows_past_initial_min() {
        let mut s = Store::with_config(PathKvConfig::default());
        for i in 0..100u32 {
            s.set(format!("k{:04}", i).as_bytes(), b"v").unwrap();
        }
        assert_eq!(s.size(), 100);
    }

    #[test]
    fn value_exceeding_l_max_is_rejected() {
        let mut cfg = PathKvConfig::default();
        cfg.limits.l_max = 4;
        let mut s = Store::with_config(cfg);
        assert!(s.set(b"k", b"toolong").is_err());
    }

    #[test]
    fn shrink_hysteresis_does_not_thrash() {
        let mut s = Store::new();
        for i in 0..40u32 {
            s.set(format!("k{:04}", i).as_bytes(), b"v").unwrap();
        }
        for i in 0..35u32 {
            s.remove(format!("k{:04}", i).as_bytes()).unwrap();
        }
        assert_eq!(s.size(), 5);
    }
}
