/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// A bidirectional bijection between original vertex ids and the local ids
/// `[0..n')` of a subgraph.
///
/// The table is append-only: during subgraph extraction the vertices routed
/// into a block are [added](TranslationTable::add) in ascending original
/// order, and [`finalize`](TranslationTable::finalize) is called exactly once
/// before any [`to_local`](TranslationTable::to_local) lookup. Looking up an
/// unfinalized table, or an original id that was never added, is a logic
/// error.
#[derive(Clone, Debug, Default)]
pub struct TranslationTable {
    /// `(original, local)` pairs, sorted by original id after finalization.
    to_local: Vec<(usize, usize)>,
    /// The original id of each local id; always dense.
    to_original: Vec<usize>,
}

impl TranslationTable {
    /// Creates the identity table on `[0..n)`, used for the root graph.
    pub fn identity(n: usize) -> Self {
        Self {
            to_local: (0..n).map(|u| (u, u)).collect(),
            to_original: (0..n).collect(),
        }
    }

    /// Creates an empty table with space for `capacity` vertices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_local: Vec::with_capacity(capacity),
            to_original: Vec::with_capacity(capacity),
        }
    }

    /// Adds the mapping `original` ↔ `local`.
    ///
    /// Local ids must be added densely, in increasing order.
    pub fn add(&mut self, original: usize, local: usize) {
        debug_assert_eq!(local, self.to_original.len());
        self.to_local.push((original, local));
        self.to_original.push(original);
    }

    /// Prepares the table for lookups in both directions.
    pub fn finalize(&mut self) {
        self.to_local.sort_unstable_by_key(|&(original, _)| original);
    }

    /// Returns the number of mapped vertices.
    pub fn len(&self) -> usize {
        self.to_original.len()
    }

    /// Returns true if no vertex is mapped.
    pub fn is_empty(&self) -> bool {
        self.to_original.is_empty()
    }

    /// Returns the local id of `original`.
    ///
    /// # Panics
    ///
    /// Panics if `original` was never added to this table.
    #[inline(always)]
    pub fn to_local(&self, original: usize) -> usize {
        match self
            .to_local
            .binary_search_by_key(&original, |&(original, _)| original)
        {
            Ok(pos) => self.to_local[pos].1,
            Err(_) => panic!("vertex {} is not mapped by this table", original),
        }
    }

    /// Returns the original id of `local`.
    #[inline(always)]
    pub fn to_original(&self, local: usize) -> usize {
        self.to_original[local]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_identity() {
        let tt = TranslationTable::identity(5);
        for u in 0..5 {
            assert_eq!(tt.to_local(u), u);
            assert_eq!(tt.to_original(u), u);
        }
        assert_eq!(tt.len(), 5);
    }

    #[test]
    fn test_bijection() {
        let mut tt = TranslationTable::with_capacity(3);
        tt.add(7, 0);
        tt.add(12, 1);
        tt.add(40, 2);
        tt.finalize();
        for (original, local) in [(7, 0), (12, 1), (40, 2)] {
            assert_eq!(tt.to_local(original), local);
            assert_eq!(tt.to_original(local), original);
        }
    }

    #[test]
    #[should_panic]
    fn test_unmapped() {
        let mut tt = TranslationTable::with_capacity(1);
        tt.add(3, 0);
        tt.finalize();
        tt.to_local(4);
    }
}
