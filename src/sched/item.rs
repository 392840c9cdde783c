/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::cmp::Ordering;

use crate::graphs::CsrGraph;
use crate::utils::TranslationTable;

/// One partitioning task: a subgraph, the translation table from the root
/// graph to it, and the path of block choices that led here.
///
/// The root item borrows the caller's graph and identity table; every child
/// produced by the extractor owns its data, which is dropped when the item
/// goes out of scope after processing.
#[derive(Debug)]
pub struct Item<'a> {
    /// The block indices chosen from the top level down to this task; its
    /// length determines the level of the next split.
    pub identifier: Vec<u64>,
    data: TaskData<'a>,
}

#[derive(Debug)]
enum TaskData<'a> {
    Borrowed {
        graph: &'a CsrGraph,
        translation: &'a TranslationTable,
    },
    Owned {
        graph: CsrGraph,
        translation: TranslationTable,
    },
}

impl<'a> Item<'a> {
    /// Creates the root item, borrowing the caller's graph and table.
    pub fn root(graph: &'a CsrGraph, translation: &'a TranslationTable) -> Self {
        Self {
            identifier: Vec::new(),
            data: TaskData::Borrowed { graph, translation },
        }
    }

    /// Creates an owned child item.
    pub fn child(identifier: Vec<u64>, graph: CsrGraph, translation: TranslationTable) -> Self {
        Self {
            identifier,
            data: TaskData::Owned { graph, translation },
        }
    }

    /// Returns the subgraph of this task.
    #[inline(always)]
    pub fn graph(&self) -> &CsrGraph {
        match &self.data {
            TaskData::Borrowed { graph, .. } => graph,
            TaskData::Owned { graph, .. } => graph,
        }
    }

    /// Returns the translation table from the root graph to this subgraph.
    #[inline(always)]
    pub fn translation(&self) -> &TranslationTable {
        match &self.data {
            TaskData::Borrowed { translation, .. } => translation,
            TaskData::Owned { translation, .. } => translation,
        }
    }
}

// Items are ordered by the size of their subgraph, so that a priority queue
// hands out the largest pending task first.

impl PartialEq for Item<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.graph().num_nodes() == other.graph().num_nodes()
    }
}

impl Eq for Item<'_> {}

impl PartialOrd for Item<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Item<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.graph().num_nodes().cmp(&other.graph().num_nodes())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_heap_order() {
        let small = CsrGraph::from_parts(vec![1], vec![0, 0], vec![], vec![]);
        let large = CsrGraph::from_parts(vec![1, 1], vec![0, 0, 0], vec![], vec![]);
        let mut heap = std::collections::BinaryHeap::new();
        heap.push(Item::child(vec![0], small, TranslationTable::identity(1)));
        heap.push(Item::child(vec![1], large, TranslationTable::identity(2)));
        // the largest subgraph comes out first
        assert_eq!(heap.pop().unwrap().graph().num_nodes(), 2);
        assert_eq!(heap.pop().unwrap().graph().num_nodes(), 1);
    }
}
