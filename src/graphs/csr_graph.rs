/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A weighted undirected graph in compressed sparse row form.

/// An immutable weighted undirected graph in CSR form.
///
/// The graph stores one directed entry per endpoint, so an undirected edge
/// {u, v} of weight c appears both in the row of u and in the row of v, with
/// the same weight. Vertex and edge weights are at least one, there are no
/// self-loops and no parallel edges within a row. None of this is checked at
/// construction time; [`crate::solver::assert_input`] checks all of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrGraph {
    /// The number of vertices.
    pub(crate) n: usize,
    /// The number of directed entries, i.e., twice the number of undirected
    /// edges.
    pub(crate) m: usize,
    /// The weight of each vertex.
    pub(crate) weights: Vec<u64>,
    /// The sum of all vertex weights.
    pub(crate) total_weight: u64,
    /// Row pointers; `rows[u]..rows[u + 1]` delimits the neighborhood of `u`.
    pub(crate) rows: Vec<usize>,
    /// The neighbor of each directed entry.
    pub(crate) adj: Vec<usize>,
    /// The weight of each directed entry.
    pub(crate) adj_weights: Vec<u64>,
}

impl CsrGraph {
    /// Creates a graph from its CSR parts.
    ///
    /// # Panics
    ///
    /// Panics if the sequence lengths are mutually inconsistent.
    pub fn from_parts(
        weights: Vec<u64>,
        rows: Vec<usize>,
        adj: Vec<usize>,
        adj_weights: Vec<u64>,
    ) -> Self {
        let n = weights.len();
        let m = adj.len();
        assert_eq!(rows.len(), n + 1, "expected {} row pointers", n + 1);
        assert_eq!(rows[n], m, "last row pointer must equal the number of entries");
        assert_eq!(adj_weights.len(), m);
        let total_weight = weights.iter().sum();
        Self {
            n,
            m,
            weights,
            total_weight,
            rows,
            adj,
            adj_weights,
        }
    }

    /// Creates an uninitialized graph with `n` vertices and `m` directed
    /// entries, to be filled row by row.
    ///
    /// Used by the subgraph extractor, which knows the exact sizes upfront.
    pub(crate) fn with_sizes(n: usize, m: usize, total_weight: u64) -> Self {
        Self {
            n,
            m,
            weights: vec![1; n],
            total_weight,
            rows: vec![0; n + 1],
            adj: vec![0; m],
            adj_weights: vec![0; m],
        }
    }

    /// Returns the number of vertices.
    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Returns the number of directed entries, i.e., twice the number of
    /// undirected edges.
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.m
    }

    /// Returns the weight of vertex `u`.
    #[inline(always)]
    pub fn vertex_weight(&self, u: usize) -> u64 {
        self.weights[u]
    }

    /// Returns the sum of all vertex weights.
    #[inline(always)]
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns the degree of vertex `u`.
    #[inline(always)]
    pub fn degree(&self, u: usize) -> usize {
        self.rows[u + 1] - self.rows[u]
    }

    /// Returns the raw CSR parts: vertex weights, row pointers, neighbors
    /// and edge weights.
    ///
    /// This is the form the input checks work on.
    pub fn as_parts(&self) -> (&[u64], &[usize], &[usize], &[u64]) {
        (&self.weights, &self.rows, &self.adj, &self.adj_weights)
    }

    /// Returns an iterator over the neighbors of `u` and the weights of the
    /// connecting edges.
    #[inline(always)]
    pub fn neighbors(&self, u: usize) -> impl Iterator<Item = (usize, u64)> + '_ {
        let range = self.rows[u]..self.rows[u + 1];
        self.adj[range.clone()]
            .iter()
            .copied()
            .zip(self.adj_weights[range].iter().copied())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// The path 0 - 1 - 2 with unit weights.
    fn path3() -> CsrGraph {
        CsrGraph::from_parts(
            vec![1, 1, 1],
            vec![0, 1, 3, 4],
            vec![1, 0, 2, 1],
            vec![1, 1, 1, 1],
        )
    }

    #[test]
    fn test_accessors() {
        let g = path3();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.num_entries(), 4);
        assert_eq!(g.total_weight(), 3);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.neighbors(1).collect::<Vec<_>>(), vec![(0, 1), (2, 1)]);
        assert_eq!(g.neighbors(2).collect::<Vec<_>>(), vec![(1, 1)]);
    }

    #[test]
    #[should_panic]
    fn test_inconsistent_rows() {
        CsrGraph::from_parts(vec![1, 1], vec![0, 1], vec![1], vec![1]);
    }
}
