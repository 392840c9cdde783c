/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Extraction of the induced subgraphs of a partition.
//!
//! Given a partitioned graph, the extractor produces one [`Item`] per block,
//! containing the subgraph induced by the block's vertices (cut edges are
//! dropped), a translation table from root ids to the block-local ids, and
//! the identifier of the block in the hierarchy. Vertices keep their
//! relative order: local id `i` is the `i`-th vertex of the block in
//! ascending parent order, so the result does not depend on which of the two
//! implementations ran.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use crate::graphs::CsrGraph;
use crate::sched::item::Item;
use crate::stats::StatCollector;
use crate::utils::TranslationTable;

/// Extracts the `k` induced subgraphs of `partition` as child items.
///
/// With one thread a single pass-pair over the parent builds all blocks;
/// with more threads `min(n_threads, k)` workers claim blocks through a
/// shared counter and build each block independently. Both paths produce
/// identical items, in ascending block order.
#[allow(clippy::too_many_arguments)]
pub fn extract_subgraphs(
    g: &CsrGraph,
    translation: &TranslationTable,
    k: u64,
    partition: &[u64],
    identifier: &[u64],
    depth: usize,
    n_threads: usize,
    stats: &StatCollector,
) -> Vec<Item<'static>> {
    debug_assert_eq!(partition.len(), g.num_nodes());

    let start = Instant::now();
    let children = if n_threads == 1 {
        extract_serial(g, translation, k, partition, identifier)
    } else {
        extract_parallel(g, translation, k, partition, identifier, n_threads)
    };
    let end = Instant::now();

    stats.log_extraction(depth, g.num_nodes(), n_threads, k, start, end);
    children
}

fn child_identifier(identifier: &[u64], block: usize) -> Vec<u64> {
    let mut child = Vec::with_capacity(identifier.len() + 1);
    child.extend_from_slice(identifier);
    child.push(block as u64);
    child
}

fn extract_serial(
    g: &CsrGraph,
    translation: &TranslationTable,
    k: u64,
    partition: &[u64],
    identifier: &[u64],
) -> Vec<Item<'static>> {
    let n = g.num_nodes();
    let k = k as usize;

    let mut sizes = vec![0; k];
    let mut entries = vec![0; k];
    let mut weights = vec![0; k];
    let mut local_ids = vec![0; n];
    let mut tables = (0..k)
        .map(|_| TranslationTable::with_capacity(n / k))
        .collect::<Vec<_>>();

    for u in 0..n {
        let b = partition[u] as usize;
        local_ids[u] = sizes[b];
        tables[b].add(translation.to_original(u), sizes[b]);
        sizes[b] += 1;
        weights[b] += g.vertex_weight(u);
        entries[b] += g
            .neighbors(u)
            .filter(|&(v, _)| partition[v] == partition[u])
            .count();
    }

    let mut graphs = (0..k)
        .map(|b| CsrGraph::with_sizes(sizes[b], entries[b], weights[b]))
        .collect::<Vec<_>>();
    for table in tables.iter_mut() {
        table.finalize();
    }

    let mut cursors = vec![0; k];
    for u in 0..n {
        let b = partition[u] as usize;
        let sub_u = local_ids[u];
        graphs[b].weights[sub_u] = g.vertex_weight(u);
        for (v, w) in g.neighbors(u) {
            if partition[v] == partition[u] {
                let cursor = cursors[b];
                graphs[b].adj[cursor] = local_ids[v];
                graphs[b].adj_weights[cursor] = w;
                cursors[b] += 1;
            }
        }
        graphs[b].rows[sub_u + 1] = cursors[b];
    }

    graphs
        .into_iter()
        .zip(tables)
        .enumerate()
        .map(|(b, (graph, table))| Item::child(child_identifier(identifier, b), graph, table))
        .collect()
}

fn extract_parallel(
    g: &CsrGraph,
    translation: &TranslationTable,
    k: u64,
    partition: &[u64],
    identifier: &[u64],
    n_threads: usize,
) -> Vec<Item<'static>> {
    let n = g.num_nodes();
    let k = k as usize;
    let workers = n_threads.min(k);

    let slots = (0..k).map(|_| Mutex::new(None)).collect::<Vec<_>>();
    let next_block = AtomicUsize::new(workers);

    std::thread::scope(|s| {
        for t in 0..workers {
            let slots = &slots;
            let next_block = &next_block;
            s.spawn(move || {
                let mut b = t;
                while b < k {
                    let block = b as u64;

                    // first pass: sizes and the translation table
                    let mut size = 0;
                    let mut entries = 0;
                    let mut weight = 0;
                    let mut table = TranslationTable::with_capacity(n / k);
                    for u in 0..n {
                        if partition[u] == block {
                            table.add(translation.to_original(u), size);
                            size += 1;
                            weight += g.vertex_weight(u);
                            entries += g
                                .neighbors(u)
                                .filter(|&(v, _)| partition[v] == block)
                                .count();
                        }
                    }
                    let mut graph = CsrGraph::with_sizes(size, entries, weight);
                    table.finalize();

                    // second pass: rows, neighbors and weights
                    let mut sub_u = 0;
                    let mut cursor = 0;
                    for u in 0..n {
                        if partition[u] == block {
                            graph.weights[sub_u] = g.vertex_weight(u);
                            for (v, w) in g.neighbors(u) {
                                if partition[v] == block {
                                    graph.adj[cursor] =
                                        table.to_local(translation.to_original(v));
                                    graph.adj_weights[cursor] = w;
                                    cursor += 1;
                                }
                            }
                            graph.rows[sub_u + 1] = cursor;
                            sub_u += 1;
                        }
                    }

                    *slots[b].lock().unwrap() =
                        Some(Item::child(child_identifier(identifier, b), graph, table));
                    b = next_block.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    slots
        .into_iter()
        .map(|slot| slot.into_inner().unwrap().unwrap())
        .collect()
}
