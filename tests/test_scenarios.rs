/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use sharedmap::config::{AlgorithmConfig, ConfigPreset, Strategy};
use sharedmap::graphs::CsrGraph;
use sharedmap::qap::communication_cost;
use sharedmap::solver::hierarchical_multisection;
use sharedmap::Error;

const ALL_STRATEGIES: [Strategy; 4] = [
    Strategy::Naive,
    Strategy::Layer,
    Strategy::Queue,
    Strategy::NbLayer,
];

/// Builds a graph from undirected weighted edges.
fn graph_from_edges(n: usize, edges: &[(usize, usize, u64)], weights: Vec<u64>) -> CsrGraph {
    let mut per_vertex = vec![Vec::new(); n];
    for &(u, v, w) in edges {
        per_vertex[u].push((v, w));
        per_vertex[v].push((u, w));
    }
    let mut rows = vec![0];
    let mut adj = Vec::new();
    let mut adj_weights = Vec::new();
    for mut row in per_vertex {
        row.sort();
        for (v, w) in row {
            adj.push(v);
            adj_weights.push(w);
        }
        rows.push(adj.len());
    }
    CsrGraph::from_parts(weights, rows, adj, adj_weights)
}

fn path(n: usize) -> CsrGraph {
    let edges = (0..n - 1).map(|u| (u, u + 1, 1)).collect::<Vec<_>>();
    graph_from_edges(n, &edges, vec![1; n])
}

fn config(
    hierarchy: Vec<u64>,
    distance: Vec<u64>,
    imbalance: f64,
    n_threads: usize,
    strategy: Strategy,
    seed: u64,
) -> AlgorithmConfig {
    AlgorithmConfig::with_preset(
        hierarchy,
        distance,
        imbalance,
        ConfigPreset::Fast,
        n_threads,
        strategy,
        seed,
    )
    .unwrap()
}

fn solve(g: &CsrGraph, config: &AlgorithmConfig) -> (Vec<u64>, u64) {
    let mut mapping = vec![0; g.num_nodes()];
    let cost = hierarchical_multisection(g, config, &mut mapping, false).unwrap();
    (mapping, cost)
}

/// Checks the invariants every valid output must satisfy: full coverage,
/// labels in range, and the global balance bound.
fn check_valid(g: &CsrGraph, config: &AlgorithmConfig, mapping: &[u64]) {
    assert_eq!(mapping.len(), g.num_nodes());
    let k = config.k;
    let mut block_weights = vec![0_u64; k as usize];
    let mut block_sizes = vec![0_usize; k as usize];
    for u in 0..g.num_nodes() {
        assert!(mapping[u] < k, "block {} out of range", mapping[u]);
        block_weights[mapping[u] as usize] += g.vertex_weight(u);
        block_sizes[mapping[u] as usize] += 1;
    }
    assert_eq!(block_sizes.iter().sum::<usize>(), g.num_nodes());
    let lmax = ((1.0 + config.imbalance) * g.total_weight() as f64 / k as f64).ceil() as u64;
    for (b, &w) in block_weights.iter().enumerate() {
        assert!(w <= lmax, "block {} has weight {} > {}", b, w, lmax);
    }
}

#[test]
fn test_bisect_path4() {
    // the minimum cut of a 3-edge path is one edge, and the halves are even
    let g = path(4);
    let c = config(vec![2], vec![1], 0.05, 1, Strategy::Naive, 0);
    let (mapping, cost) = solve(&g, &c);
    check_valid(&g, &c, &mapping);
    assert_eq!(cost, 1);
    assert_eq!(mapping[0], mapping[1]);
    assert_eq!(mapping[2], mapping[3]);
    assert_ne!(mapping[0], mapping[2]);
}

#[test]
fn test_disjoint_pair_is_cut_free() {
    let g = graph_from_edges(4, &[(0, 1, 1), (2, 3, 1)], vec![1; 4]);
    let c = config(vec![2], vec![1], 0.0, 1, Strategy::Naive, 0);
    let (mapping, cost) = solve(&g, &c);
    check_valid(&g, &c, &mapping);
    assert_eq!(cost, 0);
    assert_eq!(mapping[0], mapping[1]);
    assert_eq!(mapping[2], mapping[3]);
    assert_ne!(mapping[0], mapping[2]);
}

#[test]
fn test_two_level_hierarchy() {
    let g = path(8);
    for strategy in ALL_STRATEGIES {
        let c = config(vec![2, 2], vec![10, 1], 0.05, 4, strategy, 1);
        let (mapping, cost) = solve(&g, &c);
        check_valid(&g, &c, &mapping);

        // strict balance: every leaf block gets exactly two vertices
        let mut sizes = vec![0; 4];
        for &b in &mapping {
            sizes[b as usize] += 1;
        }
        assert_eq!(sizes, vec![2; 4], "strategy {}", strategy);

        // the reported cost is the cost of the reported mapping
        let mut expected = 0;
        for u in 0..8 {
            for (v, w) in g.neighbors(u) {
                if u < v && mapping[u] != mapping[v] {
                    // siblings pay the bottom distance, the rest the top one
                    expected += w * if mapping[u] / 2 == mapping[v] / 2 { 10 } else { 1 };
                }
            }
        }
        assert_eq!(cost, expected, "strategy {}", strategy);
        assert_eq!(
            cost,
            communication_cost(&g, &c.hierarchy, &c.distance, &mapping)
        );
    }
}

#[test]
fn test_single_block_hierarchy_is_identity() {
    let g = path(6);
    let c = config(vec![1], vec![1], 0.05, 2, Strategy::Naive, 0);
    let (mapping, cost) = solve(&g, &c);
    assert_eq!(mapping, vec![0; 6]);
    assert_eq!(cost, 0);
}

#[test]
fn test_naive_and_layer_agree_single_threaded() {
    let g = path(16);
    for seed in [0, 1, 42] {
        let naive = solve(&g, &config(vec![2, 2], vec![1, 10], 0.05, 1, Strategy::Naive, seed)).0;
        let layer = solve(&g, &config(vec![2, 2], vec![1, 10], 0.05, 1, Strategy::Layer, seed)).0;
        assert_eq!(naive, layer, "seed {}", seed);
    }
}

#[test]
fn test_disconnected_graph_is_covered() {
    // two triangles and two isolated vertices
    let edges = [
        (0, 1, 2),
        (1, 2, 2),
        (0, 2, 2),
        (3, 4, 2),
        (4, 5, 2),
        (3, 5, 2),
    ];
    let g = graph_from_edges(8, &edges, vec![1; 8]);
    for strategy in ALL_STRATEGIES {
        let c = config(vec![2], vec![1], 0.1, 2, strategy, 3);
        let (mapping, _) = solve(&g, &c);
        check_valid(&g, &c, &mapping);
    }
}

#[test]
fn test_oversubscribed_flat_hierarchy() {
    // sixteen blocks out of a single partitioning call
    let g = path(32);
    for strategy in ALL_STRATEGIES {
        let c = config(vec![16], vec![1], 0.1, 4, strategy, 0);
        let (mapping, _) = solve(&g, &c);
        check_valid(&g, &c, &mapping);
    }
}

#[test]
fn test_oversubscribed_wide_level() {
    // the top level fans out into sixteen tasks over four threads, so every
    // strategy has to recycle threads through its counters
    let g = path(64);
    for strategy in ALL_STRATEGIES {
        let c = config(vec![2, 16], vec![1, 10], 0.1, 4, strategy, 0);
        let (mapping, _) = solve(&g, &c);
        check_valid(&g, &c, &mapping);
    }
}

#[test]
fn test_queue_with_many_intermediate_tasks() {
    let g = path(64);
    let c = config(vec![4, 4], vec![1, 10], 0.1, 8, Strategy::Queue, 0);
    let (mapping, _) = solve(&g, &c);
    check_valid(&g, &c, &mapping);
}

#[test]
fn test_deep_hierarchy() {
    let g = path(64);
    for strategy in ALL_STRATEGIES {
        let c = config(vec![2, 2, 2], vec![1, 10, 100], 0.1, 4, strategy, 7);
        let (mapping, _) = solve(&g, &c);
        check_valid(&g, &c, &mapping);
    }
}

#[test]
fn test_weighted_vertices_respect_balance() {
    let weights = vec![4, 1, 1, 1, 1, 4, 1, 3];
    let g = graph_from_edges(
        8,
        &[
            (0, 1, 1),
            (1, 2, 3),
            (2, 3, 1),
            (3, 4, 2),
            (4, 5, 1),
            (5, 6, 2),
            (6, 7, 1),
        ],
        weights,
    );
    for strategy in ALL_STRATEGIES {
        let c = config(vec![2, 2], vec![1, 10], 0.25, 2, strategy, 11);
        let (mapping, _) = solve(&g, &c);
        check_valid(&g, &c, &mapping);
    }
}

#[test]
fn test_infeasible_balance_fails() {
    // one vertex of weight 3 cannot fit into a bound of ⌈4/2⌉ = 2
    let g = graph_from_edges(2, &[(0, 1, 1)], vec![3, 1]);
    for (strategy, n_threads) in [
        (Strategy::Naive, 1),
        (Strategy::Naive, 2),
        (Strategy::Layer, 2),
        (Strategy::Queue, 2),
        (Strategy::NbLayer, 2),
    ] {
        let c = config(vec![2], vec![1], 0.0, n_threads, strategy, 0);
        let mut mapping = vec![0; 2];
        let result = hierarchical_multisection(&g, &c, &mut mapping, false);
        assert!(
            matches!(result, Err(Error::PartitionerFailure(_))),
            "strategy {} with {} threads",
            strategy,
            n_threads
        );
    }
}

#[test]
fn test_mapping_buffer_size_is_checked() {
    let g = path(4);
    let c = config(vec![2], vec![1], 0.05, 1, Strategy::Naive, 0);
    let mut too_short = vec![0; 3];
    assert!(matches!(
        hierarchical_multisection(&g, &c, &mut too_short, false),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_single_vertex_with_empty_blocks() {
    // one vertex under an 8-leaf hierarchy: all but one subtree is empty
    // from the first split on, and the recursion must still terminate
    let g = graph_from_edges(1, &[], vec![1]);
    for strategy in ALL_STRATEGIES {
        let c = config(vec![2, 2, 2], vec![1, 10, 100], 0.05, 2, strategy, 0);
        let (mapping, cost) = solve(&g, &c);
        assert_eq!(mapping.len(), 1);
        assert!(mapping[0] < 8, "strategy {}", strategy);
        assert_eq!(cost, 0);
    }
}
