/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The partitioner façade and the subgraph extractor.
//!
//! [`partition_graph`] hides the choice of the concrete kernel from the
//! schedulers: it picks the serial or the parallel algorithm configured for
//! the current level depending on how many threads the task was assigned,
//! short-circuits single-block calls, checks the label range of whatever the
//! kernel returns, and logs the wall time of the call.

pub mod extract;
pub mod kernels;

use std::time::Instant;

use crate::config::Algorithm;
use crate::graphs::CsrGraph;
use crate::stats::StatCollector;
use crate::{Error, Result};

/// Computes the imbalance budget for one partitioning call.
///
/// A subgraph of weight `local_weight` at recursion distance
/// `remaining_levels` from the leaves (counting the current split) may use
/// only part of the global imbalance: the budget is chosen so that the
/// product of the per-level relaxations over the remaining levels matches
/// the global bound against the original graph weight,
///
/// ```text
/// ε = ((1 + ε₀) · (k_rem · W) / (k · w))^(1/r) − 1
/// ```
///
/// where `k_rem` is the number of leaf blocks this subtree will produce.
/// The result can be negative when the subgraph is already heavier than its
/// share; callers clamp it to zero.
pub fn adaptive_imbalance(
    global_imbalance: f64,
    global_weight: u64,
    global_k: u64,
    local_weight: u64,
    k_rem: u64,
    remaining_levels: usize,
) -> f64 {
    debug_assert!(local_weight > 0);
    let ratio = (1.0 + global_imbalance) * (k_rem * global_weight) as f64
        / (global_k * local_weight) as f64;
    ratio.powf(1.0 / remaining_levels as f64) - 1.0
}

/// Partitions `g` into `k` blocks.
///
/// With one assigned thread the serial algorithm configured for `depth` is
/// used, otherwise the parallel one. A single-block call returns the
/// constant-zero assignment without invoking any kernel. The call is logged
/// to the statistics collector either way.
#[allow(clippy::too_many_arguments)]
pub fn partition_graph(
    g: &CsrGraph,
    k: u64,
    imbalance: f64,
    n_threads: usize,
    depth: usize,
    serial_algs: &[Algorithm],
    parallel_algs: &[Algorithm],
    seed: u64,
    stats: &StatCollector,
) -> Result<Vec<u64>> {
    let alg = if n_threads == 1 {
        serial_algs[depth]
    } else {
        parallel_algs[depth]
    };

    let start = Instant::now();
    let partition = if k == 1 {
        vec![0; g.num_nodes()]
    } else {
        let partition = kernels::partition(alg, g, k, imbalance, n_threads, seed)?;
        if let Some(&label) = partition.iter().find(|&&label| label >= k) {
            return Err(Error::PartitionerFailure(format!(
                "{} produced block {} for a {}-way partition",
                alg, label, k
            )));
        }
        partition
    };
    let end = Instant::now();

    stats.log_partition(depth, g.num_nodes(), alg, n_threads, imbalance, k, start, end);
    Ok(partition)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_adaptive_imbalance_root() {
        // at the root the local weight is the global weight and all k blocks
        // remain, so the budget is the per-level root of the global bound
        let eps = adaptive_imbalance(0.21, 1000, 4, 1000, 4, 2);
        assert!((eps - (1.21_f64.sqrt() - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_adaptive_imbalance_last_level() {
        // a perfectly balanced subgraph one split away from the leaves gets
        // the full remaining budget
        let eps = adaptive_imbalance(0.05, 1000, 4, 500, 2, 1);
        assert!((eps - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_adaptive_imbalance_overweight_subgraph() {
        // an overweight subgraph gets a negative budget
        let eps = adaptive_imbalance(0.0, 1000, 4, 600, 2, 1);
        assert!(eps < 0.0);
    }

    #[test]
    fn test_single_block_fast_path() {
        let g = CsrGraph::from_parts(vec![1, 1], vec![0, 1, 2], vec![1, 0], vec![1, 1]);
        let stats = StatCollector::new(1);
        let partition = partition_graph(
            &g,
            1,
            0.0,
            1,
            0,
            &[Algorithm::KaffpaFast],
            &[Algorithm::MtkahyparDefault],
            0,
            &stats,
        )
        .unwrap();
        assert_eq!(partition, vec![0, 0]);
        // the fast path is logged too
        assert_eq!(stats.to_json()["k_per_graph"], serde_json::json!([1]));
    }
}
