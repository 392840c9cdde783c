/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The built-in partitioning kernels.
//!
//! Every algorithm id resolves to the same seeded kernel — greedy graph
//! growing followed by boundary refinement — with a restart budget that
//! grows with the quality of the requested variant. The serial family runs
//! its restarts sequentially; the parallel family runs them on a thread pool
//! bounded by the number of assigned threads. The selection among restarts
//! is deterministic for a fixed seed, independently of the thread count.

use std::collections::{HashMap, VecDeque};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::Algorithm;
use crate::graphs::CsrGraph;
use crate::{Error, Result};

const UNASSIGNED: u64 = u64::MAX;
const MAX_REFINEMENT_PASSES: usize = 4;

/// One finished restart; candidates are compared by cut first, then by
/// balance, then by restart index to make the choice deterministic.
struct Candidate {
    cut: u64,
    max_block_weight: u64,
    restart: usize,
    labels: Vec<u64>,
}

fn restarts_of(alg: Algorithm) -> usize {
    match alg {
        Algorithm::KaffpaFast => 1,
        Algorithm::KaffpaEco => 4,
        Algorithm::KaffpaStrong => 16,
        Algorithm::MtkahyparDefault => 2,
        Algorithm::MtkahyparQuality => 8,
        Algorithm::MtkahyparHighestQuality => 32,
    }
}

fn is_parallel(alg: Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::MtkahyparDefault
            | Algorithm::MtkahyparQuality
            | Algorithm::MtkahyparHighestQuality
    )
}

/// Computes a `k`-way partition of `g` with block weights bounded by
/// `⌈(1 + imbalance)·W/k⌉`.
///
/// Fails if no restart produces a partition within the bound, which is
/// possible for very tight imbalances.
pub fn partition(
    alg: Algorithm,
    g: &CsrGraph,
    k: u64,
    imbalance: f64,
    n_threads: usize,
    seed: u64,
) -> Result<Vec<u64>> {
    debug_assert!(k >= 2);
    if g.num_nodes() == 0 {
        return Ok(Vec::new());
    }

    let max_block_weight =
        ((1.0 + imbalance) * g.total_weight() as f64 / k as f64).ceil() as u64;
    let restarts = restarts_of(alg);

    let best = if is_parallel(alg) && n_threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| Error::PartitionerFailure(format!("could not create thread pool: {}", e)))?;
        pool.install(|| {
            (0..restarts)
                .into_par_iter()
                .filter_map(|restart| restart_once(g, k, max_block_weight, seed, restart))
                .min_by_key(|c| (c.cut, c.max_block_weight, c.restart))
        })
    } else {
        (0..restarts)
            .filter_map(|restart| restart_once(g, k, max_block_weight, seed, restart))
            .min_by_key(|c| (c.cut, c.max_block_weight, c.restart))
    };

    match best {
        Some(candidate) => Ok(candidate.labels),
        None => Err(Error::PartitionerFailure(format!(
            "no {}-way partition with block weights below {} found in {} restarts",
            k, max_block_weight, restarts
        ))),
    }
}

fn restart_once(
    g: &CsrGraph,
    k: u64,
    max_block_weight: u64,
    seed: u64,
    restart: usize,
) -> Option<Candidate> {
    let mut labels = grow(g, k, max_block_weight, seed, restart);
    refine(g, &mut labels, k, max_block_weight);
    let (cut, heaviest) = evaluate(g, &labels, k);
    if heaviest > max_block_weight {
        return None;
    }
    Some(Candidate {
        cut,
        max_block_weight: heaviest,
        restart,
        labels,
    })
}

/// Returns the first unassigned vertex at or after `start`, wrapping around.
fn next_unassigned(labels: &[u64], start: usize) -> usize {
    let n = labels.len();
    let mut u = start;
    loop {
        if labels[u] == UNASSIGNED {
            return u;
        }
        u = (u + 1) % n;
    }
}

/// Grows the first `k - 1` blocks by breadth-first search up to an adaptive
/// weight target; whatever is left becomes the last block.
fn grow(g: &CsrGraph, k: u64, max_block_weight: u64, seed: u64, restart: usize) -> Vec<u64> {
    let n = g.num_nodes();
    let mut labels = vec![UNASSIGNED; n];
    let mut rng = SmallRng::seed_from_u64(seed ^ (restart as u64).wrapping_mul(0x9e3779b97f4a7c15));
    let mut remaining_weight = g.total_weight();
    let mut assigned = 0;
    let mut cursor = 0;
    let mut queue = VecDeque::new();

    for b in 0..k - 1 {
        // aim at an even share of what is still unassigned
        let target = remaining_weight.div_ceil(k - b);
        let mut block_weight = 0;
        queue.clear();

        while block_weight < target && assigned < n {
            let (u, fresh) = match queue.pop_front() {
                Some(u) => (u, false),
                None => {
                    // restart 0 always grows from the lowest unassigned id,
                    // later restarts grow from random positions
                    let hint = if restart == 0 {
                        cursor
                    } else {
                        rng.random_range(0..n)
                    };
                    let u = next_unassigned(&labels, hint);
                    if restart == 0 {
                        cursor = u;
                    }
                    (u, true)
                }
            };
            if labels[u] != UNASSIGNED {
                continue;
            }
            if block_weight + g.vertex_weight(u) > max_block_weight {
                if fresh {
                    // no seed vertex fits, the block stays underfull
                    break;
                }
                continue;
            }
            labels[u] = b;
            block_weight += g.vertex_weight(u);
            remaining_weight -= g.vertex_weight(u);
            assigned += 1;
            for (v, _) in g.neighbors(u) {
                if labels[v] == UNASSIGNED {
                    queue.push_back(v);
                }
            }
        }
    }

    for label in labels.iter_mut() {
        if *label == UNASSIGNED {
            *label = k - 1;
        }
    }
    labels
}

/// Greedy boundary refinement: moves a vertex to the neighboring block it is
/// most connected to, whenever that strictly reduces the cut and respects
/// the weight bound.
fn refine(g: &CsrGraph, labels: &mut [u64], k: u64, max_block_weight: u64) {
    let n = g.num_nodes();
    let mut block_weight = vec![0; k as usize];
    for u in 0..n {
        block_weight[labels[u] as usize] += g.vertex_weight(u);
    }

    for _ in 0..MAX_REFINEMENT_PASSES {
        let mut moved = 0;
        for u in 0..n {
            if g.degree(u) == 0 {
                continue;
            }
            let current = labels[u];
            let mut connectivity = HashMap::new();
            for (v, w) in g.neighbors(u) {
                *connectivity.entry(labels[v]).or_insert(0_u64) += w;
            }
            let internal = connectivity.get(&current).copied().unwrap_or(0);

            // the hash map order is arbitrary, so ties go to the smallest
            // block id to keep the result deterministic
            let mut best: Option<(u64, u64)> = None;
            for (&block, &weight) in &connectivity {
                if block == current
                    || weight <= internal
                    || block_weight[block as usize] + g.vertex_weight(u) > max_block_weight
                {
                    continue;
                }
                best = match best {
                    Some((bw, bb)) if (bw, std::cmp::Reverse(bb)) >= (weight, std::cmp::Reverse(block)) => {
                        Some((bw, bb))
                    }
                    _ => Some((weight, block)),
                };
            }
            if let Some((_, block)) = best {
                block_weight[current as usize] -= g.vertex_weight(u);
                block_weight[block as usize] += g.vertex_weight(u);
                labels[u] = block;
                moved += 1;
            }
        }
        if moved == 0 {
            break;
        }
    }
}

fn evaluate(g: &CsrGraph, labels: &[u64], k: u64) -> (u64, u64) {
    let mut block_weight = vec![0; k as usize];
    let mut cut = 0;
    for u in 0..g.num_nodes() {
        block_weight[labels[u] as usize] += g.vertex_weight(u);
        for (v, w) in g.neighbors(u) {
            if u < v && labels[u] != labels[v] {
                cut += w;
            }
        }
    }
    (cut, block_weight.into_iter().max().unwrap_or(0))
}
