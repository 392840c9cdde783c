/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The scheduling strategies.
//!
//! Every strategy drives the same recursion: partition the subgraph of an
//! item, fold the result into the global mapping if the item sits at the
//! bottom level, extract the child subgraphs otherwise. The strategies
//! differ only in how the pending items and the fixed thread budget are
//! handed around, see [`naive`], [`layer`], [`queue`] and [`nb_layer`]. With
//! a budget of one thread all of them collapse to [`serial`].

pub mod item;
pub mod layer;
pub mod naive;
pub mod nb_layer;
pub mod queue;
pub mod serial;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::config::AlgorithmConfig;
use crate::partition::extract::extract_subgraphs;
use crate::partition::{adaptive_imbalance, partition_graph};
use crate::sched::item::Item;
use crate::stats::StatCollector;
use crate::utils::SyncUnsafeSlice;
use crate::{Error, Result};

/// The read-shared state every worker needs.
pub(crate) struct SchedCtx<'a> {
    pub config: &'a AlgorithmConfig,
    /// The vertex weight of the root graph, fixed once for the adaptive
    /// imbalance rule.
    pub global_weight: u64,
    pub stats: &'a StatCollector,
}

/// What processing one item produced.
pub(crate) enum StepOutcome {
    /// The subtree below the item is complete; `leaf_blocks` is the number
    /// of leaf blocks it accounts for.
    Done { leaf_blocks: u64 },
    /// The item was split; the children now await processing.
    Children(Vec<Item<'static>>),
}

/// Partitions one item and either folds its leaf assignment into the global
/// mapping or extracts its children.
///
/// The item is consumed: an owned subgraph and its translation table are
/// freed on return, which is exactly when the last use of them ends.
pub(crate) fn process_item(
    item: Item<'_>,
    n_partition_threads: usize,
    n_extract_threads: usize,
    ctx: &SchedCtx<'_>,
    solution: &SyncUnsafeSlice<'_, u64>,
) -> Result<StepOutcome> {
    let config = ctx.config;
    let depth = config.depth_of(item.identifier.len());
    let g = item.graph();
    let local_k = config.hierarchy[depth];

    // a block left empty by the partitioner ends its subtree right here
    if g.num_nodes() == 0 {
        return Ok(StepOutcome::Done {
            leaf_blocks: config.k_rem_vec[depth],
        });
    }

    let local_imbalance = adaptive_imbalance(
        config.imbalance,
        ctx.global_weight,
        config.k,
        g.total_weight(),
        config.k_rem_vec[depth],
        depth + 1,
    )
    .max(0.0);

    let partition = partition_graph(
        g,
        local_k,
        local_imbalance,
        n_partition_threads,
        depth,
        &config.serial_algs,
        &config.parallel_algs,
        config.seed,
        ctx.stats,
    )?;

    if depth == 0 {
        // leaf tasks own disjoint slices of the root vertex set, so the
        // unsynchronized writes cannot overlap
        let offset = config.offset_of(&item.identifier);
        let translation = item.translation();
        for u in 0..g.num_nodes() {
            unsafe { solution.write(translation.to_original(u), offset + partition[u]) };
        }
        Ok(StepOutcome::Done {
            leaf_blocks: local_k,
        })
    } else {
        Ok(StepOutcome::Children(extract_subgraphs(
            g,
            item.translation(),
            local_k,
            &partition,
            &item.identifier,
            depth,
            n_extract_threads,
            ctx.stats,
        )))
    }
}

/// Records the first failure of any worker.
///
/// A failing worker marks its subtree as terminal so that the schedule still
/// drains; the driver checks the slot once everything has settled and
/// discards the partial mapping.
pub(crate) struct FailureSlot {
    failed: AtomicBool,
    error: Mutex<Option<Error>>,
}

impl FailureSlot {
    pub fn new() -> Self {
        Self {
            failed: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    /// Stores `error` unless another failure was recorded first.
    pub fn record(&self, error: Error) {
        if !self.failed.swap(true, Ordering::SeqCst) {
            *self.error.lock().unwrap() = Some(error);
        }
    }

    pub fn is_set(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns `Err` with the recorded failure, if any.
    pub fn check(&self) -> Result<()> {
        match self.error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// The per-task thread share of the layered strategies: an even split of the
/// budget over the layer, with the remainder going to the first workers, and
/// never less than one.
#[inline]
pub(crate) fn layer_thread_share(n_threads: usize, layer_size: usize, worker: usize) -> usize {
    std::cmp::max(1, n_threads / layer_size)
        + ((n_threads > layer_size) && (worker < n_threads % layer_size)) as usize
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_layer_thread_share() {
        // more tasks than threads: everybody gets the minimum of one
        assert_eq!(layer_thread_share(2, 8, 0), 1);
        assert_eq!(layer_thread_share(2, 8, 1), 1);
        // even split
        assert_eq!(layer_thread_share(8, 4, 3), 2);
        // 7 threads over 3 workers: 3, 2, 2
        assert_eq!(layer_thread_share(7, 3, 0), 3);
        assert_eq!(layer_thread_share(7, 3, 1), 2);
        assert_eq!(layer_thread_share(7, 3, 2), 2);
        // the shares of a full fan-out sum to the budget
        for (n_threads, layer_size) in [(8, 3), (5, 5), (16, 2), (3, 9)] {
            let workers = layer_size.min(n_threads);
            let total: usize = (0..workers)
                .map(|t| layer_thread_share(n_threads, layer_size, t))
                .sum();
            if n_threads >= layer_size {
                assert_eq!(total, n_threads);
            } else {
                assert_eq!(total, workers);
            }
        }
    }

    #[test]
    fn test_failure_slot_keeps_first() {
        let slot = FailureSlot::new();
        assert!(!slot.is_set());
        slot.record(Error::PartitionerFailure("first".into()));
        slot.record(Error::PartitionerFailure("second".into()));
        assert!(slot.is_set());
        match slot.check() {
            Err(Error::PartitionerFailure(msg)) => assert_eq!(msg, "first"),
            _ => panic!("expected the first failure"),
        }
    }
}
