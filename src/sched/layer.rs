/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The LAYER strategy: one barrier per hierarchy level.
//!
//! The driver walks the hierarchy level by level. For every level it fans
//! out `min(|layer|, N)` workers; each worker starts on a distinct item and
//! claims further items through a shared counter. Children are written into
//! a next-layer buffer preallocated at `k · |layer|` slots, so no worker
//! ever contends with another on a slot. The join at the end of the level is
//! the barrier: only when the whole layer is done does the driver swap in
//! the next one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::config::AlgorithmConfig;
use crate::graphs::CsrGraph;
use crate::sched::item::Item;
use crate::sched::{layer_thread_share, process_item, FailureSlot, SchedCtx, StepOutcome};
use crate::stats::StatCollector;
use crate::utils::{SyncUnsafeSlice, TranslationTable};
use crate::Result;

/// Processes the hierarchy one level at a time, with a barrier between
/// levels.
pub fn solve_layer(
    g: &CsrGraph,
    config: &AlgorithmConfig,
    stats: &StatCollector,
) -> Result<Vec<u64>> {
    let n_threads = config.n_threads;
    let levels = config.num_levels();
    let mut solution = vec![0; g.num_nodes()];
    let root_translation = TranslationTable::identity(g.num_nodes());
    let ctx = SchedCtx {
        config,
        global_weight: g.total_weight(),
        stats,
    };
    let failure = FailureSlot::new();

    {
        let solution = SyncUnsafeSlice::new(&mut solution);
        let mut layer = vec![Item::root(g, &root_translation)];

        for level in 0..levels {
            let depth = levels - 1 - level;
            let local_k = config.hierarchy[depth] as usize;
            let layer_size = layer.len();

            // slots of the current layer, claimed by index
            let current = std::mem::take(&mut layer)
                .into_iter()
                .map(|item| Mutex::new(Some(item)))
                .collect::<Vec<_>>();
            // the bottom level produces no children
            let next_slots = if depth != 0 { local_k * layer_size } else { 0 };
            let next = (0..next_slots)
                .map(|_| Mutex::new(None))
                .collect::<Vec<_>>();

            let workers = layer_size.min(n_threads);
            let next_index = AtomicUsize::new(workers);

            std::thread::scope(|s| {
                for t in 0..workers {
                    let n_assigned = layer_thread_share(n_threads, layer_size, t);
                    let (current, next, next_index) = (&current, &next, &next_index);
                    let (ctx, failure) = (&ctx, &failure);
                    s.spawn(move || {
                        let mut index = t;
                        while index < layer_size && !failure.is_set() {
                            let item = current[index]
                                .lock()
                                .unwrap()
                                .take()
                                .expect("every layer slot is claimed exactly once");
                            match process_item(item, n_assigned, n_threads, ctx, &solution) {
                                Ok(StepOutcome::Done { .. }) => {}
                                Ok(StepOutcome::Children(children)) => {
                                    for (b, child) in children.into_iter().enumerate() {
                                        *next[index * local_k + b].lock().unwrap() = Some(child);
                                    }
                                }
                                Err(e) => failure.record(e),
                            }
                            index = next_index.fetch_add(1, Ordering::Relaxed);
                        }
                    });
                }
            });
            failure.check()?;

            layer = next
                .into_iter()
                .filter_map(|slot| slot.into_inner().unwrap())
                .collect();
        }
    }

    Ok(solution)
}
