/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The NB_LAYER strategy: layered scheduling without barriers.
//!
//! As in [`layer`](super::layer), work proceeds in layers, but privately:
//! every worker collects the children of the items it processed and, once
//! its slice of the current layer is exhausted, immediately spawns the next
//! round over its own buffer without waiting for siblings. Threads released
//! by finished subtrees accumulate in a shared counter and are drained by
//! whichever worker partitions next, so an in-progress branch picks up the
//! slack of its siblings.
//!
//! A worker holding fewer threads than buffered items spawns one worker per
//! thread instead, and those consume the buffer through a shared index.
//!
//! Completion is tracked by a counter of finished leaf blocks, which must
//! equal k at the end; the workers run inside a scope, so the driver joins
//! whatever was spawned transitively and the counter check is an assertion
//! rather than a spin.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::Scope;

use crate::config::AlgorithmConfig;
use crate::graphs::CsrGraph;
use crate::sched::item::Item;
use crate::sched::{layer_thread_share, process_item, FailureSlot, SchedCtx, StepOutcome};
use crate::stats::StatCollector;
use crate::utils::{SyncUnsafeSlice, TranslationTable};
use crate::Result;

/// One layer buffer, consumed cooperatively through an atomic index.
struct Layer<'g> {
    slots: Vec<Mutex<Option<Item<'g>>>>,
    next_index: AtomicUsize,
}

impl<'g> Layer<'g> {
    /// Wraps `items` into slots; the first `claimed` indices are already
    /// spoken for by the workers about to start.
    fn new(items: Vec<Item<'g>>, claimed: usize) -> Self {
        Self {
            slots: items.into_iter().map(|item| Mutex::new(Some(item))).collect(),
            next_index: AtomicUsize::new(claimed),
        }
    }
}

/// Everything the workers share.
struct NbShared<'a> {
    ctx: SchedCtx<'a>,
    solution: SyncUnsafeSlice<'a, u64>,
    /// Threads released by workers that ran out of work.
    inactive_threads: AtomicUsize,
    /// Leaf blocks finished so far; reaches k exactly at the end.
    completed_leaves: AtomicU64,
    failure: FailureSlot,
}

fn nb_layer_work<'scope, 'g: 'scope>(
    s: &'scope Scope<'scope, '_>,
    shared: &'scope NbShared<'scope>,
    layer: Arc<Layer<'g>>,
    layer_size: usize,
    mut index: usize,
    mut n_assigned: usize,
) {
    let mut next_items: Vec<Item<'static>> = Vec::new();

    while index < layer_size {
        // adopt whatever threads finished siblings have released
        n_assigned += shared.inactive_threads.swap(0, Ordering::SeqCst);

        let item = layer.slots[index]
            .lock()
            .unwrap()
            .take()
            .expect("every layer slot is claimed exactly once");
        let config = shared.ctx.config;
        let leaves_below = config.k_rem_vec[config.depth_of(item.identifier.len())];

        if shared.failure.is_set() {
            // drain the rest of the schedule, keeping the completion
            // counter truthful about the abandoned subtree
            shared
                .completed_leaves
                .fetch_add(leaves_below, Ordering::SeqCst);
        } else {
            match process_item(item, n_assigned, n_assigned, &shared.ctx, &shared.solution) {
                Ok(StepOutcome::Done { leaf_blocks }) => {
                    shared
                        .completed_leaves
                        .fetch_add(leaf_blocks, Ordering::SeqCst);
                }
                Ok(StepOutcome::Children(children)) => next_items.extend(children),
                Err(e) => {
                    shared.failure.record(e);
                    shared
                        .completed_leaves
                        .fetch_add(leaves_below, Ordering::SeqCst);
                }
            }
        }

        index = layer.next_index.fetch_add(1, Ordering::SeqCst);
    }

    if next_items.is_empty() {
        // nothing to follow up on: hand the threads to the siblings
        shared
            .inactive_threads
            .fetch_add(n_assigned, Ordering::SeqCst);
        return;
    }

    // spawn the next round over the private buffer; with fewer threads than
    // items the spawned workers oversubscribe through the shared index
    let n_items = next_items.len();
    let workers = n_assigned.min(n_items);
    let next = Arc::new(Layer::new(next_items, workers));
    for t in 0..workers {
        let share = layer_thread_share(n_assigned, n_items, t);
        let next = next.clone();
        s.spawn(move || nb_layer_work(s, shared, next, n_items, t, share));
    }
}

/// Processes the hierarchy in layers without inter-level barriers.
pub fn solve_nb_layer(
    g: &CsrGraph,
    config: &AlgorithmConfig,
    stats: &StatCollector,
) -> Result<Vec<u64>> {
    let mut solution = vec![0; g.num_nodes()];
    let root_translation = TranslationTable::identity(g.num_nodes());

    {
        let shared = NbShared {
            ctx: SchedCtx {
                config,
                global_weight: g.total_weight(),
                stats,
            },
            solution: SyncUnsafeSlice::new(&mut solution),
            inactive_threads: AtomicUsize::new(0),
            completed_leaves: AtomicU64::new(0),
            failure: FailureSlot::new(),
        };
        let root_layer = Arc::new(Layer::new(vec![Item::root(g, &root_translation)], 1));

        std::thread::scope(|s| {
            // the driver runs the root item itself; everything spawned
            // transitively is joined by the scope
            nb_layer_work(s, &shared, root_layer, 1, 0, config.n_threads);
        });

        shared.failure.check()?;
        debug_assert_eq!(shared.completed_leaves.load(Ordering::SeqCst), config.k);
    }

    Ok(solution)
}
