/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The QUEUE strategy: a priority queue of ready tasks.
//!
//! The driver spin-waits until threads and work are available, pops the
//! largest pending subgraph and hands it `⌈available/pending⌉` threads; the
//! worker pushes its children back and releases its threads when done. At
//! every quiescent instant the assigned threads and the available counter
//! sum to the budget, and the run is over exactly when all threads are back
//! and the queue is empty.
//!
//! The workers are logically detached, but they run inside a scope so the
//! driver cannot leave work behind.

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::config::AlgorithmConfig;
use crate::graphs::CsrGraph;
use crate::sched::item::Item;
use crate::sched::{process_item, FailureSlot, SchedCtx, StepOutcome};
use crate::stats::StatCollector;
use crate::utils::{SyncUnsafeSlice, TranslationTable};
use crate::Result;

/// Processes the hierarchy with a priority queue, largest subgraph first.
pub fn solve_queue(
    g: &CsrGraph,
    config: &AlgorithmConfig,
    stats: &StatCollector,
) -> Result<Vec<u64>> {
    let n_threads = config.n_threads as u64;
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
        let queue = Mutex::new(BinaryHeap::from(vec![Item::root(g, &root_translation)]));
        let queue_size = AtomicU64::new(1);
        let available_threads = AtomicU64::new(n_threads);

        std::thread::scope(|s| {
            loop {
                // wait for work and threads, or for the run to drain
                loop {
                    let available = available_threads.load(Ordering::SeqCst);
                    let pending = queue_size.load(Ordering::SeqCst);
                    if (available > 0 && pending > 0)
                        || (available == n_threads && pending == 0)
                    {
                        break;
                    }
                    std::hint::spin_loop();
                }

                let mut guard = queue.lock().unwrap();
                if available_threads.load(Ordering::SeqCst) == n_threads
                    && queue_size.load(Ordering::SeqCst) == 0
                {
                    break;
                }

                // the driver is the only consumer, so the queue cannot have
                // emptied since the spin saw it non-empty
                let n_assigned = available_threads
                    .load(Ordering::SeqCst)
                    .div_ceil(queue_size.load(Ordering::SeqCst));
                let item = guard.pop().expect("the driver is the only consumer");
                available_threads.fetch_sub(n_assigned, Ordering::SeqCst);
                queue_size.fetch_sub(1, Ordering::SeqCst);
                drop(guard);

                let (queue, queue_size, available_threads) =
                    (&queue, &queue_size, &available_threads);
                let (ctx, failure) = (&ctx, &failure);
                s.spawn(move || {
                    match process_item(
                        item,
                        n_assigned as usize,
                        n_threads as usize,
                        ctx,
                        &solution,
                    ) {
                        Ok(StepOutcome::Done { .. }) => {
                            available_threads.fetch_add(n_assigned, Ordering::SeqCst);
                        }
                        Ok(StepOutcome::Children(children)) => {
                            let mut guard = queue.lock().unwrap();
                            let count = children.len() as u64;
                            for child in children {
                                guard.push(child);
                            }
                            available_threads.fetch_add(n_assigned, Ordering::SeqCst);
                            queue_size.fetch_add(count, Ordering::SeqCst);
                            drop(guard);
                        }
                        Err(e) => {
                            failure.record(e);
                            available_threads.fetch_add(n_assigned, Ordering::SeqCst);
                        }
                    }
                });
            }
        });
        failure.check()?;
    }

    Ok(solution)
}
