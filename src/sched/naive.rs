/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The NAIVE strategy: one task at a time, all threads to the kernel.
//!
//! The outer driver is single threaded and keeps an explicit stack of
//! pending items; all the parallelism of the run happens inside the
//! partitioning kernels and the extractor, which receive the full budget.

use crate::config::AlgorithmConfig;
use crate::graphs::CsrGraph;
use crate::sched::item::Item;
use crate::sched::{process_item, SchedCtx, StepOutcome};
use crate::stats::StatCollector;
use crate::utils::{SyncUnsafeSlice, TranslationTable};
use crate::Result;

/// Processes the hierarchy depth first, handing the whole thread budget to
/// every partitioning and extraction call.
pub fn solve_naive(
    g: &CsrGraph,
    config: &AlgorithmConfig,
    stats: &StatCollector,
) -> Result<Vec<u64>> {
    let n_threads = config.n_threads;
    let mut solution = vec![0; g.num_nodes()];
    let root_translation = TranslationTable::identity(g.num_nodes());
    let ctx = SchedCtx {
        config,
        global_weight: g.total_weight(),
        stats,
    };

    {
        let solution = SyncUnsafeSlice::new(&mut solution);
        let mut stack = vec![Item::root(g, &root_translation)];
        while let Some(item) = stack.pop() {
            match process_item(item, n_threads, n_threads, &ctx, &solution)? {
                StepOutcome::Done { .. } => {}
                StepOutcome::Children(children) => stack.extend(children),
            }
        }
    }

    Ok(solution)
}
