/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Fully serial recursion, used whenever the thread budget is one.

use crate::config::AlgorithmConfig;
use crate::graphs::CsrGraph;
use crate::sched::item::Item;
use crate::sched::{process_item, SchedCtx, StepOutcome};
use crate::stats::StatCollector;
use crate::utils::{SyncUnsafeSlice, TranslationTable};
use crate::Result;

/// Processes the whole hierarchy on the calling thread, depth first.
pub fn solve_serial(
    g: &CsrGraph,
    config: &AlgorithmConfig,
    stats: &StatCollector,
) -> Result<Vec<u64>> {
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
            match process_item(item, 1, 1, &ctx, &solution)? {
                StepOutcome::Done { .. } => {}
                StepOutcome::Children(children) => stack.extend(children),
            }
        }
    }

    Ok(solution)
}
