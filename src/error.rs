/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use thiserror::Error;

/// The errors surfaced by the mapping pipeline.
///
/// The scheduler itself has no recoverable failure mode: once the input has
/// passed validation, any error reported here is fatal for the current
/// computation and no partition is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The graph or the parameters failed the input checks.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A partitioning-algorithm name or id could not be resolved.
    #[error("algorithm {0} not recognized")]
    UnknownAlgorithm(String),
    /// A scheduling-strategy name or id could not be resolved.
    #[error("strategy {0} not recognized")]
    UnknownStrategy(String),
    /// A partitioning kernel failed or returned an unusable partition.
    #[error("partitioner failure: {0}")]
    PartitionerFailure(String),
    /// Reading the graph or writing the mapping failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
