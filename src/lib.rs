/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
mod error;
pub mod graphs;
pub mod partition;
pub mod qap;
pub mod sched;
pub mod solver;
pub mod stats;
pub mod utils;

pub use error::Error;

/// A [`core::result::Result`] with a [`enum@crate::Error`] error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Prelude module to import everything from this crate
pub mod prelude {
    pub use crate::config::*;
    pub use crate::graphs::prelude::*;
    pub use crate::qap::communication_cost;
    pub use crate::solver::*;
    pub use crate::stats::StatCollector;
    pub use crate::utils::*;
    pub use crate::Error;
}
