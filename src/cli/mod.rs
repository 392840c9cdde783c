/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The command-line interface of the `sharedmap` binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{parse_int_vec, AlgorithmConfig, ConfigPreset, Strategy};
use crate::solver::Solver;

#[derive(Parser, Debug)]
#[command(
    name = "sharedmap",
    version,
    about = "Maps the vertices of a weighted graph onto the leaves of a tree topology."
)]
pub struct Args {
    /// The graph to map, in METIS format.
    #[arg(short, long)]
    pub graph: PathBuf,

    /// The file the mapping is written to, one block index per line.
    #[arg(short, long)]
    pub mapping: PathBuf,

    /// The hierarchy of the topology as colon-separated integers, e.g. 4:8:6
    /// for six racks of eight processors with four cores each.
    #[arg(long)]
    pub hierarchy: String,

    /// The communication cost at each level of the hierarchy as
    /// colon-separated integers, e.g. 1:10:100.
    #[arg(long)]
    pub distance: String,

    /// The allowed imbalance, e.g. 0.03 for at most 3% over the average
    /// block weight.
    #[arg(short, long)]
    pub imbalance: f64,

    /// The algorithm configuration used on every level.
    #[arg(short, long, default_value_t = ConfigPreset::Fast)]
    pub config: ConfigPreset,

    /// The number of threads to use.
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// The strategy distributing the threads across concurrent tasks.
    #[arg(short, long, default_value_t = Strategy::NbLayer)]
    pub strategy: Strategy,

    /// The random seed diversifying partitioning results; defaults to OS
    /// entropy.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log a summary of the solution.
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn main(args: Args) -> Result<()> {
    let hierarchy = parse_int_vec(&args.hierarchy).context("Could not parse the hierarchy")?;
    let distance = parse_int_vec(&args.distance).context("Could not parse the distance")?;
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = AlgorithmConfig::with_preset(
        hierarchy,
        distance,
        args.imbalance,
        args.config,
        args.threads,
        args.strategy,
        seed,
    )
    .context("Could not build the algorithm configuration")?;

    let mut solver = Solver::new(&config);
    let comm_cost = solver
        .solve_file(&args.graph, &args.mapping, args.verbose)
        .context("Could not compute the mapping")?;
    log::info!("Communication cost: {}", comm_cost);

    println!("{}", serde_json::to_string_pretty(&solver.report())?);
    Ok(())
}
