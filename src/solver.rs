/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The solver tying validation, scheduling and reporting together.

use std::collections::{HashMap, HashSet};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use dsi_progress_logger::prelude::*;

use crate::config::{AlgorithmConfig, Strategy};
use crate::graphs::{read_metis, CsrGraph};
use crate::qap::communication_cost;
use crate::sched;
use crate::stats::StatCollector;
use crate::{Error, Result};

/// Runs the strategy selected by the configuration.
///
/// A budget of one thread short-circuits to the serial solver regardless of
/// the strategy; this is also what makes single-threaded runs of different
/// strategies bit-for-bit identical.
fn dispatch(g: &CsrGraph, config: &AlgorithmConfig, stats: &StatCollector) -> Result<Vec<u64>> {
    if config.n_threads == 1 {
        return sched::serial::solve_serial(g, config, stats);
    }
    match config.strategy {
        Strategy::Naive => sched::naive::solve_naive(g, config, stats),
        Strategy::Layer => sched::layer::solve_layer(g, config, stats),
        Strategy::Queue => sched::queue::solve_queue(g, config, stats),
        Strategy::NbLayer => sched::nb_layer::solve_nb_layer(g, config, stats),
    }
}

/// Computes a hierarchical process mapping and its communication cost.
///
/// The mapping of the vertices onto the `k` leaf blocks is written into
/// `mapping`, which must have one entry per vertex; the returned value is
/// the quadratic-assignment cost of that mapping.
///
/// The input is assumed to satisfy [`assert_input`]; the scheduler treats
/// violations as programmer errors.
pub fn hierarchical_multisection(
    g: &CsrGraph,
    config: &AlgorithmConfig,
    mapping: &mut [u64],
    verbose: bool,
) -> Result<u64> {
    if mapping.len() != g.num_nodes() {
        return Err(Error::InvalidInput(format!(
            "the mapping buffer has {} entries for {} vertices",
            mapping.len(),
            g.num_nodes()
        )));
    }
    let mut solver = Solver::new(config);
    let (result, comm_cost) = solver.solve(g, verbose)?;
    mapping.copy_from_slice(&result);
    Ok(comm_cost)
}

/// A solver for one configuration, accumulating timing statistics across
/// the run.
pub struct Solver<'a> {
    config: &'a AlgorithmConfig,
    stats: StatCollector,
    io_time: f64,
    solve_time: f64,
}

impl<'a> Solver<'a> {
    pub fn new(config: &'a AlgorithmConfig) -> Self {
        Self {
            config,
            stats: StatCollector::new(config.num_levels()),
            io_time: 0.0,
            solve_time: 0.0,
        }
    }

    /// Solves the mapping problem for `g` and returns the mapping together
    /// with its communication cost.
    pub fn solve(&mut self, g: &CsrGraph, verbose: bool) -> Result<(Vec<u64>, u64)> {
        let start = Instant::now();
        let mapping = dispatch(g, self.config, &self.stats)?;
        let comm_cost =
            communication_cost(g, &self.config.hierarchy, &self.config.distance, &mapping);
        self.solve_time += start.elapsed().as_secs_f64();

        if verbose {
            self.log_summary(g, &mapping, comm_cost);
        }
        Ok((mapping, comm_cost))
    }

    /// Reads a graph in METIS format, solves, and writes the mapping file,
    /// one block index per line in vertex order.
    pub fn solve_file(
        &mut self,
        graph_path: impl AsRef<Path>,
        mapping_path: impl AsRef<Path>,
        verbose: bool,
    ) -> Result<u64> {
        let mut pl = progress_logger!(item_name = "vertex");

        pl.start("Reading the graph...");
        let start = Instant::now();
        let g = read_metis(graph_path)?;
        self.io_time += start.elapsed().as_secs_f64();
        pl.done_with_count(g.num_nodes());

        let (v_weights, rows, adj, adj_weights) = g.as_parts();
        validate_input(
            v_weights,
            rows,
            adj,
            adj_weights,
            &self.config.hierarchy,
            &self.config.distance,
            self.config.imbalance,
            self.config.n_threads,
        )?;

        pl.start("Solving...");
        let (mapping, comm_cost) = self.solve(&g, verbose)?;
        pl.done_with_count(g.num_nodes());

        pl.start("Writing the mapping...");
        let start = Instant::now();
        let mut out = BufWriter::new(std::fs::File::create(mapping_path)?);
        for block in &mapping {
            writeln!(out, "{}", block)?;
        }
        out.flush()?;
        self.io_time += start.elapsed().as_secs_f64();
        pl.done_with_count(mapping.len());

        Ok(comm_cost)
    }

    /// Returns the timing report as one JSON object with nested arrays.
    pub fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "io_time": self.io_time,
            "solve_time": self.solve_time,
            "algorithm-configuration": self.config,
            "statistics": self.stats.to_json(),
        })
    }

    fn log_summary(&self, g: &CsrGraph, mapping: &[u64], comm_cost: u64) {
        let k = self.config.k;
        let lmax =
            ((1.0 + self.config.imbalance) * g.total_weight() as f64 / k as f64).ceil() as u64;

        let mut block_weights = vec![0; k as usize];
        for u in 0..g.num_nodes() {
            block_weights[mapping[u] as usize] += g.vertex_weight(u);
        }
        let max_weight = block_weights.iter().copied().max().unwrap_or(0);
        let empty = block_weights.iter().filter(|&&w| w == 0).count();
        let overloaded = block_weights.iter().filter(|&&w| w > lmax).count();
        let excess: u64 = block_weights.iter().map(|&w| w.saturating_sub(lmax)).sum();

        log::info!("Solve time        : {}", self.solve_time);
        log::info!("#Nodes            : {}", g.num_nodes());
        log::info!("#Edges            : {}", g.num_entries() / 2);
        log::info!("k                 : {}", k);
        log::info!("Lmax              : {}", lmax);
        log::info!("Final QAP         : {}", comm_cost);
        log::info!("max block w       : {}", max_weight);
        log::info!("#empty blocks     : {}", empty);
        log::info!("#overloaded blocks: {}", overloaded);
        log::info!("Sum overload      : {}", excess);
    }
}

/// Checks the graph and the parameters, returning a detailed reason for the
/// first violation found.
///
/// This is the fallible twin of [`assert_input`]; the graph is passed as its
/// raw CSR parts so that inconsistent sizes are reported instead of causing
/// panics.
#[allow(clippy::too_many_arguments)]
pub fn validate_input(
    v_weights: &[u64],
    rows: &[usize],
    adj: &[usize],
    adj_weights: &[u64],
    hierarchy: &[u64],
    distance: &[u64],
    imbalance: f64,
    n_threads: usize,
) -> Result<()> {
    let n = v_weights.len();
    if n == 0 {
        return Err(Error::InvalidInput("the graph has no vertices".into()));
    }
    if rows.len() != n + 1 {
        return Err(Error::InvalidInput(format!(
            "{} vertices need {} row pointers, got {}",
            n,
            n + 1,
            rows.len()
        )));
    }
    if rows[0] != 0 {
        return Err(Error::InvalidInput(format!(
            "the first row pointer is {}, not 0",
            rows[0]
        )));
    }
    if let Some(u) = (0..n).find(|&u| rows[u] > rows[u + 1]) {
        return Err(Error::InvalidInput(format!(
            "row pointers are not non-decreasing at vertex {} ({} > {})",
            u,
            rows[u],
            rows[u + 1]
        )));
    }
    let m = rows[n];
    if adj.len() != m || adj_weights.len() != m {
        return Err(Error::InvalidInput(format!(
            "row pointers declare {} entries, got {} neighbors and {} edge weights",
            m,
            adj.len(),
            adj_weights.len()
        )));
    }

    let mut seen = HashSet::new();
    for u in 0..n {
        if v_weights[u] == 0 {
            return Err(Error::InvalidInput(format!(
                "vertex {} has weight 0, weights must be at least 1",
                u
            )));
        }
        seen.clear();
        for j in rows[u]..rows[u + 1] {
            let v = adj[j];
            if v == u {
                return Err(Error::InvalidInput(format!(
                    "vertex {} has itself as neighbor",
                    u
                )));
            }
            if v >= n {
                return Err(Error::InvalidInput(format!(
                    "vertex {} has neighbor {} out of range [0, {})",
                    u, v, n
                )));
            }
            if adj_weights[j] == 0 {
                return Err(Error::InvalidInput(format!(
                    "edge ({}, {}) has weight 0, weights must be at least 1",
                    u, v
                )));
            }
            if !seen.insert(v) {
                return Err(Error::InvalidInput(format!(
                    "vertex {} has duplicate neighbor {} (parallel edges)",
                    u, v
                )));
            }
        }
    }

    // every undirected edge must appear exactly twice, with the same weight
    let mut edges: HashMap<(usize, usize), (u64, usize)> = HashMap::with_capacity(m);
    for u in 0..n {
        for j in rows[u]..rows[u + 1] {
            let v = adj[j];
            let entry = edges
                .entry((u.min(v), u.max(v)))
                .or_insert((adj_weights[j], 0));
            if entry.0 != adj_weights[j] {
                return Err(Error::InvalidInput(format!(
                    "edge ({}, {}) appears with weights {} and {}",
                    u.min(v),
                    u.max(v),
                    entry.0,
                    adj_weights[j]
                )));
            }
            entry.1 += 1;
        }
    }
    for (&(u, v), &(_, count)) in edges.iter() {
        if count != 2 {
            return Err(Error::InvalidInput(format!(
                "undirected edge ({}, {}) appears {} times, expected 2",
                u, v, count
            )));
        }
    }

    if hierarchy.is_empty() {
        return Err(Error::InvalidInput("the hierarchy is empty".into()));
    }
    if hierarchy.len() != distance.len() {
        return Err(Error::InvalidInput(format!(
            "hierarchy (size {}) and distance (size {}) are not equal",
            hierarchy.len(),
            distance.len()
        )));
    }
    if let Some(i) = hierarchy.iter().position(|&a| a == 0) {
        return Err(Error::InvalidInput(format!(
            "hierarchy position {} is 0, entries must be at least 1",
            i
        )));
    }
    for (i, &d) in distance.iter().enumerate() {
        if d == 0 {
            log::warn!("distance position {} is 0, might not be realistic", i);
        }
    }
    if !(imbalance >= 0.0) {
        return Err(Error::InvalidInput(format!(
            "imbalance {} must be non-negative",
            imbalance
        )));
    }
    if imbalance == 0.0 {
        log::warn!("imbalance is 0.0, the partitioner might not find a feasible solution");
    }
    if n_threads == 0 {
        return Err(Error::InvalidInput("at least one thread is needed".into()));
    }

    Ok(())
}

/// Returns true if and only if the input describes a symmetric, loopless,
/// simple weighted graph and admissible parameters.
///
/// The reason for a rejection is logged; with `verbose` the accepted sizes
/// are logged too.
#[allow(clippy::too_many_arguments)]
pub fn assert_input(
    v_weights: &[u64],
    rows: &[usize],
    adj: &[usize],
    adj_weights: &[u64],
    hierarchy: &[u64],
    distance: &[u64],
    imbalance: f64,
    n_threads: usize,
    verbose: bool,
) -> bool {
    match validate_input(
        v_weights,
        rows,
        adj,
        adj_weights,
        hierarchy,
        distance,
        imbalance,
        n_threads,
    ) {
        Ok(()) => {
            if verbose {
                log::info!(
                    "Input accepted: {} vertices, {} directed entries, {} levels, {} threads",
                    v_weights.len(),
                    adj.len(),
                    hierarchy.len(),
                    n_threads
                );
            }
            true
        }
        Err(e) => {
            log::error!("{}", e);
            false
        }
    }
}
