/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Thread-safe collection of per-call timing statistics.

use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;

use crate::config::Algorithm;

/// One record per partitioning call and one per subgraph extraction, plus
/// per-layer aggregates.
///
/// All fields are parallel arrays indexed by call order; the order is
/// whatever interleaving the scheduler produced.
#[derive(Debug, Default, Serialize)]
struct Records {
    n_layers: usize,

    partition_time_per_layer: Vec<f64>,
    partition_time: f64,
    size_per_graph: Vec<usize>,
    start_time_per_graph: Vec<f64>,
    time_per_graph: Vec<f64>,
    alg_per_graph: Vec<Algorithm>,
    n_threads_per_graph: Vec<usize>,
    imbalance_per_graph: Vec<f64>,
    k_per_graph: Vec<u64>,
    depth_per_graph: Vec<usize>,

    extraction_time_per_layer: Vec<f64>,
    extraction_time: f64,
    extraction_size_per_graph: Vec<usize>,
    extraction_start_time_per_graph: Vec<f64>,
    extraction_time_per_graph: Vec<f64>,
    extraction_k_per_graph: Vec<u64>,
    extraction_n_threads_per_graph: Vec<usize>,
    extraction_depth_per_graph: Vec<usize>,
}

/// A sink for the timing statistics of one run.
///
/// A single mutex guards the appends; every record is logged after the timed
/// work has finished, so the lock is never held across a partitioning or
/// extraction call. The collector is purely observational: the scheduler is
/// correct with an unused collector.
#[derive(Debug)]
pub struct StatCollector {
    start: Instant,
    records: Mutex<Records>,
}

impl StatCollector {
    /// Creates a collector for a hierarchy with the given number of layers.
    pub fn new(n_layers: usize) -> Self {
        Self {
            start: Instant::now(),
            records: Mutex::new(Records {
                n_layers,
                partition_time_per_layer: vec![0.0; n_layers],
                extraction_time_per_layer: vec![0.0; n_layers],
                ..Records::default()
            }),
        }
    }

    /// Logs one partitioning call.
    #[allow(clippy::too_many_arguments)]
    pub fn log_partition(
        &self,
        depth: usize,
        graph_size: usize,
        alg: Algorithm,
        n_threads: usize,
        imbalance: f64,
        k: u64,
        start: Instant,
        end: Instant,
    ) {
        let time = end.duration_since(start).as_secs_f64();
        let start_time = start.duration_since(self.start).as_secs_f64();

        let mut records = self.records.lock().unwrap();
        records.partition_time_per_layer[depth] += time;
        records.partition_time += time;
        records.size_per_graph.push(graph_size);
        records.start_time_per_graph.push(start_time);
        records.time_per_graph.push(time);
        records.alg_per_graph.push(alg);
        records.n_threads_per_graph.push(n_threads);
        records.imbalance_per_graph.push(imbalance);
        records.k_per_graph.push(k);
        records.depth_per_graph.push(depth);
    }

    /// Logs one subgraph extraction.
    pub fn log_extraction(
        &self,
        depth: usize,
        graph_size: usize,
        n_threads: usize,
        k: u64,
        start: Instant,
        end: Instant,
    ) {
        let time = end.duration_since(start).as_secs_f64();
        let start_time = start.duration_since(self.start).as_secs_f64();

        let mut records = self.records.lock().unwrap();
        records.extraction_time_per_layer[depth] += time;
        records.extraction_time += time;
        records.extraction_size_per_graph.push(graph_size);
        records.extraction_start_time_per_graph.push(start_time);
        records.extraction_time_per_graph.push(time);
        records.extraction_k_per_graph.push(k);
        records.extraction_n_threads_per_graph.push(n_threads);
        records.extraction_depth_per_graph.push(depth);
    }

    /// Returns all collected records as one JSON object with nested arrays.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&*self.records.lock().unwrap()).unwrap()
    }
}
