/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Configuration of a hierarchical multisection run.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::Serialize;

use crate::{Error, Result};

/// The strategies distributing the thread budget across concurrent tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Single-threaded outer driver; every task receives the full budget.
    Naive,
    /// One barrier per hierarchy level.
    Layer,
    /// Priority queue of ready tasks, largest subgraph first.
    Queue,
    /// Layered without barriers; finished workers hand their threads over.
    NbLayer,
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "naive" => Ok(Strategy::Naive),
            "layer" => Ok(Strategy::Layer),
            "queue" => Ok(Strategy::Queue),
            "nb_layer" => Ok(Strategy::NbLayer),
            _ => Err(Error::UnknownStrategy(s.into())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Naive => "naive",
            Strategy::Layer => "layer",
            Strategy::Queue => "queue",
            Strategy::NbLayer => "nb_layer",
        })
    }
}

/// The partitioning algorithms selectable per level.
///
/// The `kaffpa_*` family is serial, the `mtkahypar_*` family is
/// shared-memory parallel; within each family the variants trade time for
/// cut quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    KaffpaFast,
    KaffpaEco,
    KaffpaStrong,
    MtkahyparDefault,
    MtkahyparQuality,
    MtkahyparHighestQuality,
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kaffpa_fast" => Ok(Algorithm::KaffpaFast),
            "kaffpa_eco" => Ok(Algorithm::KaffpaEco),
            "kaffpa_strong" => Ok(Algorithm::KaffpaStrong),
            "mtkahypar_default" => Ok(Algorithm::MtkahyparDefault),
            "mtkahypar_quality" => Ok(Algorithm::MtkahyparQuality),
            "mtkahypar_highest_quality" => Ok(Algorithm::MtkahyparHighestQuality),
            _ => Err(Error::UnknownAlgorithm(s.into())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::KaffpaFast => "kaffpa_fast",
            Algorithm::KaffpaEco => "kaffpa_eco",
            Algorithm::KaffpaStrong => "kaffpa_strong",
            Algorithm::MtkahyparDefault => "mtkahypar_default",
            Algorithm::MtkahyparQuality => "mtkahypar_quality",
            Algorithm::MtkahyparHighestQuality => "mtkahypar_highest_quality",
        })
    }
}

/// A preset selecting matched serial/parallel algorithm families for every
/// level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPreset {
    Fast,
    Eco,
    Strong,
}

impl ConfigPreset {
    /// The serial algorithm this preset assigns to every level.
    pub fn serial_algorithm(&self) -> Algorithm {
        match self {
            ConfigPreset::Fast => Algorithm::KaffpaFast,
            ConfigPreset::Eco => Algorithm::KaffpaEco,
            ConfigPreset::Strong => Algorithm::KaffpaStrong,
        }
    }

    /// The parallel algorithm this preset assigns to every level.
    pub fn parallel_algorithm(&self) -> Algorithm {
        match self {
            ConfigPreset::Fast => Algorithm::MtkahyparDefault,
            ConfigPreset::Eco => Algorithm::MtkahyparQuality,
            ConfigPreset::Strong => Algorithm::MtkahyparHighestQuality,
        }
    }
}

impl FromStr for ConfigPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fast" => Ok(ConfigPreset::Fast),
            "eco" => Ok(ConfigPreset::Eco),
            "strong" => Ok(ConfigPreset::Strong),
            _ => Err(Error::InvalidInput(format!("config {} not recognized", s))),
        }
    }
}

impl fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigPreset::Fast => "fast",
            ConfigPreset::Eco => "eco",
            ConfigPreset::Strong => "strong",
        })
    }
}

/// Parses a colon-separated vector of integers, as used for the hierarchy
/// and distance command-line options.
pub fn parse_int_vec(s: &str) -> Result<Vec<u64>> {
    s.split(':')
        .map(|token| {
            token
                .parse::<u64>()
                .map_err(|_| Error::InvalidInput(format!("cannot parse '{}' as an integer", token)))
        })
        .collect()
}

/// The full configuration of a run.
///
/// Besides the user-facing parameters, the constructor precomputes the two
/// vectors used to fold leaf partitions into the global mapping:
/// `index_vec[i]` is the product of the hierarchy entries below level `i`
/// (the span of one block choice at that level), and `k_rem_vec[i]` is the
/// number of leaf blocks that a subgraph at level `i` will eventually be
/// split into.
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmConfig {
    pub hierarchy: Vec<u64>,
    pub distance: Vec<u64>,
    /// The total number of blocks, i.e., the product of the hierarchy.
    pub k: u64,
    #[serde(skip)]
    pub index_vec: Vec<u64>,
    #[serde(skip)]
    pub k_rem_vec: Vec<u64>,
    pub imbalance: f64,
    pub serial_algs: Vec<Algorithm>,
    pub parallel_algs: Vec<Algorithm>,
    pub n_threads: usize,
    pub strategy: Strategy,
    pub seed: u64,
}

impl AlgorithmConfig {
    /// Creates a configuration with per-level algorithm choices.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hierarchy: Vec<u64>,
        distance: Vec<u64>,
        imbalance: f64,
        parallel_algs: Vec<Algorithm>,
        serial_algs: Vec<Algorithm>,
        n_threads: usize,
        strategy: Strategy,
        seed: u64,
    ) -> Result<Self> {
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
        if hierarchy.len() != serial_algs.len() || hierarchy.len() != parallel_algs.len() {
            return Err(Error::InvalidInput(format!(
                "hierarchy (size {}) needs one serial and one parallel algorithm per level \
                 (got {} and {})",
                hierarchy.len(),
                serial_algs.len(),
                parallel_algs.len()
            )));
        }
        if hierarchy.contains(&0) {
            return Err(Error::InvalidInput("hierarchy entries must be at least 1".into()));
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

        let k = hierarchy.iter().product();

        let mut index_vec = vec![1];
        for i in 0..hierarchy.len() - 1 {
            index_vec.push(index_vec[i] * hierarchy[i]);
        }

        let mut k_rem_vec = Vec::with_capacity(hierarchy.len());
        let mut p = 1;
        for &a in &hierarchy {
            p *= a;
            k_rem_vec.push(p);
        }

        Ok(Self {
            hierarchy,
            distance,
            k,
            index_vec,
            k_rem_vec,
            imbalance,
            serial_algs,
            parallel_algs,
            n_threads,
            strategy,
            seed,
        })
    }

    /// Creates a configuration from a [`ConfigPreset`], replicating the
    /// preset's serial and parallel algorithms on every level.
    pub fn with_preset(
        hierarchy: Vec<u64>,
        distance: Vec<u64>,
        imbalance: f64,
        preset: ConfigPreset,
        n_threads: usize,
        strategy: Strategy,
        seed: u64,
    ) -> Result<Self> {
        let levels = hierarchy.len();
        Self::new(
            hierarchy,
            distance,
            imbalance,
            vec![preset.parallel_algorithm(); levels],
            vec![preset.serial_algorithm(); levels],
            n_threads,
            strategy,
            seed,
        )
    }

    /// Returns the number of hierarchy levels.
    #[inline(always)]
    pub fn num_levels(&self) -> usize {
        self.hierarchy.len()
    }

    /// Returns the level of an item whose identifier has the given length.
    ///
    /// Level `l - 1` is the top of the hierarchy, level 0 is the bottom.
    #[inline(always)]
    pub(crate) fn depth_of(&self, identifier_len: usize) -> usize {
        self.hierarchy.len() - 1 - identifier_len
    }

    /// Flattens an identifier path into the first global block index of the
    /// corresponding subtree.
    pub(crate) fn offset_of(&self, identifier: &[u64]) -> u64 {
        identifier
            .iter()
            .enumerate()
            .map(|(i, &choice)| choice * self.index_vec[self.index_vec.len() - 1 - i])
            .sum()
    }

    /// Returns the hierarchy as a colon-separated string.
    pub fn hierarchy_string(&self) -> String {
        self.hierarchy.iter().join(":")
    }

    /// Returns the distance as a colon-separated string.
    pub fn distance_string(&self) -> String {
        self.distance.iter().join(":")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(hierarchy: Vec<u64>, distance: Vec<u64>) -> AlgorithmConfig {
        AlgorithmConfig::with_preset(
            hierarchy,
            distance,
            0.03,
            ConfigPreset::Fast,
            4,
            Strategy::Naive,
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_precomputed_vectors() {
        let c = config(vec![4, 8, 6], vec![1, 10, 100]);
        assert_eq!(c.k, 192);
        assert_eq!(c.index_vec, vec![1, 4, 32]);
        assert_eq!(c.k_rem_vec, vec![4, 32, 192]);
        assert_eq!(c.hierarchy_string(), "4:8:6");
    }

    #[test]
    fn test_offsets() {
        let c = config(vec![4, 8, 6], vec![1, 10, 100]);
        // the root subtree starts at block 0
        assert_eq!(c.offset_of(&[]), 0);
        // one step down the top level spans k / 6 = 32 blocks
        assert_eq!(c.offset_of(&[2]), 64);
        assert_eq!(c.offset_of(&[2, 3]), 64 + 12);
        assert_eq!(c.offset_of(&[2, 3, 1]), 64 + 12 + 1);
    }

    #[test]
    fn test_depths() {
        let c = config(vec![2, 2], vec![1, 10]);
        assert_eq!(c.depth_of(0), 1);
        assert_eq!(c.depth_of(1), 0);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("nb_layer".parse::<Strategy>().unwrap(), Strategy::NbLayer);
        assert_eq!(
            "mtkahypar_quality".parse::<Algorithm>().unwrap(),
            Algorithm::MtkahyparQuality
        );
        assert!(matches!(
            "fastest".parse::<Algorithm>(),
            Err(crate::Error::UnknownAlgorithm(_))
        ));
        assert!(matches!(
            "stack".parse::<Strategy>(),
            Err(crate::Error::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        assert!(AlgorithmConfig::with_preset(
            vec![2, 2],
            vec![1],
            0.03,
            ConfigPreset::Fast,
            1,
            Strategy::Naive,
            0,
        )
        .is_err());
    }

    #[test]
    fn test_parse_int_vec() {
        assert_eq!(parse_int_vec("4:8:6").unwrap(), vec![4, 8, 6]);
        assert!(parse_int_vec("4:x").is_err());
    }
}
