/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::io::Write;

use anyhow::Result;
use sharedmap::config::{AlgorithmConfig, ConfigPreset, Strategy};
use sharedmap::solver::Solver;
use sharedmap::Error;

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_round_trip() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    // an 8-cycle
    let graph_path = write_file(
        &dir,
        "cycle.graph",
        "% an 8-cycle\n8 8\n2 8\n1 3\n2 4\n3 5\n4 6\n5 7\n6 8\n7 1\n",
    );
    let mapping_path = dir.path().join("mapping.txt");

    let config = AlgorithmConfig::with_preset(
        vec![2, 2],
        vec![1, 10],
        0.05,
        ConfigPreset::Fast,
        2,
        Strategy::Layer,
        0,
    )?;
    let mut solver = Solver::new(&config);
    let comm_cost = solver.solve_file(&graph_path, &mapping_path, false)?;

    // one block index per line, in vertex order
    let mapping = std::fs::read_to_string(&mapping_path)?
        .lines()
        .map(|line| line.parse::<u64>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    assert_eq!(mapping.len(), 8);
    assert!(mapping.iter().all(|&b| b < 4));
    // a cycle split into four blocks cuts at least four unit edges
    assert!(comm_cost >= 4);

    let report = solver.report();
    assert!(report["io_time"].as_f64().unwrap() >= 0.0);
    assert!(report["solve_time"].as_f64().unwrap() > 0.0);
    assert_eq!(report["algorithm-configuration"]["k"], 4);
    assert_eq!(report["statistics"]["n_layers"], 2);
    assert!(report["statistics"]["size_per_graph"].as_array().unwrap().len() >= 3);
    Ok(())
}

#[test]
fn test_no_mapping_written_on_invalid_input() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    // edge 1-2 is listed for vertex 1 only, so the graph is not symmetric
    let graph_path = write_file(&dir, "broken.graph", "2 1\n2\n\n");
    let mapping_path = dir.path().join("mapping.txt");

    let config = AlgorithmConfig::with_preset(
        vec![2],
        vec![1],
        0.05,
        ConfigPreset::Fast,
        1,
        Strategy::Naive,
        0,
    )?;
    let mut solver = Solver::new(&config);
    let result = solver.solve_file(&graph_path, &mapping_path, false);

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(!mapping_path.exists());
    Ok(())
}
