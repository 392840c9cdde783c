/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Reader for graphs in METIS format.
//!
//! The first non-comment line is `n m [fmt]`, where `fmt` is a three-character
//! flag whose second character indicates the presence of vertex weights and
//! whose third character indicates the presence of edge weights. Each of the
//! following `n` lines lists, for one vertex, its optional weight followed by
//! its one-based neighbor ids, each followed by an edge weight if `fmt` says
//! so. Lines starting with `%` are comments.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::graphs::CsrGraph;
use crate::{Error, Result};

fn parse_token(token: &str, path: &Path, line: usize) -> Result<u64> {
    token.parse::<u64>().map_err(|_| {
        Error::InvalidInput(format!(
            "{}:{}: cannot parse '{}' as an integer",
            path.display(),
            line,
            token
        ))
    })
}

/// Reads a graph in METIS format.
pub fn read_metis(path: impl AsRef<Path>) -> Result<CsrGraph> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);

    let mut n = 0;
    let mut declared_edges = 0;
    let mut has_v_weights = false;
    let mut has_e_weights = false;
    let mut header_seen = false;

    let mut weights = Vec::new();
    let mut rows = vec![0];
    let mut adj = Vec::new();
    let mut adj_weights = Vec::new();
    let mut u = 0;

    for (line_no, line) in file.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.starts_with('%') {
            continue;
        }
        let mut tokens = line.split_whitespace();

        if !header_seen {
            header_seen = true;
            let header = line.split_whitespace().collect::<Vec<_>>();
            if header.len() < 2 {
                return Err(Error::InvalidInput(format!(
                    "{}: header must be 'n m [fmt]'",
                    path.display()
                )));
            }
            n = parse_token(header[0], path, line_no + 1)? as usize;
            declared_edges = parse_token(header[1], path, line_no + 1)? as usize;
            if header.len() == 3 && header[2].len() == 3 {
                let fmt = header[2].as_bytes();
                has_v_weights = fmt[1] == b'1';
                has_e_weights = fmt[2] == b'1';
            }
            weights.reserve(n);
            rows.reserve(n + 1);
            adj.reserve(2 * declared_edges);
            adj_weights.reserve(2 * declared_edges);
            continue;
        }

        if u == n {
            // trailing blank lines are fine, anything else is not
            if line.is_empty() {
                continue;
            }
            return Err(Error::InvalidInput(format!(
                "{}: more than {} vertex lines",
                path.display(),
                n
            )));
        }

        let weight = if has_v_weights {
            match tokens.next() {
                Some(token) => parse_token(token, path, line_no + 1)?,
                None => {
                    return Err(Error::InvalidInput(format!(
                        "{}:{}: missing vertex weight",
                        path.display(),
                        line_no + 1
                    )))
                }
            }
        } else {
            1
        };
        weights.push(weight);

        while let Some(token) = tokens.next() {
            let v = parse_token(token, path, line_no + 1)?;
            if v == 0 || v as usize > n {
                return Err(Error::InvalidInput(format!(
                    "{}:{}: neighbor {} out of range [1, {}]",
                    path.display(),
                    line_no + 1,
                    v,
                    n
                )));
            }
            let w = if has_e_weights {
                match tokens.next() {
                    Some(token) => parse_token(token, path, line_no + 1)?,
                    None => {
                        return Err(Error::InvalidInput(format!(
                            "{}:{}: missing edge weight",
                            path.display(),
                            line_no + 1
                        )))
                    }
                }
            } else {
                1
            };
            adj.push(v as usize - 1);
            adj_weights.push(w);
        }
        rows.push(adj.len());
        u += 1;
    }

    if !header_seen {
        return Err(Error::InvalidInput(format!(
            "{}: no header line found",
            path.display()
        )));
    }
    if u != n {
        return Err(Error::InvalidInput(format!(
            "{}: expected {} vertex lines, found {}",
            path.display(),
            n,
            u
        )));
    }
    if adj.len() != 2 * declared_edges {
        return Err(Error::InvalidInput(format!(
            "{}: header declares {} edges but {} directed entries were found",
            path.display(),
            declared_edges,
            adj.len()
        )));
    }

    log::info!(
        "Read graph with {} vertices and {} edges from {}",
        n,
        declared_edges,
        path.display()
    );

    Ok(CsrGraph::from_parts(weights, rows, adj, adj_weights))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_graph(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_unweighted() {
        let file = write_graph("% a triangle plus a pendant vertex\n4 4\n2 3\n1 3 4\n1 2\n2\n");
        let g = read_metis(file.path()).unwrap();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_entries(), 8);
        assert_eq!(g.total_weight(), 4);
        assert_eq!(g.neighbors(0).collect::<Vec<_>>(), vec![(1, 1), (2, 1)]);
        assert_eq!(g.neighbors(3).collect::<Vec<_>>(), vec![(1, 1)]);
    }

    #[test]
    fn test_weighted() {
        let file = write_graph("3 2 011\n5 2 7\n3 1 7 3 2\n1 2 2\n");
        let g = read_metis(file.path()).unwrap();
        assert_eq!(g.vertex_weight(0), 5);
        assert_eq!(g.vertex_weight(2), 1);
        assert_eq!(g.total_weight(), 9);
        assert_eq!(g.neighbors(1).collect::<Vec<_>>(), vec![(0, 7), (2, 2)]);
    }

    #[test]
    fn test_edge_count_mismatch() {
        let file = write_graph("2 2\n2\n1\n");
        assert!(matches!(
            read_metis(file.path()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_metis("/definitely/not/there.graph"),
            Err(Error::Io(_))
        ));
    }
}
