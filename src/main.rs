/*
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use clap::Parser;

pub fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = sharedmap::cli::Args::parse();
    if let Err(e) = sharedmap::cli::main(args) {
        eprintln!("---SharedMap--- {:#}", e);
        std::process::exit(1);
    }
}
