// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use ntm_cli::config::{init_tracing, Cli};
use ntm_cli::error::exit_code_for;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(err) = cli.validate() {
        error!("fatal: {err:#}");
        std::process::exit(exit_code_for(&err).code());
    }

    match ntm_cli::run::run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("fatal: {err:#}");
            std::process::exit(exit_code_for(&err).code());
        }
    }
}
