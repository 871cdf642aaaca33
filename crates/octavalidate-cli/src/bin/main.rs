//! octavalidate CLI
//!
//! Command-line interface for the octavalidate payload validation engine.
//!
//! # Usage
//!
//! ```bash
//! octavalidate validate --schema signup.json --payload request.json
//! octavalidate check --schema signup.yaml
//! ```

use clap::Parser;
use octavalidate_cli::{init_tracing, run_cli, Cli};

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format);

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
