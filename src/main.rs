//! CLI binary for `claude_hooks`.
//!
//! This binary is a thin wrapper that reads stdin and delegates to the library.

use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use claude_hooks::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Only read stdin for commands that need it (avoids blocking on terminal)
    let stdin = if cli.command.needs_stdin() { read_stdin() } else { String::new() };

    let output = claude_hooks::cli::run(cli, &stdin);

    for line in output.stdout {
        println!("{line}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}

fn read_stdin() -> String {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Error reading stdin: {e}");
    }
    input
}
