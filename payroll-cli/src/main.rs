use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use payroll_cli::app::{self, Reply};
use payroll_cli::logging::init_tracing;
use payroll_cli::{Cli, EXIT_INVALID_INPUT};

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();

    let engine = app::build_engine(cli.params_dir.as_deref(), cli.default_period())?;

    if cli.check {
        return print(&app::check(&engine));
    }

    let Some(source) = cli.request_source() else {
        eprintln!("payroll-calc: nothing to calculate; pass --request or --gross with --contract");
        return Ok(ExitCode::from(EXIT_INVALID_INPUT));
    };
    debug!(?source, "reading request");

    let reply = match app::read_request(source, &mut io::stdin().lock())? {
        Ok(request) => app::respond(&engine, request, cli.detailed),
        Err(error) => Reply::from(error),
    };

    print(&reply)
}

fn print(reply: &Reply) -> anyhow::Result<ExitCode> {
    let json = serde_json::to_string_pretty(&reply.body).context("Failed to render reply")?;
    println!("{json}");
    Ok(ExitCode::from(reply.exit_code))
}
