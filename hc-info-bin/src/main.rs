//! Command-line interface for hcinfo
//!
//! ```text
//! usage: hc-info [DEVICE-PATH]
//! ```
//!
//! Every argument is handed to the reporter unchanged, so `-h`, `--help`,
//! `--` and paths that start with a dash are classified there.

use anyhow::Context;
use clap::Parser;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process;

#[derive(Parser)]
#[command(name = "hc-info")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Device path, `default`, or `-h`/`--help`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Cli {
    /// Parse with an end-of-options marker in front of the user arguments,
    /// so a user-supplied `--` stays a plain value
    fn try_parse_verbatim<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut args = args.into_iter();
        let program = args.next().unwrap_or_else(|| OsString::from("hc-info"));
        let argv = std::iter::once(program)
            .chain(std::iter::once(OsString::from("--")))
            .chain(args);
        Self::try_parse_from(argv)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let config = match hcinfo::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(hcinfo::EXIT_FAILURE);
        }
    };

    let args = match Cli::try_parse_verbatim(std::env::args_os()) {
        Ok(cli) => cli.args,
        Err(e) => {
            log::debug!("argument parsing failed: {}", e);
            hcinfo::report::write_usage(&mut io::stderr(), config.backend)?;
            process::exit(hcinfo::EXIT_FAILURE);
        }
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    let code = match hcinfo::run(&args, &config, &mut out, &mut err) {
        Ok(code) => code,
        Err(e) => {
            writeln!(err, "error: {}", e)?;
            hcinfo::EXIT_FAILURE
        }
    };
    out.flush().context("failed to flush stdout")?;

    process::exit(code);
}
