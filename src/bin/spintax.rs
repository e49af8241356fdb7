//! Command-line interface for spintax
//! Reads a spintax template and writes every permutation, one per line.
//!
//! Usage:
//!   spintax [-i `<input-file>`] [-o `<output-file>`] [--structure | --count]

use clap::{Arg, ArgAction, ArgMatches, Command};
use env_logger::Env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use spintax::processor::{SpintaxReader, open_sink, open_source, parse_error, read_source};
use spintax::{LogErrorHandler, Parser};

fn command() -> Command {
    Command::new("spintax")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates every permutation of a spintax template")
        .disable_help_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("print this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("input-file")
                .long("input-file")
                .short('i')
                .help("input file name (stdin is used by default)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output-file")
                .long("output-file")
                .short('o')
                .help("output file name (stdout is used by default)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("structure")
                .long("structure")
                .short('s')
                .help("print the parsed structure instead of permutations")
                .action(ArgAction::SetTrue)
                .conflicts_with("count"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .short('c')
                .help("print only the number of permutations")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let mut cmd = command();
    let matches = cmd.clone().get_matches();

    if matches.get_flag("help") {
        return ExitCode::from(print_help(&mut cmd, &mut io::stdout().lock()));
    }

    ExitCode::from(run(&matches))
}

/// Write usage to `out`; asking for help always exits with status 1
fn print_help<W: Write>(cmd: &mut Command, out: &mut W) -> u8 {
    if let Err(e) = cmd.write_help(out).and_then(|()| writeln!(out)) {
        eprintln!("Error writing help: {}", e);
    }
    1
}

/// Execute the parsed command line and return the process exit status
fn run(matches: &ArgMatches) -> u8 {
    let input = matches.get_one::<PathBuf>("input-file").map(PathBuf::as_path);
    let output = matches.get_one::<PathBuf>("output-file").map(PathBuf::as_path);

    let result = if matches.get_flag("structure") || matches.get_flag("count") {
        write_report(input, output, matches.get_flag("structure"))
    } else {
        write_permutations(input, output)
    };

    match result {
        Ok(()) => 0,
        // Already reported through the handler
        Err(e) if parse_error(&e).is_some() => 2,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Stream every permutation of the input to the output
fn write_permutations(input: Option<&Path>, output: Option<&Path>) -> io::Result<()> {
    let parser = Parser::with_handler(LogErrorHandler);
    let mut reader = SpintaxReader::new(open_source(input)?, parser);
    let mut out = open_sink(output)?;
    io::copy(&mut reader, &mut out)?;
    out.flush()
}

/// Write the parsed structure, or the number of permutations
fn write_report(
    input: Option<&Path>,
    output: Option<&Path>,
    structure_dump: bool,
) -> io::Result<()> {
    let source = read_source(input)?;
    let mut parser = Parser::with_handler(LogErrorHandler);
    let structure = parser
        .parse(&source)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut out = open_sink(output)?;
    if structure_dump {
        structure.write_structure(&mut out)?;
    } else {
        match structure.permutation_count() {
            Some(count) => writeln!(out, "{}", count)?,
            None => writeln!(out, "overflow")?,
        }
    }
    out.flush()
}
