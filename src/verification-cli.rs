//! A simple CLI tool for verifying a tally election.
//! This uses the server's own verification implementation, and is by definition
//! compatible with the output of `GET /dump`.

use std::fs::File;
use std::io::BufReader;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::serde::json::serde_json;

use tally_backend::model::{
    election::CandidateStats,
    store::ElectionDump,
    verification::{self, VerificationError, VerifiedResults},
};

const PROGRAM_NAME: &str = "verify-tally";

const ABOUT_TEXT: &str = "Verify the integrity of a tally election.

EXIT CODES:
     0: Verification succeeded.
   255: Ran successfully, but verification failed.
     1: The dump could not be read.
     2: The dump is not valid JSON.";

const DUMP_PATH: &str = "DUMP_PATH";

const DUMP_PATH_HELP: &str = "The path to a JSON dump of the election,\n\
as returned by `GET /dump`";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME).about(ABOUT_TEXT).arg(
        Arg::new(DUMP_PATH)
            .help(DUMP_PATH_HELP)
            .action(ArgAction::Set)
            .required(true),
    )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// IO error described by the inner message.
    IO(String),
    /// Failed to decode the JSON dump.
    Format(String),
    /// Verification failed due to the contained reason.
    Verification(VerificationError),
}

/// One line of the report.
fn describe(stats: &CandidateStats) -> String {
    format!(
        "#{} {}: {} vote{} ({}%)",
        stats.index,
        stats.name,
        stats.vote_count,
        if stats.vote_count != 1 { "s" } else { "" },
        stats.percentage
    )
}

/// Run verification.
fn verify(path: &str) -> Result<VerifiedResults, Error> {
    // Load the file.
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let dump: ElectionDump =
        serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))?;

    // Run verification.
    verification::verify(dump).map_err(Error::Verification)
}

/// Run verification, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let path: &String = args.get_one(DUMP_PATH).unwrap(); // Required argument is guaranteed to be present.
    match verify(path) {
        Ok(results) => {
            println!("Verification succeeded.");
            println!(
                "Election is {}, {} vote{} cast.",
                results.phase,
                results.total_votes,
                if results.total_votes != 1 { "s" } else { "" }
            );
            for stats in &results.standings {
                println!("{}", describe(stats));
            }
            match results.winner {
                Some(winner) => println!("Leading: #{} {}", winner.index, winner.name),
                None => println!("No votes cast yet."),
            }
            0
        }
        Err(Error::IO(msg)) => {
            println!("IO error: {}", msg);
            1
        }
        Err(Error::Format(msg)) => {
            println!("Invalid JSON: {}", msg);
            2
        }
        Err(Error::Verification(err)) => {
            println!("Verification failed: {}", err);
            255
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}
