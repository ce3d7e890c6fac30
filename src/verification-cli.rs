//! A simple CLI tool for verifying contest ledger audit logs.
//! This replays the log through the server's own state machine, and is by
//! definition compatible with the output of `GET /audit/dump`.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;

use chrono::Utc;
use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::serde::json::serde_json;

use contest_ledger::model::{
    audit::AuditDump,
    common::{Phase, Timestamp},
    ledger::Ledger,
    tally::Winner,
};

const PROGRAM_NAME: &str = "audit-verify";

const ABOUT_TEXT: &str = "Verify the integrity of a contest ledger audit log.

EXIT CODES:
     0: Verification succeeded.
   255: Ran successfully, but verification failed.
 Other: Error.";

const DUMP_PATH: &str = "DUMP_PATH";

const DUMP_PATH_HELP: &str = "The path to a JSON dump of the audit log,\n\
as returned by `GET /audit/dump`";

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
    /// The log does not replay; the reason is described by the inner message.
    Verification(String),
}

/// A friendly summary of one contest as rebuilt from the log.
#[derive(Debug, Eq, PartialEq)]
struct FriendlyResults {
    pub title: String,
    /// Labels and vote counts, in option order.
    pub counts: Vec<(String, u64)>,
    /// Only present once the contest has closed.
    pub winner: Option<Winner>,
}

impl Display for FriendlyResults {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.title)?;
        match &self.winner {
            Some(Winner::Winner { label, .. }) => writeln!(f, "won by {label}")?,
            Some(Winner::NoWinner) => writeln!(f, "no winner")?,
            None => writeln!(f, "still running")?,
        }
        for (label, votes) in &self.counts {
            writeln!(
                f,
                "  {label}: {votes} vote{}",
                if *votes != 1 { "s" } else { "" }
            )?;
        }
        Ok(())
    }
}

/// Run verification, judging which contests have closed as of `now`.
fn verify(path: &str, now: Timestamp) -> Result<Vec<FriendlyResults>, Error> {
    // Load the file.
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let dump: AuditDump =
        serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))?;

    // Rebuild the ledger, checking every record along the way.
    let ledger = Ledger::from_dump(&dump).map_err(|e| Error::Verification(e.to_string()))?;

    // Assemble the friendly results.
    let results = ledger
        .contests()
        .contests()
        .iter()
        .map(|contest| FriendlyResults {
            title: contest.title.clone(),
            counts: contest
                .options()
                .iter()
                .map(|option| (option.label.clone(), option.vote_count))
                .collect(),
            winner: (contest.phase(now) == Phase::Closed)
                .then(|| ledger.compute_winner(contest.id, now).ok())
                .flatten(),
        })
        .collect();

    Ok(results)
}

/// Run verification, report the result, and return the exit code.
fn run(args: &ArgMatches, now: Timestamp) -> u8 {
    let path: &String = args.get_one(DUMP_PATH).unwrap(); // Required argument is guaranteed to be present.
    match verify(path, now) {
        Ok(friendly_results) => {
            println!("Verification succeeded.");
            for result in friendly_results {
                print!("{result}");
            }
            0
        }
        Err(Error::IO(msg)) => {
            println!("IO error: {msg}");
            1
        }
        Err(Error::Format(msg)) => {
            println!("Invalid JSON: {msg}");
            1
        }
        Err(Error::Verification(msg)) => {
            println!("Verification failed: {msg}");
            255
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args, Utc::now());
    std::process::exit(exit_code.into())
}
