mod summary;

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use floorplan::doc::Document;
use sharecode::config::{DEFAULT_MAX_INFLATED_LEN, DEFAULT_MAX_SHARE_LEN};
use sharecode::{ShareLimits, compact, expanded, share};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {source_name}: {source}")]
    Read { source_name: String, source: io::Error },
    #[error("decode failed: {0}")]
    Decode(#[from] sharecode::DecodeError),
    #[error("encode failed: {0}")]
    Encode(#[from] sharecode::EncodeError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "deckplan", about = "Convert and inspect floorplan maps")]
struct Cli {
    /// Longest share string accepted when decoding.
    #[arg(long, env = "DECKPLAN_MAX_SHARE_LEN", default_value_t = DEFAULT_MAX_SHARE_LEN)]
    max_share_len: usize,

    /// Largest inflated payload accepted when decoding.
    #[arg(long, env = "DECKPLAN_MAX_INFLATED_LEN", default_value_t = DEFAULT_MAX_INFLATED_LEN)]
    max_inflated_len: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the share string for an expanded JSON map.
    Share {
        #[arg(help = "Expanded JSON file, or - for stdin")]
        input: String,
    },
    /// Print the expanded JSON of a share string.
    Unshare {
        #[arg(help = "Share string, or - for stdin")]
        input: String,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print the compact JSON for an expanded JSON map.
    Compact {
        #[arg(help = "Expanded JSON file, or - for stdin")]
        input: String,
    },
    /// Summarise a map: counts, floors, next id, stale attachments.
    Inspect {
        #[arg(help = "Expanded JSON file, or - for stdin")]
        input: String,
        #[arg(long, default_value_t = false, help = "Treat the input as a share string")]
        share: bool,
    },
}

#[derive(Args, Debug)]
struct ViewArgs {
    #[arg(long, default_value_t = false, help = "Drop everything hidden from players")]
    player_view: bool,

    #[arg(long, help = "Keep only this floor")]
    floor: Option<i64>,
}

impl ViewArgs {
    fn apply(&self, doc: Document) -> Document {
        let doc = if self.player_view { doc.player_view() } else { doc };
        match self.floor {
            Some(floor) => doc.on_floor(floor),
            None => doc,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let limits = ShareLimits { max_share_len: cli.max_share_len, max_inflated_len: cli.max_inflated_len };

    match run(cli.command, &limits) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, limits: &ShareLimits) -> Result<String, CliError> {
    match command {
        Command::Share { input } => {
            let doc = expanded::from_expanded_json(&read_input(&input)?)?;
            tracing::info!(map = %doc.map_name, rooms = doc.rooms.len(), "encoding share string");
            Ok(share::encode(&doc)?)
        }
        Command::Unshare { input, view } => {
            let doc = share::decode(&read_arg_or_stdin(&input)?, limits)?;
            Ok(expanded::to_expanded_json(&view.apply(doc))?)
        }
        Command::Compact { input } => {
            let doc = expanded::from_expanded_json(&read_input(&input)?)?;
            Ok(compact::to_json(&doc)?)
        }
        Command::Inspect { input, share: is_share } => {
            let doc = if is_share {
                share::decode(&read_arg_or_stdin(&input)?, limits)?
            } else {
                expanded::from_expanded_json(&read_input(&input)?)?
            };
            let summary = summary::Summary::of(&doc);
            if !summary.stale_attachments.is_empty() {
                tracing::warn!(count = summary.stale_attachments.len(), "map has stale attachments");
            }
            Ok(serde_json::to_string_pretty(&summary)?)
        }
    }
}

/// File contents, or stdin for `-`.
fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        return read_stdin();
    }
    fs::read_to_string(path).map_err(|source| CliError::Read { source_name: path.to_owned(), source })
}

/// The argument itself, or stdin for `-`.
fn read_arg_or_stdin(arg: &str) -> Result<String, CliError> {
    if arg == "-" { read_stdin() } else { Ok(arg.to_owned()) }
}

fn read_stdin() -> Result<String, CliError> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|source| CliError::Read { source_name: "stdin".to_owned(), source })?;
    Ok(buf)
}
