mod report;
mod settings;

use crate::settings::{API_KEY_VAR, API_URL_VAR, Settings, TIMEOUT_VAR};
use anyhow::bail;
use ballchasing_api::ReplayOutput;
use ballchasing_api::client::BallchasingApi;
use ballchasing_api::coach::{Coach, Rank};
use log::{debug, info};
use std::io::{self, Write};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Version,
    Usage(String),
    Replay {
        replay_id: Option<String>,
        json: bool,
        coach: Option<Coach>,
    },
}

/// Replay-level failures still exit 0; only bad invocations do not.
fn main() -> anyhow::Result<()> {
    better_panic::install();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (replay_id, json, coach) = match parse_args(std::env::args().skip(1)) {
        Command::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        Command::Version => {
            println!("rlreplay {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Usage(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
        Command::Replay { replay_id, json, coach } => (replay_id, json, coach),
    };

    let settings = Settings::load()?;
    let Some(replay_id) = replay_id else {
        bail!("Usage: rlreplay <replay_id> [--json] [--rank <rank> [--target <rank>]]");
    };

    let api = BallchasingApi::new(settings.api);
    info!("requesting replay {replay_id}");

    run(&api, &replay_id, json, coach.as_ref(), &mut io::stdout().lock(), &mut io::stderr().lock())?;
    Ok(())
}

/// Fetch one replay and write it in the requested mode.
///
/// Replay errors are part of the output: the JSON error payload on `out`
/// in structured mode, a diagnostic on `err` in text mode.
fn run(
    api: &BallchasingApi,
    replay_id: &str,
    json: bool,
    coach: Option<&Coach>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    let result = api.fetch_summary(replay_id);

    if json {
        let body = match (result, coach) {
            (Ok(summary), Some(coach)) => serde_json::to_string_pretty(&coach.annotate(summary)),
            (result, _) => serde_json::to_string_pretty(&ReplayOutput::from(result)),
        }?;
        return writeln!(out, "{body}");
    }

    match result {
        Ok(summary) => {
            write!(out, "{}", report::render(&summary))?;
            if let Some(coach) = coach {
                write!(out, "{}", report::render_coaching(&coach.analyze_summary(&summary)))?;
            }
        }
        Err(e) => {
            debug!("replay {replay_id} failed: {e:?}");
            writeln!(err, "{e}")?;
        }
    }
    Ok(())
}

/// Parse argv without the program name.
fn parse_args(mut args: impl Iterator<Item = String>) -> Command {
    let mut replay_id = None;
    let mut json = false;
    let mut rank = None;
    let mut target = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Command::Help,
            "-V" | "--version" => return Command::Version,
            "--json" => json = true,
            "--rank" | "--target" => {
                let Some(value) = args.next() else {
                    return Command::Usage(format!("Missing value for {arg}"));
                };
                let parsed = match value.parse::<Rank>() {
                    Ok(r) => r,
                    Err(e) => return Command::Usage(e.to_string()),
                };
                if arg == "--rank" {
                    rank = Some(parsed);
                } else {
                    target = Some(parsed);
                }
            }
            _ if arg.starts_with('-') => return Command::Usage(format!("Unknown argument: {arg}")),
            _ if replay_id.is_none() => replay_id = Some(arg),
            _ => return Command::Usage(format!("Unknown argument: {arg}")),
        }
    }

    let coach = match (rank, target) {
        (Some(rank), target) => Some(Coach::new(rank, target)),
        (None, Some(_)) => return Command::Usage("--target requires --rank".into()),
        (None, None) => None,
    };

    Command::Replay { replay_id, json, coach }
}

fn usage_text() -> String {
    format!(
        "rlreplay - Rocket League replay stats from ballchasing.com

Usage:
  rlreplay <replay_id> [--json] [--rank <rank> [--target <rank>]]
  rlreplay --help
  rlreplay --version

Options:
  --json            Print the match summary as JSON instead of a text report
  --rank <rank>     Coach every player against the next rank up from <rank>
  --target <rank>   Coach against <rank> instead of the next one

Ranks: Bronze, Silver, Gold, Platinum, Diamond, Champion, Grand Champion (gc),
       Supersonic Legend (ssl)

Environment:
  {API_KEY_VAR}        ballchasing.com API key (required)
  {API_URL_VAR}        API base URL (default {})
  {TIMEOUT_VAR}   Request timeout in seconds (default 10)
  RUST_LOG                   Log filter (default warn)",
        ballchasing_api::client::BALLCHASING_API
    )
}
