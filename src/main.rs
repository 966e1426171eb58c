mod debug_report;

use boxscore::{MemorySource, Options, QueryDescription, classify_verbose_with, execute_with};
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "BOXSCORE_LOG";

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let (plan, details) = classify_verbose_with(&config.description, &config.options);
    if config.json {
        print_json(&plan);
    } else {
        debug_report::print_classification(&config.description.question, &plan, &details, config.color);
    }

    let Some(source) = config.source else {
        return;
    };
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to start runtime: {err}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(execute_with(&plan, &source, &config.options)) {
        Ok(record) if config.json => print_json(&record),
        Ok(record) => debug_report::print_record(&record, config.color),
        Err(err) => {
            if config.json {
                print_json(&err);
            } else {
                debug_report::print_error(&err, config.color);
            }
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("error: failed to serialize output: {err}");
            std::process::exit(1);
        }
    }
}

struct CliConfig {
    description: QueryDescription,
    options: Options,
    source: Option<MemorySource>,
    json: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut description = QueryDescription::new("nfl", "");
    let mut options = Options::default();
    let mut source = None;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut question: Option<String> = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        // `--flag=value` is accepted for every option that takes a value.
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            inline.clone().or_else(|| args.next()).ok_or_else(|| format!("error: {name} expects a value"))
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("boxscore {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--sport" => description.sport = value("--sport")?,
            "--player" => description.players.push(value("--player")?),
            "--team" => description.teams.push(value("--team")?),
            "--metric" => description.metrics.push(value("--metric")?),
            "--position" => description.positions.push(value("--position")?),
            "--season" => {
                let raw = value("--season")?;
                let season = raw.parse().map_err(|_| format!("error: invalid --season '{raw}' (expected a year)"))?;
                description.seasons.push(season);
            }
            "--strategy" => description.strategy = Some(value("--strategy")?),
            "--target" => description.comparison_target = Some(value("--target")?),
            "--expect" => description.output_expectation = Some(value("--expect")?),
            "--options" => {
                let path = value("--options")?;
                options = serde_json::from_str(&read_file(&path)?)
                    .map_err(|err| format!("error: invalid options file '{path}': {err}"))?;
            }
            "--data" => {
                let path = value("--data")?;
                let loaded = MemorySource::from_json(&read_file(&path)?)
                    .map_err(|err| format!("error: invalid data file '{path}': {err}"))?;
                source = Some(loaded);
            }
            "--" => {
                question = Some(args.by_ref().collect::<Vec<_>>().join(" "));
                break;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                question = Some(std::iter::once(arg).chain(args.by_ref()).collect::<Vec<_>>().join(" "));
                break;
            }
        }
    }

    let question = match question {
        Some(value) => value,
        None => read_stdin_input()?,
    };
    if question.trim().is_empty() {
        return Err(format!("error: no question provided\n\n{}", help_text()));
    }
    description.question = question.trim().to_string();

    Ok(CliConfig { description, options, source, json, color })
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|err| format!("error: failed to read '{path}': {err}"))
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "boxscore {version}

Classify a sports statistics question and optionally run it against fixture data.

Usage:
  boxscore [OPTIONS] [--] <question...>
  echo '<question>' | boxscore [OPTIONS]

Options:
  --sport <name>             Sport of the question. Default: nfl
  --player <name>            Player mentioned in the question (repeatable).
  --team <name>              Team mentioned in the question (repeatable).
  --season <year>            Season in scope (repeatable).
  --metric <name>            Requested metric (repeatable).
  --position <pos>           Position filter (repeatable).
  --strategy <hint>          Upstream strategy hint, e.g. leaderboard_query.
  --target <hint>            Comparison target hint, e.g. player_comparison.
  --expect <hint>            Output expectation hint, e.g. comparison.
  --options <file>           JSON file with execution options.
  --data <file>              JSON fixture data; executes the plan when given.
  --json                     Print the plan (and result) as JSON.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}               Log filter (tracing EnvFilter syntax). Default: warn

Exit codes:
  0  Success.
  1  Execution produced no usable data, or an internal error.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    )
}
