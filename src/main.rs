mod report;

use rulelink::{FieldMapping, Palette, color_applied_rules, generate_applied_rules, predictions_from_json, sort_by_match_count};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_logging(config.verbosity);

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(config: &CliConfig) -> rulelink::Result<()> {
    let input = match &config.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let swatches: Palette = match &config.palette {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Palette::default(),
    };

    let predictions = predictions_from_json(&input)?;
    tracing::debug!(predictions = predictions.len(), mappings = config.mappings.len(), "input loaded");

    let mut applied = generate_applied_rules(&config.mappings, &predictions);
    sort_by_match_count(&mut applied);
    let colored = color_applied_rules(&applied);

    if config.json {
        println!("{}", rulelink::to_json_pretty(&colored)?);
    } else {
        report::print_rules(&colored, &swatches, config.color);
    }
    Ok(())
}

struct CliConfig {
    input: Option<PathBuf>,
    mappings: Vec<FieldMapping>,
    palette: Option<PathBuf>,
    json: bool,
    color: bool,
    verbosity: u8,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<PathBuf> = None;
    let mut mappings: Vec<FieldMapping> = Vec::new();
    let mut palette: Option<PathBuf> = None;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut verbosity: u8 = 0;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("rulelink {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "-v" | "--verbose" => verbosity = verbosity.saturating_add(1),
            "-vv" => verbosity = verbosity.saturating_add(2),
            "--map" | "-m" => {
                let value = args.next().ok_or_else(|| "error: --map expects a value".to_string())?;
                mappings.push(parse_mapping(&value)?);
            }
            "--palette" => {
                let value = args.next().ok_or_else(|| "error: --palette expects a file".to_string())?;
                palette = Some(PathBuf::from(value));
            }
            _ if arg.starts_with("--palette=") => {
                palette = Some(PathBuf::from(arg.trim_start_matches("--palette=")));
            }
            _ if arg.starts_with("--map=") => {
                mappings.push(parse_mapping(arg.trim_start_matches("--map="))?);
            }
            "-" => {}
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(PathBuf::from(arg));
            }
        }
    }

    if mappings.is_empty() {
        mappings.push(FieldMapping::new("name", "name"));
    }

    Ok(CliConfig { input, mappings, palette, json, color, verbosity })
}

/// `source[:target]`; a missing target reuses the source field name.
fn parse_mapping(value: &str) -> Result<FieldMapping, String> {
    let (source, target) = value.split_once(':').unwrap_or((value, value));
    if source.is_empty() || target.is_empty() {
        return Err(format!("error: invalid --map '{value}' (expected <source>[:<target>])"));
    }
    Ok(FieldMapping::new(source, target))
}

/// `RUST_LOG` wins; otherwise warn, debug (`-v`) or trace (`-vv`).
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let level = level.as_str().to_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,rulelink={level}")));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).without_time().with_target(false).init();
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "rulelink {version}

Explains entity matches by inducing and highlighting structural rules.

Usage:
  rulelink [OPTIONS] [FILE]

Reads a JSON array of predictions ({{score, source, target}}) from FILE,
or from stdin when FILE is omitted or '-'.

Options:
  -m, --map <source[:target]>  Field pair to explain. Repeatable.
                               Default: name:name
  --palette <FILE>             JSON array of {{background, foreground}}
                               swatches for the report.
  --json                       Print colored rules as JSON.
  --color                      Force ANSI color output.
  --no-color                   Disable ANSI color output.
  -v, --verbose                Log degradations (-vv: per-group trace).
                               RUST_LOG overrides this.
  -h, --help                   Show this help message.
  -V, --version                Print version information.

Exit codes:
  0  Success.
  1  Input or palette could not be read or parsed.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}
