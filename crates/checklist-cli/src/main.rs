use anyhow::Context;
use checklist_cli::{commands, init_logging, CliConfig, LogFormat};
use checklist_engine::RawCapture;
use checklist_model::ServiceReport;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

fn cli() -> Command {
    Command::new("checklist")
        .version(checklist_cli::VERSION)
        .about("Dynamic checklist templates: validate, check, compile")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with [service] and [compile] tables"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter directive, overrides RUST_LOG (default: info)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("validate").about("Load and validate template files").arg(
                Arg::new("files")
                    .required(true)
                    .num_args(1..)
                    .value_parser(value_parser!(PathBuf))
                    .help("Template files (.json, .yaml, .yml)"),
            ),
        )
        .subcommand(
            Command::new("check")
                .about("Evaluate one captured component against its template")
                .arg(templates_arg())
                .arg(
                    Arg::new("component")
                        .long("component")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file with the captured form state"),
                )
                .arg(
                    Arg::new("equipment-type")
                        .long("equipment-type")
                        .help("Equipment type, overrides the one in the component file"),
                ),
        )
        .subcommand(
            Command::new("compile")
                .about("Compile service reports to JSON on stdout")
                .arg(templates_arg())
                .arg(
                    Arg::new("report")
                        .long("report")
                        .required(true)
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(PathBuf))
                        .help("Service report JSON file (repeatable)"),
                )
                .arg(
                    Arg::new("header")
                        .long("header")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file with header data passed through verbatim"),
                ),
        )
}

fn templates_arg() -> Arg {
    Arg::new("templates")
        .long("templates")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Directory of template files")
}

fn path_arg<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing --{name}"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

async fn run(matches: ArgMatches) -> anyhow::Result<ExitCode> {
    let config = CliConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("validate", args)) => {
            let files: Vec<PathBuf> = args.get_many::<PathBuf>("files").into_iter().flatten().cloned().collect();
            let checks = commands::validate(&files);
            print_json(&checks)?;
            let failed = checks.iter().filter(|c| !c.is_valid()).count();
            Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Some(("check", args)) => {
            let resolver = commands::load_resolver(path_arg(args, "templates")?, &config.service).await?;
            let raw: RawCapture = commands::read_json(path_arg(args, "component")?)?;
            let equipment_type = args.get_one::<String>("equipment-type").map(String::as_str);
            let outcome = commands::check(&resolver, raw, equipment_type);
            print_json(&outcome)?;
            Ok(if outcome.view.completion.complete { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Some(("compile", args)) => {
            let resolver = commands::load_resolver(path_arg(args, "templates")?, &config.service).await?;
            let reports = args
                .get_many::<PathBuf>("report")
                .into_iter()
                .flatten()
                .map(|path| commands::read_json::<ServiceReport>(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let header = match args.get_one::<PathBuf>("header") {
                Some(path) => commands::read_json::<Value>(path)?,
                None => Value::Null,
            };
            let outcome = commands::compile(&resolver, config.compile, &reports, &header);
            print_json(&outcome)?;
            Ok(if outcome.failures.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        _ => Ok(ExitCode::FAILURE),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();
    let format = if matches.get_flag("log-json") { LogFormat::Json } else { LogFormat::Text };
    init_logging(matches.get_one::<String>("log-level").map(String::as_str), format)?;

    run(matches).await
}
