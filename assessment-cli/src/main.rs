use anyhow::{Context, Result};
use assessment_lib::*;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("assessment")
        .version("0.1.0")
        .about("Decode assessment share links and hand off selected templates")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("JSON config with paths, storage key and feature flags")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug diagnostics to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("decode")
                .about("Resolve the results page for a profile payload")
                .arg(
                    Arg::new("payload")
                        .value_name("PAYLOAD")
                        .help("URL-encoded JSON profile")
                        .conflicts_with("query"),
                )
                .arg(
                    Arg::new("query")
                        .short('q')
                        .long("query")
                        .value_name("QUERY")
                        .help("Query string or link carrying a profile parameter"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("Exit with status 2 when a fallback view is produced")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("encode")
                .about("Encode a JSON profile for a share link")
                .arg(input_arg().help("JSON profile file (stdin if not specified)"))
                .arg(
                    Arg::new("link")
                        .long("link")
                        .help("Print the full results link instead of the bare payload")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("select")
                .about("Store a template and print the builder redirect")
                .arg(input_arg().help("JSON template file (stdin if not specified)"))
                .arg(store_arg()),
        )
        .subcommand(
            Command::new("load")
                .about("Print the stored template requested by a builder query")
                .arg(store_arg())
                .arg(
                    Arg::new("query")
                        .short('q')
                        .long("query")
                        .value_name("QUERY")
                        .help("Builder query string, e.g. ?template=t-123")
                        .required(true),
                )
                .arg(
                    Arg::new("consume")
                        .long("consume")
                        .help("Clear the slot after a successful load")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("clear")
                .about("Empty the template slot")
                .arg(store_arg()),
        )
}

fn input_arg() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .value_name("FILE")
}

fn store_arg() -> Arg {
    Arg::new("store")
        .short('s')
        .long("store")
        .value_name("PATH")
        .help("File backing the handoff store")
        .required(true)
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<ExitCode> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let config = match matches.get_one::<String>("config") {
        Some(path) => AppConfig::load(Path::new(path))
            .with_context(|| format!("failed to load config {}", path))?,
        None => AppConfig::default(),
    };

    match matches.subcommand() {
        Some(("decode", sub)) => decode(&config, sub),
        Some(("encode", sub)) => encode(&config, sub),
        Some(("select", sub)) => select(&config, sub),
        Some(("load", sub)) => load(&config, sub),
        Some(("clear", sub)) => {
            let mut store = open_store(sub)?;
            finish_handoff(&mut store, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn decode(config: &AppConfig, matches: &ArgMatches) -> Result<ExitCode> {
    let view = if let Some(query) = matches.get_one::<String>("query") {
        results_view(config, query)
    } else {
        let payload = matches.get_one::<String>("payload").map(String::as_str);
        view_for_outcome(config, decode_payload(payload))
    };

    println!("{}", serde_json::to_string_pretty(&view)?);

    if matches.get_flag("strict") && view.is_fallback() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn encode(config: &AppConfig, matches: &ArgMatches) -> Result<ExitCode> {
    let input = read_input(matches)?;
    let profile: serde_json::Value =
        serde_json::from_str(&input).context("profile is not valid JSON")?;

    if matches.get_flag("link") {
        println!("{}", share_link(&config.results_path, &profile)?);
    } else {
        println!("{}", encode_payload(&profile)?);
    }
    Ok(ExitCode::SUCCESS)
}

fn select(config: &AppConfig, matches: &ArgMatches) -> Result<ExitCode> {
    let template = Template::from_json(&read_input(matches)?).context("invalid template")?;
    let mut store = open_store(matches)?;
    let mut navigator = RecordingNavigator::default();

    let target = select_template(&mut store, &mut navigator, config, &template)?;
    println!("{}", target);
    Ok(ExitCode::SUCCESS)
}

fn load(config: &AppConfig, matches: &ArgMatches) -> Result<ExitCode> {
    let mut store = open_store(matches)?;
    let query = matches
        .get_one::<String>("query")
        .context("--query is required")?;

    match load_selected_template(&store, config, query)? {
        Some(template) => {
            println!("{}", serde_json::to_string_pretty(&template)?);
            if matches.get_flag("consume") {
                finish_handoff(&mut store, config)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No stored template matches {}", query);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn open_store(matches: &ArgMatches) -> Result<FileStore> {
    let path = matches
        .get_one::<String>("store")
        .context("--store is required")?;
    Ok(FileStore::open(path))
}

fn read_input(matches: &ArgMatches) -> Result<String> {
    match matches.get_one::<String>("input") {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {}", path)),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
