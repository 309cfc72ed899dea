// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use runtime::{ClientRuntime, DemoRuntime};
use screener_app::{AppState, ResultSet};
use screener_client::Client;
use screener_testkit::ResumeFaker;
use screener_tui::SessionInfo;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const DEMO_SEED: u64 = 2026;
const DEMO_ROW_COUNT: usize = 25;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `screener --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let client = build_client(&options, &config)?;
    let settings = config.app_settings()?;
    let result_set = load_result_set(&options)?;

    if options.check_only {
        if let Some(client) = &client {
            client.ping()?;
        }
        println!("{}", check_summary(&result_set, client.as_ref()));
        return Ok(());
    }

    let _log_guard = logging::init(&config.log_settings()?)?;
    info!(
        rows = result_set.results.len(),
        demo = options.demo,
        ordering = settings.ordering.as_str(),
        "starting screener"
    );

    let session = SessionInfo {
        job_description: result_set.job_description.clone(),
        generated_at: result_set.generated_at,
        server: client
            .as_ref()
            .map(|client| client.base_url().to_owned())
            .unwrap_or_default(),
    };

    let mut state = AppState::new(result_set.results.clone(), &settings);
    match client {
        Some(client) => {
            let mut runtime = ClientRuntime::new(client);
            screener_tui::run_app(&mut state, &mut runtime, session)
        }
        None => {
            let mut runtime = DemoRuntime::new(&result_set.results, DEMO_SEED);
            screener_tui::run_app(&mut state, &mut runtime, session)
        }
    }
}

/// Demo mode answers lookups offline, so `[server]` is never turned into a
/// client there.
fn build_client(options: &CliOptions, config: &Config) -> Result<Option<Client>> {
    if options.demo {
        return Ok(None);
    }
    let base_url = options
        .server
        .as_deref()
        .unwrap_or_else(|| config.base_url());
    let client = Client::new(base_url, config.detail_path(), config.timeout()?).with_context(
        || {
            format!(
                "invalid [server] config in {}; fix base_url/detail_path/timeout values",
                options.config_path.display()
            )
        },
    )?;
    Ok(Some(client))
}

fn check_summary(result_set: &ResultSet, client: Option<&Client>) -> String {
    let lookups = match client {
        Some(client) => format!(
            "detail lookups via {}{} (timeout {:?})",
            client.base_url(),
            client.detail_path(),
            client.timeout()
        ),
        None => "detail lookups answered offline (demo)".to_owned(),
    };
    format!("ok: {} results, {lookups}", result_set.results.len())
}

fn load_result_set(options: &CliOptions) -> Result<ResultSet> {
    match (&options.results_path, options.demo) {
        (Some(path), _) => read_result_set(path),
        (None, true) => Ok(ResumeFaker::new(DEMO_SEED).result_set(DEMO_ROW_COUNT)),
        (None, false) => {
            bail!("no results to show; pass --results <file> or run with --demo")
        }
    }
}

fn read_result_set(path: &Path) -> Result<ResultSet> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read results {}", path.display()))?;
    ResultSet::from_json(&raw).with_context(|| {
        format!(
            "decode results {}; expected {{\"results\": [{{\"filename\", \"score\"}}]}}",
            path.display()
        )
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    results_path: Option<PathBuf>,
    server: Option<String>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        results_path: None,
        server: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--results" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--results requires a file path"))?;
                options.results_path = Some(PathBuf::from(value.as_ref()));
            }
            "--server" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--server requires a base URL"))?;
                options.server = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("screener");
    println!("  --config <path>          Use a specific config path");
    println!("  --results <path>         Ranked results JSON to browse");
    println!("  --server <url>           Override [server].base_url");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Browse generated results with offline detail lookups");
    println!("  --check                  Validate config, results, and server reachability");
    println!("  --help                   Show this help");
}
