// Copyright 2026 Saucesort Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod categorize;
mod cli;
mod client;
mod config;
mod database;
mod error;
mod extract;
mod files;
mod model;
mod normalize;
mod output;
mod rate;
mod status;
mod titles;
mod worker;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use serde_json::json;

use crate::categorize::CategorizeOptions;
use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::ParseArgs;
use crate::cli::RunArgs;
use crate::client::ClientOptions;
use crate::client::HttpTransport;
use crate::client::SearchClient;
use crate::config::Config;
use crate::database::Database;
use crate::error::SearchError;
use crate::files::FileFilter;
use crate::output::JsonResponse;
use crate::output::print_json;
use crate::rate::SystemClock;
use crate::titles::CommandTitleLookup;
use crate::titles::NoTitleLookup;
use crate::titles::SimilarTitles;
use crate::worker::RunOptions;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    if let Err(err) = run(cli.command) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(level: LevelFilter) {
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init => cmd_init(),
        Commands::Run(args) => {
            let json = args.json;
            handle_result(cmd_run(args), json)
        }
        Commands::Parse(args) => {
            let json = args.json;
            handle_result(cmd_parse(args), json)
        }
        Commands::Databases { json } => handle_result(cmd_databases(json), json),
    }
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let code = err
                    .downcast_ref::<SearchError>()
                    .map(SearchError::code)
                    .unwrap_or("error");
                let resp = JsonResponse::error(code, &format!("{err:#}"));
                print_json(&resp)?;
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn cmd_init() -> Result<()> {
    let path = config::global_config_path()
        .ok_or_else(|| anyhow::anyhow!("config directory unavailable"))?;
    if path.exists() {
        anyhow::bail!("config already exists at {}", path.display());
    }
    config::write_config(&path, &Config::default())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let config = config::load_global_config()?;

    let mut filter = FileFilter::default().with_glob(args.glob.as_deref())?;
    if let Some(date) = args.created_after.as_deref() {
        filter.created_after = Some(files::parse_filter_date(date)?);
    }
    if let Some(date) = args.modified_after.as_deref() {
        filter.modified_after = Some(files::parse_filter_date(date)?);
    }
    let file_names = files::list_files(&args.dir, &filter)?;

    let mut excludes = config.exclude_categories.clone();
    excludes.extend(args.exclude.iter().cloned());

    let client_options = ClientOptions {
        databases: args.databases.unwrap_or(config.databases),
        api_key: args.api_key.clone().or_else(|| config.api_key.clone()),
        premium: args.premium || config.premium,
        dual_mode: args.combine,
        retry_cooldown: Duration::from_secs(config.retry_cooldown_secs),
    };
    let transport = HttpTransport::new(
        &config.endpoint,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let mut client = SearchClient::new(transport, SystemClock, client_options);

    let run_options = RunOptions {
        directory: args.dir.clone(),
        mode: args.output_type,
        min_similarity: config::clamp_percent(args.min_similarity.unwrap_or(config.min_similarity)),
        start_file: args.start_file.clone(),
        categorize: CategorizeOptions {
            use_author: args.use_author,
            move_to_categories: args.move_to_categories,
            title_min_similarity: config::clamp_percent(
                args.title_min_similarity
                    .unwrap_or(config.title_min_similarity),
            ),
            excludes: categorize::parse_excludes(&excludes),
        },
    };

    let titles: Box<dyn SimilarTitles> = match config
        .title_lookup_command
        .as_deref()
        .and_then(CommandTitleLookup::from_command_line)
    {
        Some(lookup) => Box::new(lookup),
        None => Box::new(NoTitleLookup),
    };

    let json = args.json;
    let report = worker::run(
        &mut client,
        titles.as_ref(),
        file_names,
        &run_options,
        |file_report| {
            if !json {
                output::print_file_report(file_report);
            }
        },
    )?;

    if json {
        let results = report
            .reports
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .context("serialize results")?;
        let resp = JsonResponse::ok()
            .with_results(results)
            .with_moved(report.moved)
            .with_stats(report.summary)
            .with_warnings(report.warnings);
        print_json(&resp)?;
    } else {
        for moved in &report.moved {
            println!("{} -> {}", moved.filename, moved.category);
        }
        for warn in &report.warnings {
            eprintln!("warning: {warn}");
        }
        output::print_summary(&report.summary);
    }
    Ok(())
}

fn cmd_parse(args: ParseArgs) -> Result<()> {
    let path: PathBuf = args.path;
    let body =
        std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let response = args.mode.parse(&body)?;
    let records = match args.min_similarity {
        Some(threshold) => {
            extract::filter_by_similarity(response.matches, config::clamp_percent(threshold))
        }
        None => response.matches,
    };

    if args.json {
        let results = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .context("serialize results")?;
        print_json(&JsonResponse::ok().with_results(results))?;
    } else {
        output::print_records(&records);
    }
    Ok(())
}

fn cmd_databases(json: bool) -> Result<()> {
    if json {
        let databases = Database::KNOWN
            .iter()
            .map(|db| {
                json!({
                    "code": db.code(),
                    "name": db.name(),
                    "uncompleted": db.is_uncompleted(),
                })
            })
            .collect();
        print_json(&JsonResponse::ok().with_databases(databases))?;
    } else {
        for db in Database::KNOWN {
            let note = if db.is_uncompleted() { "\t(uncompleted)" } else { "" };
            println!("{}\t{}{note}", db.code(), db.name());
        }
    }
    Ok(())
}
