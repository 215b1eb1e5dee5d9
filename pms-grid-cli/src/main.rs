//! pms-grid: browse tabular data from the command line.
//!
//! Drives a table controller over a JSON file or a REST endpoint and prints
//! one page of rows.

mod error;
mod paths;
mod render;
mod source;

use std::fs::{self, File};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Args, Parser, Subcommand};
use log::{error, info, warn};
use pms_grid_lib::TableController;
use pms_grid_lib::config::{TableConfig, TableSpec};
use pms_grid_lib::fetch::{HttpFetcher, HttpFetcherConfig, MemoryFetcher, PageFetcher};
use pms_grid_lib::model::Record;
use pms_grid_lib::store::SqliteLayoutStore;
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::error::{CliError, Result};

/// Browse tabular data with search, filters, sorting, and paging
#[derive(Parser, Debug)]
#[command(name = "pms-grid")]
#[command(about = "Browse tabular data with search, filters, sorting, and paging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of rows
    List(ListArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "url"])))]
struct ListArgs {
    /// JSON file holding an array of row objects
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Collection endpoint returning `{ "data": [...], "total_count": n }`
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Table declaration (columns plus settings) as JSON
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Bearer token for --url
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Request timeout for --url, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Free-text search across the searchable fields
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Field filter; FIELD=VALUE matches a substring, FIELD==VALUE an exact value
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    filters: Vec<String>,

    /// Sort column, optionally with direction
    #[arg(long, value_name = "KEY[:desc]")]
    sort: Option<String>,

    /// Page to show; out-of-range pages clamp to the last one
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Rows per page
    #[arg(long, value_name = "N", value_parser = positive)]
    per_page: Option<usize>,

    /// Hide a column (persisted)
    #[arg(long = "hide", value_name = "KEY")]
    hide: Vec<String>,

    /// Show a column (persisted)
    #[arg(long = "show", value_name = "KEY")]
    show: Vec<String>,

    /// Mark every row on the page as selected
    #[arg(long)]
    select_all: bool,
}

fn positive(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::List(args) => run_list(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(file) = File::create(&path) {
        let _ = WriteLogger::init(level, Config::default(), file);
    }
}

async fn run_list(args: ListArgs) -> Result<()> {
    let spec = match &args.config {
        Some(path) => Some(source::read_spec(path)?),
        None => None,
    };

    if let Some(path) = &args.file {
        let rows = source::read_rows(path)?;
        let mut spec = spec.unwrap_or_else(|| TableSpec {
            columns: source::infer_columns(&rows),
            config: TableConfig::default(),
        });
        if spec.config.searchable.is_empty() {
            spec.config.searchable = spec.columns.iter().map(|c| c.key.clone()).collect();
        }
        info!("listing {} rows from {}", rows.len(), path.display());
        let fetcher = MemoryFetcher::new(rows);
        return list(spec, fetcher, &args).await;
    }

    if let Some(url) = &args.url {
        let spec = spec.ok_or(CliError::MissingConfig)?;
        let mut config = HttpFetcherConfig::new(url.as_str());
        if let Some(token) = &args.token {
            config = config.with_bearer_token(token.as_str());
        }
        if let Some(secs) = args.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        info!("listing rows from {}", url);
        let fetcher = HttpFetcher::<Record>::new(config)?;
        return list(spec, fetcher, &args).await;
    }

    Err(CliError::MissingSource)
}

async fn list<F>(spec: TableSpec, fetcher: F, args: &ListArgs) -> Result<()>
where
    F: PageFetcher<Record> + 'static,
{
    let storage_key = spec.config.storage_key.clone();
    let mut controller = TableController::from_spec(spec, fetcher)?;
    if storage_key.is_some() {
        match open_layout_store().await? {
            Some(store) => controller = controller.with_layout_store(store),
            None => warn!("no data directory; column layout will not be saved"),
        }
    }

    controller.load().await?;

    for key in &args.hide {
        controller.toggle_column(key, false).await?;
    }
    for key in &args.show {
        controller.toggle_column(key, true).await?;
    }

    if let Some(per_page) = args.per_page {
        controller.change_per_page(per_page).await?;
    }
    if let Some(query) = &args.search {
        controller.set_query(query.as_str()).await?;
    }
    for raw in &args.filters {
        let (field, value) = source::parse_filter(raw)?;
        controller.set_filter(field, value).await?;
    }
    if let Some(raw) = &args.sort {
        let wanted = source::parse_sort(raw)?;
        // Each click flips direction, so two reach either one.
        for _ in 0..2 {
            if controller.params().sort.as_ref() == Some(&wanted) {
                break;
            }
            controller.sort_by(&wanted.key).await?;
        }
    }

    controller.go_to_page(args.page).await?;

    if args.select_all {
        controller.select_all(true);
    }

    print!("{}", render::render_table(&controller.snapshot()));
    Ok(())
}

async fn open_layout_store() -> Result<Option<SqliteLayoutStore>> {
    let Some(path) = paths::layout_db() else {
        return Ok(None);
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| CliError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(Some(SqliteLayoutStore::open(&path).await?))
}
