//! CLI definition and dispatch.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::adapters::console_table;
use crate::adapters::constituents_adapter::ConstituentsAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::domain::config_validation::{
    DEFAULT_UNIVERSE_SOURCE, DataProvider, ScreenerConfig, load_config,
};
use crate::domain::detail::load_detail;
use crate::domain::error::SamscreenError;
use crate::domain::result_set::RankBy;
use crate::domain::screener::Screener;
use crate::domain::session::Session;
use crate::logging::init_logging;
use crate::ports::config_port::Defaults;
use crate::ports::data_port::DataPort;
use crate::ports::progress_port::LogProgress;
use crate::ports::report_port::ReportPort;
use crate::ports::universe_port::UniversePort;

#[derive(Parser, Debug)]
#[command(name = "samscreen", version, about = "Stock screener: oversold names near their EMA50")]
pub struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Disable the RSI filter
    #[arg(long)]
    pub no_rsi: bool,
    /// Pass when RSI14 <= this value (10-80)
    #[arg(long)]
    pub rsi_threshold: Option<f64>,
    /// Disable the EMA50 proximity filter
    #[arg(long)]
    pub no_ema: bool,
    /// Pass when |distance to EMA50| <= this percentage (0.5-10)
    #[arg(long)]
    pub ema_tolerance: Option<f64>,
    /// Disable the rising-volume filter
    #[arg(long)]
    pub no_volume: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the universe and print ranked candidates
    Scan {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Concurrent fetches (1-64)
        #[arg(long)]
        workers: Option<usize>,
        /// ema_distance or rsi
        #[arg(long)]
        rank_by: Option<RankBy>,
        /// Only scan the first N symbols of the universe
        #[arg(long)]
        limit: Option<usize>,
        /// Show the detail view for one of the results
        #[arg(long)]
        select: Option<String>,
        /// Write an HTML report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the one-year detail view for a ticker
    Detail {
        ticker: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Start the web UI
    #[cfg(feature = "web")]
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Address to bind, e.g. 127.0.0.1:3000
        #[arg(long)]
        listen: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Scan {
            config,
            filters,
            workers,
            rank_by,
            limit,
            select,
            output,
        } => {
            let overrides = ScanOverrides {
                filters,
                workers,
                rank_by,
                limit,
            };
            run_scan(config.as_ref(), &overrides, select.as_deref(), output.as_ref())
        }
        Command::Detail { ticker, config } => run_detail(&ticker, config.as_ref()),
        Command::Validate { config } => run_validate(&config),
        #[cfg(feature = "web")]
        Command::Serve { config, listen } => run_serve(config.as_ref(), listen.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct ScanOverrides {
    pub filters: FilterArgs,
    pub workers: Option<usize>,
    pub rank_by: Option<RankBy>,
    pub limit: Option<usize>,
}

impl ScanOverrides {
    pub fn apply(&self, config: &mut ScreenerConfig) -> Result<(), SamscreenError> {
        let f = &self.filters;
        if f.no_rsi {
            config.filters.use_rsi = false;
        }
        if f.no_ema {
            config.filters.use_ema = false;
        }
        if f.no_volume {
            config.filters.use_volume = false;
        }
        if let Some(t) = f.rsi_threshold {
            config.filters.rsi_threshold = t;
        }
        if let Some(t) = f.ema_tolerance {
            config.filters.ema_tolerance_pct = t;
        }
        if let Some(w) = self.workers {
            config.scan.workers = w;
        }
        if let Some(r) = self.rank_by {
            config.scan.rank_by = r;
        }
        if let Some(n) = self.limit {
            config.scan.limit = (n > 0).then_some(n);
        }
        config.validate()
    }
}

/// Read the config file when given, otherwise run on defaults.
pub fn load_settings(path: Option<&PathBuf>) -> Result<ScreenerConfig, SamscreenError> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config(&FileConfigAdapter::from_file(path)?)
        }
        None => load_config(&Defaults),
    }
}

pub fn build_data_port(
    config: &ScreenerConfig,
) -> Result<Arc<dyn DataPort + Send + Sync>, SamscreenError> {
    match config.data.provider {
        DataProvider::Csv => {
            let dir = config
                .data
                .csv_dir
                .as_ref()
                .ok_or_else(|| SamscreenError::ConfigMissing {
                    section: "data".to_string(),
                    key: "csv_dir".to_string(),
                })?;
            Ok(Arc::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        #[cfg(feature = "http")]
        DataProvider::Yahoo => Ok(Arc::new(
            crate::adapters::yahoo_adapter::YahooAdapter::new(config.data.timeout_secs)?,
        )),
        #[cfg(not(feature = "http"))]
        DataProvider::Yahoo => Err(SamscreenError::invalid(
            "data",
            "provider",
            "yahoo requires the http feature",
        )),
    }
}

/// With the csv provider and no explicit universe source, the data
/// directory's files are the universe.
pub fn build_universe_port(config: &ScreenerConfig) -> Arc<dyn UniversePort + Send + Sync> {
    match (&config.data.provider, &config.data.csv_dir) {
        (DataProvider::Csv, Some(dir)) if config.universe.source == DEFAULT_UNIVERSE_SOURCE => {
            Arc::new(CsvAdapter::new(PathBuf::from(dir)))
        }
        _ => Arc::new(ConstituentsAdapter::new(
            &config.universe.source,
            &config.universe.symbol_column,
            config.data.timeout_secs,
        )),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn run_scan(
    config_path: Option<&PathBuf>,
    overrides: &ScanOverrides,
    select: Option<&str>,
    output_path: Option<&PathBuf>,
) -> Result<(), SamscreenError> {
    let mut config = load_settings(config_path)?;
    overrides.apply(&mut config)?;

    let data = build_data_port(&config)?;
    let universe = build_universe_port(&config);
    let as_of = today();

    let screener = Screener::new(&*universe, &*data, config.scan);
    let results = screener.run(&config.filters, as_of, &LogProgress)?;

    let mut session = Session::new();
    session.replace_results(results, config.filters);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    console_table::write_view(&mut out, &session.view())?;

    if let Some(ticker) = select {
        let ticker = ticker.trim().to_uppercase();
        let token = session.select(&ticker)?;
        let detail = load_detail(&*data, &ticker, as_of, config.detail_lookback_days)?;
        if session.install_detail(token, detail) {
            if let Some(detail) = session.detail() {
                writeln!(out)?;
                console_table::write_detail(&mut out, detail)?;
            }
        }
    }
    out.flush()?;

    let output = output_path
        .map(|p| p.display().to_string())
        .or_else(|| config.report_output.clone());
    if let (Some(path), Some(results)) = (output, session.results()) {
        HtmlReportAdapter::new().write(results, &config.filters, session.detail(), &path)?;
        eprintln!("Report written to: {}", path);
    }
    Ok(())
}

fn run_detail(ticker: &str, config_path: Option<&PathBuf>) -> Result<(), SamscreenError> {
    let config = load_settings(config_path)?;
    let data = build_data_port(&config)?;
    let ticker = ticker.trim().to_uppercase();

    let detail = load_detail(&*data, &ticker, today(), config.detail_lookback_days)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    console_table::write_detail(&mut out, &detail)?;
    out.flush()?;
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), SamscreenError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_settings(Some(config_path))?;

    eprintln!("  universe:  {}", config.universe.source);
    eprintln!("  provider:  {}", config.data.provider);
    eprintln!(
        "  scan:      {} days, {} workers, ranked by {}",
        config.scan.lookback_days, config.scan.workers, config.scan.rank_by
    );
    eprintln!("  strategy:  {}", config.filters);
    eprintln!("\nConfiguration is valid.");
    Ok(())
}

#[cfg(feature = "web")]
fn run_serve(config_path: Option<&PathBuf>, listen: Option<&str>) -> Result<(), SamscreenError> {
    use crate::adapters::web::{AppState, serve};

    let config = load_settings(config_path)?;
    let data = build_data_port(&config)?;
    let universe = build_universe_port(&config);
    let listen = listen.map(str::to_string).unwrap_or(config.web_listen.clone());

    let state = AppState::new(
        Arc::clone(&universe),
        Arc::clone(&data),
        config.scan,
        config.filters,
        config.detail_lookback_days,
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let served = runtime.block_on(serve(state, &listen));
    drop(runtime);
    // The blocking HTTP client must be dropped outside the async runtime.
    drop((data, universe));
    served
}
