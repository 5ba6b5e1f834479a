//! Configuration loading and validation.
//!
//! Every key has a default, so an empty configuration yields the standard
//! screen. Values are range-checked here before any scan starts.

use std::fmt;
use std::str::FromStr;

use crate::domain::detail::DETAIL_LOOKBACK_DAYS;
use crate::domain::error::SamscreenError;
use crate::domain::filter::{EMA_TOLERANCE_RANGE, FilterConfig, RSI_THRESHOLD_RANGE};
use crate::domain::result_set::RankBy;
use crate::domain::screener::{MAX_LOOKBACK_DAYS, MAX_WORKERS, ScanSettings};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_UNIVERSE_SOURCE: &str =
    "https://raw.githubusercontent.com/datasets/s-and-p-500-companies/master/data/constituents.csv";
pub const DEFAULT_SYMBOL_COLUMN: &str = "Symbol";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataProvider {
    #[default]
    Yahoo,
    Csv,
}

impl fmt::Display for DataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataProvider::Yahoo => write!(f, "yahoo"),
            DataProvider::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for DataProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(DataProvider::Yahoo),
            "csv" => Ok(DataProvider::Csv),
            other => Err(format!("unknown provider '{}' (expected yahoo or csv)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniverseSettings {
    pub source: String,
    pub symbol_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub provider: DataProvider,
    /// Required when the provider is `csv`.
    pub csv_dir: Option<String>,
    pub timeout_secs: u64,
}

/// Fully validated runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    pub universe: UniverseSettings,
    pub data: DataSettings,
    pub scan: ScanSettings,
    pub filters: FilterConfig,
    pub detail_lookback_days: i64,
    pub report_output: Option<String>,
    pub web_listen: String,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            universe: UniverseSettings {
                source: DEFAULT_UNIVERSE_SOURCE.to_string(),
                symbol_column: DEFAULT_SYMBOL_COLUMN.to_string(),
            },
            data: DataSettings {
                provider: DataProvider::Yahoo,
                csv_dir: None,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            scan: ScanSettings::default(),
            filters: FilterConfig::default(),
            detail_lookback_days: DETAIL_LOOKBACK_DAYS,
            report_output: None,
            web_listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

impl ScreenerConfig {
    /// Re-check values that command-line overrides may have changed.
    pub fn validate(&self) -> Result<(), SamscreenError> {
        validate_filter_config(&self.filters)?;
        validate_scan_settings(&self.scan)?;
        validate_data_settings(&self.data)?;
        validate_lookback("detail", self.detail_lookback_days)?;
        Ok(())
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read every section, apply defaults and validate the result.
pub fn load_config(config: &dyn ConfigPort) -> Result<ScreenerConfig, SamscreenError> {
    let defaults = ScreenerConfig::default();

    let universe = UniverseSettings {
        source: non_empty(config, "universe", "source").unwrap_or(defaults.universe.source),
        symbol_column: non_empty(config, "universe", "symbol_column")
            .unwrap_or(defaults.universe.symbol_column),
    };

    let provider = match non_empty(config, "data", "provider") {
        Some(s) => s
            .parse::<DataProvider>()
            .map_err(|reason| SamscreenError::invalid("data", "provider", reason))?,
        None => DataProvider::default(),
    };
    let timeout_secs = config.get_int("data", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64);
    if timeout_secs <= 0 {
        return Err(SamscreenError::invalid(
            "data",
            "timeout_secs",
            "timeout_secs must be positive",
        ));
    }
    let data = DataSettings {
        provider,
        csv_dir: non_empty(config, "data", "csv_dir"),
        timeout_secs: timeout_secs as u64,
    };

    let scan = load_scan_settings(config, &defaults.scan)?;
    let filters = load_filter_config(config);

    let loaded = ScreenerConfig {
        universe,
        data,
        scan,
        filters,
        detail_lookback_days: config.get_int("detail", "lookback_days", DETAIL_LOOKBACK_DAYS),
        report_output: non_empty(config, "report", "output"),
        web_listen: non_empty(config, "web", "listen").unwrap_or(defaults.web_listen),
    };
    loaded.validate()?;
    Ok(loaded)
}

pub fn load_filter_config(config: &dyn ConfigPort) -> FilterConfig {
    let d = FilterConfig::default();
    FilterConfig {
        use_rsi: config.get_bool("filters", "use_rsi", d.use_rsi),
        rsi_threshold: config.get_double("filters", "rsi_threshold", d.rsi_threshold),
        use_ema: config.get_bool("filters", "use_ema", d.use_ema),
        ema_tolerance_pct: config.get_double("filters", "ema_tolerance_pct", d.ema_tolerance_pct),
        use_volume: config.get_bool("filters", "use_volume", d.use_volume),
    }
}

fn load_scan_settings(
    config: &dyn ConfigPort,
    defaults: &ScanSettings,
) -> Result<ScanSettings, SamscreenError> {
    let workers = config.get_int("scan", "workers", defaults.workers as i64);
    if workers < 1 || workers > MAX_WORKERS as i64 {
        return Err(SamscreenError::invalid(
            "scan",
            "workers",
            format!("workers must be between 1 and {}", MAX_WORKERS),
        ));
    }

    let progress_every = config.get_int("scan", "progress_every", defaults.progress_every as i64);
    if progress_every < 1 {
        return Err(SamscreenError::invalid(
            "scan",
            "progress_every",
            "progress_every must be at least 1",
        ));
    }

    let limit = config.get_int("universe", "limit", 0);
    if limit < 0 {
        return Err(SamscreenError::invalid(
            "universe",
            "limit",
            "limit must be non-negative",
        ));
    }

    let rank_by = match non_empty(config, "scan", "rank_by") {
        Some(s) => s
            .parse::<RankBy>()
            .map_err(|reason| SamscreenError::invalid("scan", "rank_by", reason))?,
        None => defaults.rank_by,
    };

    Ok(ScanSettings {
        lookback_days: config.get_int("scan", "lookback_days", defaults.lookback_days),
        workers: workers as usize,
        progress_every: progress_every as usize,
        rank_by,
        limit: (limit > 0).then_some(limit as usize),
    })
}

/// Thresholds are checked even when their filter is disabled, so that
/// re-enabling a filter never silently activates a nonsense value.
pub fn validate_filter_config(filters: &FilterConfig) -> Result<(), SamscreenError> {
    let (lo, hi) = RSI_THRESHOLD_RANGE;
    if !(lo..=hi).contains(&filters.rsi_threshold) {
        return Err(SamscreenError::invalid(
            "filters",
            "rsi_threshold",
            format!("rsi_threshold must be between {} and {}", lo, hi),
        ));
    }
    let (lo, hi) = EMA_TOLERANCE_RANGE;
    if !(lo..=hi).contains(&filters.ema_tolerance_pct) {
        return Err(SamscreenError::invalid(
            "filters",
            "ema_tolerance_pct",
            format!("ema_tolerance_pct must be between {} and {}", lo, hi),
        ));
    }
    Ok(())
}

pub fn validate_scan_settings(scan: &ScanSettings) -> Result<(), SamscreenError> {
    if scan.workers < 1 || scan.workers > MAX_WORKERS {
        return Err(SamscreenError::invalid(
            "scan",
            "workers",
            format!("workers must be between 1 and {}", MAX_WORKERS),
        ));
    }
    validate_lookback("scan", scan.lookback_days)
}

fn validate_lookback(section: &str, days: i64) -> Result<(), SamscreenError> {
    if !(1..=MAX_LOOKBACK_DAYS).contains(&days) {
        return Err(SamscreenError::invalid(
            section,
            "lookback_days",
            format!("lookback_days must be between 1 and {}", MAX_LOOKBACK_DAYS),
        ));
    }
    Ok(())
}

fn validate_data_settings(data: &DataSettings) -> Result<(), SamscreenError> {
    if data.provider == DataProvider::Csv && data.csv_dir.is_none() {
        return Err(SamscreenError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_dir".to_string(),
        });
    }
    Ok(())
}
