//! Offline data adapter over a directory of `<TICKER>.csv` files.
//!
//! Each file has a `date,open,high,low,close,volume` header. The directory
//! listing doubles as the ticker universe.

use crate::domain::error::SamscreenError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use crate::ports::universe_port::UniversePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    code: &str,
) -> Result<&'r str, SamscreenError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| SamscreenError::DataFetch {
            code: code.to_string(),
            reason: format!("missing {} column", name),
        })
}

fn parse_price(value: &str, name: &str, code: &str) -> Result<f64, SamscreenError> {
    value.parse().map_err(|e| SamscreenError::DataFetch {
        code: code.to_string(),
        reason: format!("invalid {} value '{}': {}", name, value, e),
    })
}

/// Volumes are sometimes exported as floats (`1234.0`).
fn parse_volume(value: &str, code: &str) -> Result<i64, SamscreenError> {
    value
        .parse::<i64>()
        .or_else(|_| value.parse::<f64>().map(|v| v.round() as i64))
        .map_err(|e| SamscreenError::DataFetch {
            code: code.to_string(),
            reason: format!("invalid volume value '{}': {}", value, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SamscreenError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|e| SamscreenError::DataFetch {
            code: code.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SamscreenError::DataFetch {
                code: code.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, 0, "date", code)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SamscreenError::DataFetch {
                    code: code.to_string(),
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let bar = OhlcvBar {
                code: code.to_string(),
                date,
                open: parse_price(field(&record, 1, "open", code)?, "open", code)?,
                high: parse_price(field(&record, 2, "high", code)?, "high", code)?,
                low: parse_price(field(&record, 3, "low", code)?, "low", code)?,
                close: parse_price(field(&record, 4, "close", code)?, "close", code)?,
                volume: parse_volume(field(&record, 5, "volume", code)?, code)?,
            };
            // `f64::from_str` accepts "NaN" and "inf".
            if bar.is_well_formed() {
                bars.push(bar);
            } else {
                tracing::debug!(ticker = code, %date, "dropping malformed row");
            }
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl UniversePort for CsvAdapter {
    fn fetch_tickers(&self) -> Result<Vec<String>, SamscreenError> {
        let entries =
            fs::read_dir(&self.base_path).map_err(|e| SamscreenError::UniverseUnavailable {
                reason: format!(
                    "failed to read directory {}: {}",
                    self.base_path.display(),
                    e
                ),
            })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SamscreenError::UniverseUnavailable {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(".csv") {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
