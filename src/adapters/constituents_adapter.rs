//! Ticker universe from a constituents CSV, fetched over HTTP or read from disk.

use std::collections::HashSet;
use std::fs;

use crate::domain::error::SamscreenError;
use crate::ports::universe_port::UniversePort;

fn unavailable(reason: impl Into<String>) -> SamscreenError {
    SamscreenError::UniverseUnavailable {
        reason: reason.into(),
    }
}

/// Extract the symbol column. Symbols are trimmed and upper-cased; blanks are
/// skipped and duplicates keep their first position.
pub fn parse_constituents(content: &str, column: &str) -> Result<Vec<String>, SamscreenError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| unavailable(format!("unreadable header: {}", e)))?;
    let index = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
        .ok_or_else(|| unavailable(format!("no '{}' column in constituents list", column)))?;

    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| unavailable(format!("CSV parse error: {}", e)))?;
        let Some(raw) = record.get(index) else {
            continue;
        };
        let symbol = raw.trim().to_uppercase();
        if !symbol.is_empty() && seen.insert(symbol.clone()) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return Err(unavailable("constituents list is empty"));
    }
    Ok(symbols)
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub struct ConstituentsAdapter {
    source: String,
    column: String,
    timeout_secs: u64,
}

impl ConstituentsAdapter {
    pub fn new(source: &str, column: &str, timeout_secs: u64) -> Self {
        Self {
            source: source.to_string(),
            column: column.to_string(),
            timeout_secs,
        }
    }

    #[cfg(feature = "http")]
    fn download(&self) -> Result<String, SamscreenError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| unavailable(e.to_string()))?;
        let response = client
            .get(&self.source)
            .send()
            .map_err(|e| unavailable(format!("request to {} failed: {}", self.source, e)))?;
        if !response.status().is_success() {
            return Err(unavailable(format!(
                "{} returned HTTP {}",
                self.source,
                response.status()
            )));
        }
        response
            .text()
            .map_err(|e| unavailable(format!("failed to read {}: {}", self.source, e)))
    }

    #[cfg(not(feature = "http"))]
    fn download(&self) -> Result<String, SamscreenError> {
        let _ = self.timeout_secs;
        Err(unavailable(format!(
            "cannot fetch {}: built without the http feature",
            self.source
        )))
    }

    fn load(&self) -> Result<String, SamscreenError> {
        if is_url(&self.source) {
            self.download()
        } else {
            fs::read_to_string(&self.source)
                .map_err(|e| unavailable(format!("failed to read {}: {}", self.source, e)))
        }
    }
}

impl UniversePort for ConstituentsAdapter {
    fn fetch_tickers(&self) -> Result<Vec<String>, SamscreenError> {
        let content = self.load()?;
        let symbols = parse_constituents(&content, &self.column)?;
        tracing::info!(source = %self.source, symbols = symbols.len(), "loaded ticker universe");
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CSV: &str = "Symbol,Security,GICS Sector\n\
        MMM,3M,Industrials\n\
        aos ,A. O. Smith,Industrials\n\
        BRK.B,Berkshire Hathaway,Financials\n\
        MMM,3M,Industrials\n\
        ,Blank,Nothing\n";

    #[test]
    fn parses_symbols_in_order_without_duplicates() {
        let symbols = parse_constituents(CSV, "Symbol").unwrap();
        assert_eq!(symbols, vec!["MMM", "AOS", "BRK.B"]);
    }

    #[test]
    fn column_match_ignores_case() {
        assert_eq!(parse_constituents(CSV, "symbol").unwrap().len(), 3);
    }

    #[test]
    fn missing_column_is_unavailable() {
        let err = parse_constituents(CSV, "Ticker").unwrap_err();
        assert!(matches!(err, SamscreenError::UniverseUnavailable { .. }));
    }

    #[test]
    fn empty_list_is_unavailable() {
        let err = parse_constituents("Symbol,Security\n", "Symbol").unwrap_err();
        assert!(matches!(err, SamscreenError::UniverseUnavailable { .. }));
    }

    #[test]
    fn reads_local_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", CSV).unwrap();
        let adapter =
            ConstituentsAdapter::new(file.path().to_str().unwrap(), "Symbol", 5);
        assert_eq!(adapter.fetch_tickers().unwrap().len(), 3);
    }

    #[test]
    fn missing_local_file_is_unavailable() {
        let adapter = ConstituentsAdapter::new("/nonexistent/constituents.csv", "Symbol", 5);
        assert!(matches!(
            adapter.fetch_tickers(),
            Err(SamscreenError::UniverseUnavailable { .. })
        ));
    }

    #[test]
    fn detects_urls() {
        assert!(is_url("https://example.com/list.csv"));
        assert!(!is_url("data/list.csv"));
    }
}
