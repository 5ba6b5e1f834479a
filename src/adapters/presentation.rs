//! Display formatting shared by the console, HTML report and web presenters.
//!
//! Domain values stay at full precision; everything here rounds to two
//! decimals for display only.

use crate::adapters::chart_svg::{price_chart, rsi_chart};
use crate::domain::detail::{DetailSeries, format_volume};
use crate::domain::filter::FilterConfig;
use crate::domain::result_set::{Candidate, ResultSet, ScanStats};

pub const NO_MATCHES_MESSAGE: &str =
    "No stocks match these criteria. Try widening the EMA tolerance or raising the RSI threshold.";
pub const IDLE_MESSAGE: &str = "No scan yet. Run a scan to screen the market.";

/// Signed percentage with an explicit sign, e.g. `+1.23%` or `-0.40%`.
pub fn format_signed_pct(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded > 0.0 {
        format!("+{:.2}%", rounded)
    } else if rounded < 0.0 {
        format!("{:.2}%", rounded)
    } else {
        "0.00%".to_string()
    }
}

pub fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn stats_line(stats: &ScanStats) -> String {
    format!(
        "{} scanned, {} passed, {} excluded ({} short history, {} no indicator, {} rejected, {} fetch failed)",
        stats.evaluated,
        stats.passed,
        stats.excluded(),
        stats.insufficient_history,
        stats.indicator_unavailable,
        stats.rejected,
        stats.fetch_failed
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub rank: usize,
    pub ticker: String,
    pub price: String,
    pub rsi: String,
    pub distance: String,
    /// `pos` above the EMA50, `neg` at or below it.
    pub distance_class: &'static str,
    pub rsi_class: &'static str,
    pub volume: String,
    pub selected: bool,
}

/// Colour band for an RSI reading, `rsi-0` (0 to 20, green) through `rsi-4`
/// (80 to 100, red).
pub fn rsi_band(rsi: f64) -> &'static str {
    match rsi {
        r if r < 20.0 => "rsi-0",
        r if r < 40.0 => "rsi-1",
        r if r < 60.0 => "rsi-2",
        r if r < 80.0 => "rsi-3",
        _ => "rsi-4",
    }
}

impl CandidateRow {
    pub fn new(rank: usize, c: &Candidate) -> Self {
        Self {
            rank,
            ticker: c.ticker.clone(),
            price: format_price(c.price),
            rsi: format!("{:.2}", c.rsi_display()),
            distance: format_signed_pct(c.ema_distance_pct),
            distance_class: if c.is_above_ema() { "pos" } else { "neg" },
            rsi_class: rsi_band(c.rsi),
            volume: format_volume(c.volume),
            selected: false,
        }
    }
}

pub fn rows(results: &ResultSet) -> Vec<CandidateRow> {
    results
        .candidates()
        .iter()
        .enumerate()
        .map(|(i, c)| CandidateRow::new(i + 1, c))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    pub matches: usize,
    pub lowest_rsi: String,
    pub best_entry: String,
}

pub fn summary(results: &ResultSet) -> Option<SummaryView> {
    results.summary().map(|s| SummaryView {
        matches: s.matches,
        lowest_rsi: format!("{:.2}", s.lowest_rsi),
        best_entry: s.best_entry,
    })
}

#[derive(Debug, Clone)]
pub struct DetailView {
    pub ticker: String,
    pub price: String,
    pub rsi: String,
    pub volume: String,
    pub from: String,
    pub to: String,
    pub price_svg: String,
    pub rsi_svg: String,
}

impl DetailView {
    pub fn new(detail: &DetailSeries) -> Self {
        let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
        Self {
            ticker: detail.ticker.clone(),
            price: or_dash(detail.latest_price().map(format_price)),
            rsi: or_dash(detail.latest_rsi().map(|r| format!("{:.2}", r))),
            volume: or_dash(detail.latest_volume().map(format_volume)),
            from: or_dash(detail.first_date().map(|d| d.to_string())),
            to: or_dash(detail.last_date().map(|d| d.to_string())),
            price_svg: price_chart(detail),
            rsi_svg: rsi_chart(detail),
        }
    }
}

/// Everything the results panel template needs.
#[derive(Debug, Clone)]
pub struct PanelView {
    pub strategy: String,
    pub idle: bool,
    pub message: Option<&'static str>,
    pub summary: Option<SummaryView>,
    pub rows: Vec<CandidateRow>,
    pub stats: Option<String>,
    pub selected: Option<String>,
    pub detail: Option<DetailView>,
}

impl PanelView {
    pub fn idle(filters: &FilterConfig) -> Self {
        Self {
            strategy: filters.to_string(),
            idle: true,
            message: Some(IDLE_MESSAGE),
            summary: None,
            rows: Vec::new(),
            stats: None,
            selected: None,
            detail: None,
        }
    }

    pub fn from_results(
        results: &ResultSet,
        filters: &FilterConfig,
        selected: Option<&str>,
        detail: Option<&DetailSeries>,
    ) -> Self {
        Self {
            strategy: filters.to_string(),
            idle: false,
            message: results.is_empty().then_some(NO_MATCHES_MESSAGE),
            summary: summary(results),
            rows: rows(results)
                .into_iter()
                .map(|row| CandidateRow {
                    selected: selected == Some(row.ticker.as_str()),
                    ..row
                })
                .collect(),
            stats: Some(stats_line(&results.stats)),
            selected: selected.map(str::to_string),
            detail: detail.map(DetailView::new),
        }
    }
}
