//! Plain-text presenter for the terminal.

use std::io::{self, Write};

use crate::adapters::presentation::{
    CandidateRow, DetailView, IDLE_MESSAGE, NO_MATCHES_MESSAGE, rows, stats_line, summary,
};
use crate::domain::detail::DetailSeries;
use crate::domain::filter::FilterConfig;
use crate::domain::result_set::ResultSet;
use crate::domain::session::SessionView;

const HEADERS: [&str; 6] = ["#", "Ticker", "Price ($)", "RSI", "EMA50 dist", "Volume"];

fn cells(row: &CandidateRow) -> [String; 6] {
    [
        row.rank.to_string(),
        row.ticker.clone(),
        row.price.clone(),
        row.rsi.clone(),
        row.distance.clone(),
        row.volume.clone(),
    ]
}

pub fn write_table<W: Write>(out: &mut W, rows: &[CandidateRow]) -> io::Result<()> {
    let body: Vec<[String; 6]> = rows.iter().map(cells).collect();
    let mut widths = HEADERS.map(str::len);
    for line in &body {
        for (w, cell) in widths.iter_mut().zip(line.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    // Ticker is left-aligned; numbers are right-aligned.
    let format_line = |line: &[String]| {
        line.iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == 1 {
                    format!("{:<w$}", cell, w = widths[i])
                } else {
                    format!("{:>w$}", cell, w = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    writeln!(out, "{}", format_line(&header[..]))?;
    let total: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    writeln!(out, "{}", "-".repeat(total))?;
    for line in &body {
        writeln!(out, "{}", format_line(&line[..]))?;
    }
    Ok(())
}

pub fn write_results<W: Write>(
    out: &mut W,
    results: &ResultSet,
    filters: &FilterConfig,
) -> io::Result<()> {
    writeln!(out, "Strategy: {}", filters)?;
    match summary(results) {
        None => writeln!(out, "{}", NO_MATCHES_MESSAGE)?,
        Some(s) => {
            writeln!(
                out,
                "{} candidates found | lowest RSI {} | best entry {}",
                s.matches, s.lowest_rsi, s.best_entry
            )?;
            writeln!(out)?;
            write_table(out, &rows(results))?;
        }
    }
    writeln!(out)?;
    writeln!(out, "{}", stats_line(&results.stats))
}

pub fn write_detail<W: Write>(out: &mut W, detail: &DetailSeries) -> io::Result<()> {
    let view = DetailView::new(detail);
    writeln!(out, "{} ({} to {})", view.ticker, view.from, view.to)?;
    writeln!(out, "  Latest price:  {}", view.price)?;
    writeln!(out, "  Latest RSI14:  {}", view.rsi)?;
    writeln!(out, "  Volume:        {}", view.volume)?;
    if let Some(ema) = detail.ema.latest() {
        writeln!(out, "  EMA50:         {:.2}", ema)?;
    }
    Ok(())
}

pub fn write_view<W: Write>(out: &mut W, view: &SessionView<'_>) -> io::Result<()> {
    match view {
        SessionView::Idle => writeln!(out, "{}", IDLE_MESSAGE),
        SessionView::NoMatches { filters } => {
            writeln!(out, "Strategy: {}", filters)?;
            writeln!(out, "{}", NO_MATCHES_MESSAGE)
        }
        SessionView::Results {
            results,
            filters,
            detail,
            ..
        } => {
            write_results(out, results, filters)?;
            if let Some(detail) = detail {
                writeln!(out)?;
                write_detail(out, detail)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluator::VolumeTrend;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::result_set::{Candidate, RankBy, ScanStats};
    use crate::domain::session::Session;
    use chrono::NaiveDate;

    fn candidate(ticker: &str, rsi: f64, distance: f64) -> Candidate {
        Candidate {
            ticker: ticker.into(),
            price: 50.0,
            rsi,
            ema: 50.0,
            ema_distance_pct: distance,
            abs_ema_distance: distance.abs(),
            volume: 1_500_000,
            volume_trend: VolumeTrend::Rising,
        }
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn table_lists_ranked_rows_with_signed_distance() {
        let results = ResultSet::new(
            vec![candidate("XOM", 22.5, 1.2), candidate("KO", 27.0, -0.5)],
            RankBy::EmaDistance,
            ScanStats::default(),
        );
        let text = render(|out| write_results(out, &results, &FilterConfig::default()));

        let ko = text.find("KO").unwrap();
        let xom = text.find("XOM").unwrap();
        assert!(ko < xom);
        assert!(text.contains("-0.50%"));
        assert!(text.contains("+1.20%"));
        assert!(text.contains("2 candidates found | lowest RSI 22.50 | best entry XOM"));
        assert!(text.contains("Strategy: RSI <= 30"));
    }

    #[test]
    fn empty_results_print_no_match_message() {
        let results = ResultSet::new(Vec::new(), RankBy::EmaDistance, ScanStats::default());
        let text = render(|out| write_results(out, &results, &FilterConfig::default()));
        assert!(text.contains(NO_MATCHES_MESSAGE));
        assert!(!text.contains("Ticker"));
    }

    #[test]
    fn idle_view_prints_prompt() {
        let session = Session::new();
        let text = render(|out| write_view(out, &session.view()));
        assert_eq!(text.trim(), IDLE_MESSAGE);
    }

    #[test]
    fn detail_formats_volume_in_millions() {
        let bar = OhlcvBar {
            code: "KO".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            open: 60.0,
            high: 61.0,
            low: 59.0,
            close: 60.5,
            volume: 12_345_678,
        };
        let detail = DetailSeries::from_bars("KO", vec![bar]);
        let text = render(|out| write_detail(out, &detail));
        assert!(text.contains("Latest price:  60.50"));
        assert!(text.contains("12.35M"));
        assert!(text.contains("Latest RSI14:  -"));
    }
}
