//! Inline SVG charts for the detail view: close price with EMA50, and RSI14
//! with its 30/70 guide lines.

use crate::domain::detail::DetailSeries;
use crate::domain::indicator::IndicatorPoint;

const WIDTH: f64 = 720.0;
const PRICE_HEIGHT: f64 = 260.0;
const RSI_HEIGHT: f64 = 140.0;
const PADDING: f64 = 36.0;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Maps (index, value) pairs onto the plot area.
struct Frame {
    height: f64,
    len: usize,
    min: f64,
    max: f64,
}

impl Frame {
    fn x(&self, i: usize) -> f64 {
        let plot_width = WIDTH - 2.0 * PADDING;
        if self.len > 1 {
            PADDING + i as f64 * plot_width / (self.len - 1) as f64
        } else {
            PADDING + plot_width / 2.0
        }
    }

    fn y(&self, value: f64) -> f64 {
        let plot_height = self.height - 2.0 * PADDING;
        let range = self.max - self.min;
        if range > 0.0 {
            self.height - PADDING - (value - self.min) * plot_height / range
        } else {
            self.height / 2.0
        }
    }
}

/// One `<polyline>` per run of consecutive valid values, so warm-up gaps
/// are left blank instead of drawn as zeros.
fn polylines(frame: &Frame, values: &[Option<f64>], class: &str) -> String {
    let mut out = String::new();
    let mut run: Vec<String> = Vec::new();
    let flush = |run: &mut Vec<String>, out: &mut String| {
        if run.len() > 1 {
            out.push_str(&format!(
                r#"<polyline class="{}" fill="none" points="{}"/>"#,
                class,
                run.join(" ")
            ));
        }
        run.clear();
    };

    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => run.push(format!("{:.1},{:.1}", frame.x(i), frame.y(*v))),
            None => flush(&mut run, &mut out),
        }
    }
    flush(&mut run, &mut out);
    out
}

fn indicator_values(points: &[IndicatorPoint]) -> Vec<Option<f64>> {
    points.iter().map(IndicatorPoint::as_option).collect()
}

fn axis_labels(series: &DetailSeries, frame: &Frame, decimals: usize) -> String {
    let first = series
        .first_date()
        .map(|d| d.to_string())
        .unwrap_or_default();
    let last = series.last_date().map(|d| d.to_string()).unwrap_or_default();
    format!(
        concat!(
            r#"<text class="axis" x="{:.1}" y="{:.1}">{:.*}</text>"#,
            r#"<text class="axis" x="{:.1}" y="{:.1}">{:.*}</text>"#,
            r#"<text class="axis" x="{:.1}" y="{:.1}">{}</text>"#,
            r#"<text class="axis" x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
        ),
        2.0,
        PADDING,
        decimals,
        frame.max,
        2.0,
        frame.height - PADDING,
        decimals,
        frame.min,
        PADDING,
        frame.height - 8.0,
        first,
        WIDTH - PADDING,
        frame.height - 8.0,
        last
    )
}

pub fn price_chart(series: &DetailSeries) -> String {
    if series.bars.is_empty() {
        return "No price data available.".to_string();
    }

    let closes: Vec<Option<f64>> = series
        .bars
        .iter()
        .map(|b| Some(b.close).filter(|c| c.is_finite()))
        .collect();
    let ema = indicator_values(&series.ema.values);

    let (min, max) = closes
        .iter()
        .chain(ema.iter())
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let frame = Frame {
        height: PRICE_HEIGHT,
        len: series.bars.len(),
        min,
        max,
    };

    format!(
        r#"<svg class="chart price" viewBox="0 0 {w} {h}" width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg" role="img" aria-label="{t} close and EMA50">{close}{ema}{labels}</svg>"#,
        w = WIDTH,
        h = PRICE_HEIGHT,
        t = series.ticker,
        close = polylines(&frame, &closes, "close"),
        ema = polylines(&frame, &ema, "ema"),
        labels = axis_labels(series, &frame, 2),
    )
}

pub fn rsi_chart(series: &DetailSeries) -> String {
    if series.bars.is_empty() {
        return "No RSI data available.".to_string();
    }

    let frame = Frame {
        height: RSI_HEIGHT,
        len: series.bars.len(),
        min: 0.0,
        max: 100.0,
    };
    let guide = |level: f64, class: &str| {
        format!(
            r#"<line class="{}" x1="{:.1}" x2="{:.1}" y1="{:.1}" y2="{:.1}" stroke-dasharray="4 3"/>"#,
            class,
            PADDING,
            WIDTH - PADDING,
            frame.y(level),
            frame.y(level)
        )
    };

    format!(
        r#"<svg class="chart rsi" viewBox="0 0 {w} {h}" width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg" role="img" aria-label="{t} RSI14">{over}{under}{rsi}{labels}</svg>"#,
        w = WIDTH,
        h = RSI_HEIGHT,
        t = series.ticker,
        over = guide(RSI_OVERBOUGHT, "overbought"),
        under = guide(RSI_OVERSOLD, "oversold"),
        rsi = polylines(&frame, &indicator_values(&series.rsi.values), "rsi"),
        labels = axis_labels(series, &frame, 0),
    )
}
