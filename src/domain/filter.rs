//! Filter configuration: three independently toggleable criteria.

use std::fmt;

pub const DEFAULT_RSI_THRESHOLD: f64 = 30.0;
pub const DEFAULT_EMA_TOLERANCE_PCT: f64 = 2.0;

pub const RSI_THRESHOLD_RANGE: (f64, f64) = (10.0, 80.0);
pub const EMA_TOLERANCE_RANGE: (f64, f64) = (0.5, 10.0);

/// The active screening strategy. Read-only for the duration of a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub use_rsi: bool,
    pub rsi_threshold: f64,
    pub use_ema: bool,
    pub ema_tolerance_pct: f64,
    pub use_volume: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            use_rsi: true,
            rsi_threshold: DEFAULT_RSI_THRESHOLD,
            use_ema: true,
            ema_tolerance_pct: DEFAULT_EMA_TOLERANCE_PCT,
            use_volume: true,
        }
    }
}

impl FilterConfig {
    /// Every criterion disabled: any ticker with computable indicators passes.
    pub fn pass_all() -> Self {
        Self {
            use_rsi: false,
            use_ema: false,
            use_volume: false,
            ..Self::default()
        }
    }

    pub fn active_count(&self) -> usize {
        [self.use_rsi, self.use_ema, self.use_volume]
            .iter()
            .filter(|&&on| on)
            .count()
    }
}

/// One of the three fixed screening criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Criterion {
    Rsi,
    EmaProximity,
    VolumeTrend,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Rsi => write!(f, "rsi"),
            Criterion::EmaProximity => write!(f, "ema"),
            Criterion::VolumeTrend => write!(f, "volume"),
        }
    }
}

/// Human-readable strategy line, e.g. `RSI <= 30 • |EMA50 distance| <= 2.0% • rising volume`.
impl fmt::Display for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.use_rsi {
            parts.push(format!("RSI <= {}", self.rsi_threshold));
        }
        if self.use_ema {
            parts.push(format!("|EMA50 distance| <= {:.1}%", self.ema_tolerance_pct));
        }
        if self.use_volume {
            parts.push("rising volume".to_string());
        }
        if parts.is_empty() {
            write!(f, "no active filters")
        } else {
            write!(f, "{}", parts.join(" • "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_all_three() {
        let config = FilterConfig::default();
        assert!(config.use_rsi && config.use_ema && config.use_volume);
        assert_eq!(config.rsi_threshold, 30.0);
        assert_eq!(config.ema_tolerance_pct, 2.0);
        assert_eq!(config.active_count(), 3);
    }

    #[test]
    fn pass_all_disables_everything() {
        let config = FilterConfig::pass_all();
        assert_eq!(config.active_count(), 0);
        assert_eq!(config.to_string(), "no active filters");
    }

    #[test]
    fn display_lists_active_filters() {
        let config = FilterConfig {
            use_volume: false,
            ..FilterConfig::default()
        };
        assert_eq!(config.to_string(), "RSI <= 30 • |EMA50 distance| <= 2.0%");
    }

    #[test]
    fn criterion_display() {
        assert_eq!(Criterion::EmaProximity.to_string(), "ema");
        assert_eq!(Criterion::VolumeTrend.to_string(), "volume");
    }
}
