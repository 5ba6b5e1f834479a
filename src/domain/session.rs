//! Application session: the latest result set, the single active selection
//! and its detail view.
//!
//! A new scan replaces the results and drops the selection. A new selection
//! replaces the previous one and invalidates any detail still being loaded
//! for it, which is what [`SelectionToken`] guards.

use crate::domain::detail::DetailSeries;
use crate::domain::error::SamscreenError;
use crate::domain::filter::FilterConfig;
use crate::domain::result_set::ResultSet;

/// Identifies one selection. Stale tokens cannot install a detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionToken(u64);

/// What the presenter should show.
#[derive(Debug)]
pub enum SessionView<'a> {
    /// No scan has run yet.
    Idle,
    /// The last scan finished with zero matches.
    NoMatches { filters: &'a FilterConfig },
    Results {
        results: &'a ResultSet,
        filters: &'a FilterConfig,
        selected: Option<&'a str>,
        detail: Option<&'a DetailSeries>,
    },
}

#[derive(Debug, Default)]
pub struct Session {
    scan: Option<(ResultSet, FilterConfig)>,
    selected: Option<String>,
    detail: Option<DetailSeries>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> SelectionToken {
        self.generation += 1;
        SelectionToken(self.generation)
    }

    /// Replace the previous scan's results; any selection is cleared.
    pub fn replace_results(&mut self, results: ResultSet, filters: FilterConfig) {
        self.scan = Some((results, filters));
        self.selected = None;
        self.detail = None;
        self.bump();
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.scan.as_ref().map(|(r, _)| r)
    }

    /// Filters the current results were produced with.
    pub fn filters(&self) -> Option<&FilterConfig> {
        self.scan.as_ref().map(|(_, f)| f)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn detail(&self) -> Option<&DetailSeries> {
        self.detail.as_ref()
    }

    /// Select one row of the current result set, replacing any previous selection.
    pub fn select(&mut self, ticker: &str) -> Result<SelectionToken, SamscreenError> {
        let known = self
            .results()
            .is_some_and(|results| results.get(ticker).is_some());
        if !known {
            return Err(SamscreenError::UnknownTicker {
                code: ticker.to_string(),
            });
        }
        self.selected = Some(ticker.to_string());
        self.detail = None;
        Ok(self.bump())
    }

    pub fn is_current(&self, token: SelectionToken) -> bool {
        token.0 == self.generation
    }

    /// Install the detail for `token`'s selection. Returns `false` and drops
    /// the detail when a newer scan or selection has happened since.
    pub fn install_detail(&mut self, token: SelectionToken, detail: DetailSeries) -> bool {
        let matches_selection = self.selected.as_deref() == Some(detail.ticker.as_str());
        if !self.is_current(token) || !matches_selection {
            return false;
        }
        self.detail = Some(detail);
        true
    }

    pub fn view(&self) -> SessionView<'_> {
        match &self.scan {
            None => SessionView::Idle,
            Some((results, filters)) if results.is_empty() => SessionView::NoMatches { filters },
            Some((results, filters)) => SessionView::Results {
                results,
                filters,
                selected: self.selected.as_deref(),
                detail: self.detail.as_ref(),
            },
        }
    }
}
