//! Concrete adapter implementations for ports.

pub mod chart_svg;
pub mod console_table;
pub mod constituents_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod html_report_adapter;
pub mod presentation;
#[cfg(feature = "web")]
pub mod web;
#[cfg(feature = "http")]
pub mod yahoo_adapter;
