//! Vehicle sales analysis.
//!
//! Sale records are read from CSV ([`sales_reader`]), grouped by product and
//! by day ([`aggregator`]) and sorted into a [`report::ReportBundle`]. The
//! bundle is then rendered as a workbook ([`xlsx_report`]), a console summary
//! or an interactive dashboard ([`dashboard`], [`server`]).

pub mod aggregator;
pub mod app;
pub mod config;
pub mod currency;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod generator;
pub mod records;
pub mod report;
pub mod sales_reader;
pub mod server;
pub mod xlsx_report;
