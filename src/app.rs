use std::path::Path;

use anyhow::Context;
use log::*;

use crate::{
    dashboard::DashboardLayout,
    records::SaleRecord,
    report::{run_pipeline, ReportBundle},
    sales_reader::{read_from_reader, SalesCSVReader, STDIN_PATH},
    server::{self, AppState},
    xlsx_report::write_workbook,
};

/// The main application
pub struct SalesApp {}

impl SalesApp {
    /// Loads the records at `path`, `-` meaning stdin
    /// an abstract implementation of the CSV reader is used so that
    /// tests and other sources can plug their own
    pub fn load<P: AsRef<Path>>(
        path: P,
        reader: &impl SalesCSVReader,
    ) -> anyhow::Result<Vec<SaleRecord>> {
        let path = path.as_ref();
        let records = if path == Path::new(STDIN_PATH) {
            read_from_reader(std::io::stdin().lock())
        } else {
            reader.read_csv(path)
        };
        records.with_context(|| format!("Cannot load sales from {:?}", path))
    }

    /// Runs the batch report for the file in `path`:
    /// aggregates, writes the workbook at `output` and prints a summary
    pub fn run_report<P: AsRef<Path>, O: AsRef<Path>>(
        path: P,
        output: O,
        reader: impl SalesCSVReader,
        report_results: bool,
    ) -> anyhow::Result<ReportBundle> {
        let records = Self::load(path, &reader)?;
        let bundle = run_pipeline(&records).context("Cannot build the sales report")?;

        write_workbook(&bundle, output.as_ref())?;
        println!("File {:?} was created successfully!", output.as_ref());

        if report_results {
            println!();
            bundle.print_summary();
        }

        Ok(bundle)
    }

    /// Loads the records once and serves the dashboard over them
    pub fn run_dashboard<P: AsRef<Path>>(
        path: P,
        reader: impl SalesCSVReader,
        bind: std::net::SocketAddr,
        layout: DashboardLayout,
    ) -> anyhow::Result<()> {
        let records = Self::load(path, &reader)?;
        if records.is_empty() {
            warn!("The sales file is empty, the dashboard will only show its empty state");
        }
        let state = AppState::new(records, layout)?;

        // one thread is plenty, every request is a short synchronous computation
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Cannot start the async runtime")?;
        runtime.block_on(server::serve(state, bind))
    }
}
