use std::{net::SocketAddr, path::PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::dashboard::DashboardLayout;

/// Vehicle sales analysis: synthetic data, spreadsheet report and web dashboard
#[derive(Parser, Debug)]
#[command(name = "salesreport", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Writes a CSV of random vehicle sales
    Generate {
        /// Where to write the CSV
        #[arg(short, long, env = "SALES_INPUT", default_value = "arquivo_vendas.csv")]
        output: PathBuf,

        /// Number of days of sales, ending yesterday
        #[arg(short, long, default_value_t = 30)]
        days: u32,

        /// Seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,

        /// Also write the sales to an xlsx file next to the CSV
        #[arg(long)]
        xlsx: bool,
    },
    /// Aggregates a sales CSV into a spreadsheet report and prints a summary
    Report {
        /// Sales CSV, `-` reads from stdin
        #[arg(short, long, env = "SALES_INPUT", default_value = "arquivo_vendas.csv")]
        input: PathBuf,

        /// Where to write the workbook
        #[arg(short, long, env = "SALES_OUTPUT", default_value = "relatorio_vendas.xlsx")]
        output: PathBuf,

        /// Do not print the summary on stdout
        #[arg(short, long)]
        quiet: bool,
    },
    /// Serves the landing page and the interactive dashboard
    Serve {
        /// Sales CSV loaded once at startup
        #[arg(short, long, env = "SALES_INPUT", default_value = "arquivo_vendas.csv")]
        input: PathBuf,

        #[arg(short, long, env = "SALES_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Dashboard layout options
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Page title
    #[arg(long, env = "SALES_DASHBOARD_TITLE")]
    pub title: Option<String>,

    /// Centred column instead of the full page width
    #[arg(long)]
    pub centered: bool,

    /// Hide the filters sidebar
    #[arg(long)]
    pub no_sidebar: bool,

    /// Footer text
    #[arg(long)]
    pub footer: Option<String>,
}

impl LayoutArgs {
    pub fn into_layout(self) -> DashboardLayout {
        let defaults = DashboardLayout::default();
        DashboardLayout {
            title: self.title.unwrap_or(defaults.title),
            wide: !self.centered,
            show_sidebar: !self.no_sidebar,
            footer: self.footer.unwrap_or(defaults.footer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report() {
        let cli = Cli::try_parse_from([
            "salesreport",
            "report",
            "--input",
            "vendas.csv",
            "--output",
            "out.xlsx",
            "--quiet",
        ])
        .unwrap();

        match cli.command {
            Command::Report {
                input,
                output,
                quiet,
            } => {
                assert_eq!(input, PathBuf::from("vendas.csv"));
                assert_eq!(output, PathBuf::from("out.xlsx"));
                assert!(quiet);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_layout() {
        let cli = Cli::try_parse_from([
            "salesreport",
            "serve",
            "--input",
            "vendas.csv",
            "--bind",
            "0.0.0.0:3000",
            "--centered",
            "--title",
            "Vendas",
        ])
        .unwrap();

        match cli.command {
            Command::Serve { bind, layout, .. } => {
                assert_eq!(bind.port(), 3000);
                let layout = layout.into_layout();
                assert_eq!(layout.title, "Vendas");
                assert!(!layout.wide);
                assert!(layout.show_sidebar);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "salesreport",
            "generate",
            "--days",
            "7",
            "--seed",
            "3",
            "--xlsx",
        ])
        .unwrap();

        match cli.command {
            Command::Generate {
                days, seed, xlsx, ..
            } => {
                assert_eq!(days, 7);
                assert_eq!(seed, Some(3));
                assert!(xlsx);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
