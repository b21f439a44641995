use clap::Parser;
use log::*;

use salesreport::{
    app::SalesApp,
    config::{Cli, Command},
    generator,
    sales_reader::BulkReader,
};

fn main() {
    // a missing .env file is fine, the environment and the flags still apply
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    if let Err(err) = run(cli.command) {
        error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Generate {
            output,
            days,
            seed,
            xlsx,
        } => {
            info!("Generating {} days of sales into {:?}", days, output);
            let written = generator::generate_file(&output, days, seed, xlsx)?;
            println!("File {:?} was created with {} sales!", output, written);
            if xlsx {
                println!("File {:?} was created too!", generator::workbook_path(&output));
            }
        }
        Command::Report {
            input,
            output,
            quiet,
        } => {
            SalesApp::run_report(input, output, BulkReader::new(), !quiet)?;
        }
        Command::Serve {
            input,
            bind,
            layout,
        } => {
            SalesApp::run_dashboard(input, BulkReader::new(), bind, layout.into_layout())?;
        }
    }
    Ok(())
}
