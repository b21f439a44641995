//! Synthetic sales, handy to try the report and the dashboard without real data.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use log::*;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::{export::write_records, records::SaleRecord, xlsx_report::write_records_workbook};

/// Car models on sale with their base price
pub const CATALOG: [(&str, i64); 8] = [
    ("Honda Civic", 120_000),
    ("Toyota Corolla", 115_000),
    ("Volkswagen Golf", 95_000),
    ("Hyundai HB20", 75_000),
    ("Fiat Pulse", 89_000),
    ("Jeep Compass", 150_000),
    ("Chevrolet Onix", 70_000),
    ("Ford Territory", 140_000),
];

const SALES_PER_DAY: std::ops::RangeInclusive<usize> = 3..=8;
const UNITS_PER_SALE: std::ops::RangeInclusive<i64> = 1..=3;
/// Prices move up to 5% around the base price, in millionths
const PRICE_FACTOR: std::ops::RangeInclusive<i64> = 950_000..=1_050_000;
const PRICE_FACTOR_SCALE: u32 = 6;

pub struct SalesGenerator {
    rng: StdRng,
}

impl SalesGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Sales for `days` consecutive days, the first one being `first_day`
    /// Stops early at the last representable date
    pub fn generate(&mut self, first_day: NaiveDate, days: u32) -> Vec<SaleRecord> {
        let mut records = Vec::new();
        for offset in 0..days {
            let date = match first_day.checked_add_signed(Duration::days(offset as i64)) {
                Some(date) => date,
                None => {
                    warn!("No date after {}, stopping after {} days", first_day, offset);
                    break;
                }
            };
            let sales = self.rng.gen_range(SALES_PER_DAY);
            for _ in 0..sales {
                records.push(self.sale(date));
            }
        }
        debug!("Generated {} sales over {} days", records.len(), days);
        records
    }

    fn sale(&mut self, date: NaiveDate) -> SaleRecord {
        let &(product, base_price) = CATALOG
            .choose(&mut self.rng)
            .unwrap_or(&CATALOG[0]);

        let factor = Decimal::new(self.rng.gen_range(PRICE_FACTOR), PRICE_FACTOR_SCALE);
        let unit_price = (Decimal::from(base_price) * factor).round_dp(2);

        SaleRecord::new(date, product, self.rng.gen_range(UNITS_PER_SALE), unit_price)
    }
}

/// Generates `days` days of sales ending yesterday and writes them at `path`
/// With `with_workbook` the same sales also go to an xlsx file next to it
pub fn generate_file<P: AsRef<Path>>(
    path: P,
    days: u32,
    seed: Option<u64>,
    with_workbook: bool,
) -> anyhow::Result<usize> {
    let path = path.as_ref();
    let today = chrono::Local::now().date_naive();
    let first_day = today
        .checked_sub_signed(Duration::days(days as i64))
        .with_context(|| format!("Cannot go {} days back from {}", days, today))?;

    let workbook = workbook_path(path);
    if with_workbook && workbook == path {
        anyhow::bail!("The workbook would overwrite {:?}, use another extension", path);
    }

    let records = SalesGenerator::new(seed).generate(first_day, days);

    let file = File::create(path).with_context(|| format!("Cannot create {:?}", path))?;
    write_records(&records, BufWriter::new(file))?;
    info!("Wrote {} synthetic sales to {:?}", records.len(), path);

    if with_workbook {
        write_records_workbook(&records, &workbook)?;
    }

    Ok(records.len())
}

/// `arquivo_vendas.csv` gives `arquivo_vendas.xlsx`
pub fn workbook_path(path: &Path) -> PathBuf {
    path.with_extension("xlsx")
}
