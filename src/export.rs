/// Writes sale records back to CSV
use std::io::Write;

use crate::records::{RevenueRow, SaleRecord};

/// Writes the records in the input format, readable again by `sales_reader`
pub fn write_records<W: Write>(records: &[SaleRecord], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the records with their derived revenue as an extra column
pub fn write_records_with_revenue<W: Write>(records: &[SaleRecord], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(RevenueRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}
