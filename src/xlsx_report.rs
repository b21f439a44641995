//! Spreadsheet rendition of a report: a summary sheet, a ranking sheet
//! and the raw records with their revenue.
//! The raw records sheet also serves on its own for generated data.

use std::path::Path;

use anyhow::Context;
use log::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook, Worksheet, XlsxError};

use crate::{
    currency::format_currency,
    records::{day_month_year, SaleRecord},
    report::ReportBundle,
};

pub const SUMMARY_SHEET: &str = "Resumo";
pub const RANKING_SHEET: &str = "Faturamento por Produto";
pub const RAW_DATA_SHEET: &str = "Dados Brutos";

const HEADER_FILL: u32 = 0xE0E0E0;
const WIDE_COLUMN: f64 = 35.0;
const NARROW_COLUMN: f64 = 15.0;
const MONEY_FORMAT: &str = "\"R$\" #,##0.00";

struct Styles {
    title: Format,
    header: Format,
    money: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_align(FormatAlign::Center),
            header: Format::new()
                .set_bold()
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(HEADER_FILL)),
            money: Format::new().set_num_format(MONEY_FORMAT),
        }
    }
}

/// Writes the workbook of `bundle` at `path`
pub fn write_workbook<P: AsRef<Path>>(bundle: &ReportBundle, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut workbook = build_workbook(bundle).context("Cannot lay out the workbook")?;
    workbook
        .save(path)
        .with_context(|| format!("Cannot save the workbook to {:?}", path))?;
    info!("Workbook written to {:?}", path);
    Ok(())
}

/// Same workbook as `write_workbook`, kept in memory
pub fn workbook_to_buffer(bundle: &ReportBundle) -> anyhow::Result<Vec<u8>> {
    let mut workbook = build_workbook(bundle).context("Cannot lay out the workbook")?;
    let buffer = workbook
        .save_to_buffer()
        .context("Cannot serialize the workbook")?;
    Ok(buffer)
}

/// A workbook with only the raw records sheet, no aggregation involved
pub fn write_records_workbook<P: AsRef<Path>>(
    records: &[SaleRecord],
    path: P,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut workbook = Workbook::new();
    write_raw_data(workbook.add_worksheet(), records, &Styles::new())
        .context("Cannot lay out the workbook")?;
    workbook
        .save(path)
        .with_context(|| format!("Cannot save the workbook to {:?}", path))?;
    info!("{} records written to {:?}", records.len(), path);
    Ok(())
}

fn build_workbook(bundle: &ReportBundle) -> Result<Workbook, XlsxError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();

    write_summary(workbook.add_worksheet(), bundle, &styles)?;
    write_ranking(workbook.add_worksheet(), bundle, &styles)?;
    write_raw_data(workbook.add_worksheet(), &bundle.records, &styles)?;

    Ok(workbook)
}

/// Human readable summary, two columns: label and value
fn write_summary(
    sheet: &mut Worksheet,
    bundle: &ReportBundle,
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.set_name(SUMMARY_SHEET)?;
    sheet.set_column_width(0, WIDE_COLUMN)?;
    sheet.set_column_width(1, WIDE_COLUMN)?;

    sheet.merge_range(0, 0, 0, 1, "Resumo de Vendas", &styles.title)?;

    let mut row = 2;
    sheet.write_string_with_format(row, 0, "Faturamento por Produto:", &styles.header)?;
    for product in &bundle.by_product {
        row += 1;
        sheet.write_string(row, 0, format!("- {}", product.product))?;
        sheet.write_string(row, 1, format_currency(product.total_revenue))?;
    }

    // one blank row between sections
    row = write_highlight(
        sheet,
        row + 2,
        "Produto com Maior Faturamento:",
        &bundle.max_product.product,
        bundle.max_product.total_revenue,
        styles,
    )?;
    write_highlight(
        sheet,
        row + 2,
        "Produto com Menor Faturamento:",
        &bundle.min_product.product,
        bundle.min_product.total_revenue,
        styles,
    )?;

    Ok(())
}

/// Writes a "label: product / Valor: amount" pair, returns the last row used
fn write_highlight(
    sheet: &mut Worksheet,
    row: u32,
    label: &str,
    product: &str,
    revenue: Decimal,
    styles: &Styles,
) -> Result<u32, XlsxError> {
    sheet.write_string_with_format(row, 0, label, &styles.header)?;
    sheet.write_string(row, 1, product)?;
    sheet.write_string(row + 1, 0, "Valor:")?;
    sheet.write_string(row + 1, 1, format_currency(revenue))?;
    Ok(row + 1)
}

fn write_ranking(
    sheet: &mut Worksheet,
    bundle: &ReportBundle,
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.set_name(RANKING_SHEET)?;
    sheet.set_column_width(0, WIDE_COLUMN)?;
    sheet.set_column_width(1, WIDE_COLUMN)?;

    sheet.write_string_with_format(0, 0, "Produto", &styles.header)?;
    sheet.write_string_with_format(0, 1, "Faturamento", &styles.header)?;

    for (row, product) in (1u32..).zip(&bundle.by_product) {
        sheet.write_string(row, 0, &product.product)?;
        sheet.write_number_with_format(row, 1, to_number(product.total_revenue), &styles.money)?;
    }

    Ok(())
}

fn write_raw_data(
    sheet: &mut Worksheet,
    records: &[SaleRecord],
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.set_name(RAW_DATA_SHEET)?;

    let headers = ["data", "produto", "quantidade", "preco_unitario", "faturamento"];
    for (col, header) in (0u16..).zip(headers) {
        sheet.set_column_width(col, NARROW_COLUMN)?;
        sheet.write_string_with_format(0, col, header, &styles.header)?;
    }

    for (row, record) in (1u32..).zip(records) {
        sheet.write_string(row, 0, record.date.format(day_month_year::FORMAT).to_string())?;
        sheet.write_string(row, 1, &record.product)?;
        sheet.write_number(row, 2, record.quantity as f64)?;
        sheet.write_number_with_format(row, 3, to_number(record.unit_price), &styles.money)?;
        sheet.write_number_with_format(row, 4, to_number(record.revenue()), &styles.money)?;
    }

    Ok(())
}

/// Cells only hold floats, the exact amount stays in the bundle
fn to_number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_else(|| {
        warn!("Amount {} does not fit a spreadsheet cell", value);
        f64::NAN
    })
}
