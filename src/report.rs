use log::*;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    aggregator::{aggregate, Aggregation, DailyRevenue, ProductRevenue},
    currency::format_currency,
    error::SalesError,
    records::SaleRecord,
};

/// The final report of one run, handed over to whoever presents it
/// Never mutated once built: a filter change builds a new one
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct ReportBundle {
    pub records: Vec<SaleRecord>,
    /// Highest revenue first, ties ordered by product name
    pub by_product: Vec<ProductRevenue>,
    /// Oldest day first
    pub by_day: Vec<DailyRevenue>,
    pub max_product: ProductRevenue,
    pub min_product: ProductRevenue,
}

impl ReportBundle {
    pub fn total_revenue(&self) -> Decimal {
        self.by_product.iter().map(|p| p.total_revenue).sum()
    }

    pub fn total_quantity(&self) -> i64 {
        self.by_product.iter().map(|p| p.total_quantity).sum()
    }

    /// Average revenue per transaction (per record, not per unit)
    pub fn average_ticket(&self) -> Decimal {
        // a bundle always holds at least one record
        self.total_revenue() / Decimal::from(self.records.len())
    }

    pub fn product_count(&self) -> usize {
        self.by_product.len()
    }

    /// Prints the revenue per product and the extremes on stdout
    pub fn print_summary(&self) {
        println!("Revenue per product:");
        for product in &self.by_product {
            println!("  {:<24} {:>22}", product.product, format_currency(product.total_revenue));
        }
        println!();
        println!("Product with the highest revenue: {}", self.max_product.product);
        println!("Highest revenue: {}", format_currency(self.max_product.total_revenue));
        println!();
        println!("Product with the lowest revenue: {}", self.min_product.product);
        println!("Lowest revenue: {}", format_currency(self.min_product.total_revenue));
    }
}

/// Sorts the aggregates into the tables of a bundle
pub fn build_report(records: &[SaleRecord], aggregation: &Aggregation) -> ReportBundle {
    let mut by_product = aggregation.products().to_vec();
    by_product.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.product.cmp(&b.product))
    });

    // already ordered by date
    let by_day: Vec<DailyRevenue> = aggregation.days().collect();

    ReportBundle {
        records: records.to_vec(),
        by_product,
        by_day,
        max_product: aggregation.max_product().clone(),
        min_product: aggregation.min_product().clone(),
    }
}

/// Aggregates the records and builds their report
/// Call it again on a subset to get a filtered report
pub fn run_pipeline(records: &[SaleRecord]) -> Result<ReportBundle, SalesError> {
    let aggregation = aggregate(records)?;
    let bundle = build_report(records, &aggregation);
    info!(
        "Built report over {} records, {} products, {} days",
        bundle.records.len(),
        bundle.product_count(),
        bundle.by_day.len()
    );
    Ok(bundle)
}
