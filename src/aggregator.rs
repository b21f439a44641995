use std::collections::BTreeMap;

use chrono::NaiveDate;
use hashbrown::HashMap;
use log::*;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{error::SalesError, records::SaleRecord};

/// Revenue and units summed over every record of one product
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct ProductRevenue {
    pub product: String,
    pub total_revenue: Decimal,
    pub total_quantity: i64,
}

impl ProductRevenue {
    fn new(product: &str) -> Self {
        Self {
            product: product.to_owned(),
            total_revenue: Decimal::ZERO,
            total_quantity: 0,
        }
    }

    fn add(&mut self, record: &SaleRecord) {
        self.total_revenue += record.revenue();
        self.total_quantity += record.quantity;
    }
}

/// Revenue summed over every record of one day
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub total_revenue: Decimal,
}

/// Everything the aggregation pass computes over a list of records
#[derive(Clone, PartialEq, Debug)]
pub struct Aggregation {
    /// One entry per distinct product, in order of first occurrence
    by_product: Vec<ProductRevenue>,
    /// Position of each product in `by_product`
    index: HashMap<String, usize>,
    /// One entry per distinct day
    by_day: BTreeMap<NaiveDate, Decimal>,
    max_product: usize,
    min_product: usize,
}

impl Aggregation {
    pub fn product(&self, name: &str) -> Option<&ProductRevenue> {
        self.index.get(name).map(|&position| &self.by_product[position])
    }

    pub fn products(&self) -> &[ProductRevenue] {
        &self.by_product
    }

    pub fn day(&self, date: NaiveDate) -> Option<Decimal> {
        self.by_day.get(&date).copied()
    }

    pub fn days(&self) -> impl Iterator<Item = DailyRevenue> + '_ {
        self.by_day.iter().map(|(&date, &total_revenue)| DailyRevenue {
            date,
            total_revenue,
        })
    }

    /// Product with the highest revenue, the first one seen wins a tie
    pub fn max_product(&self) -> &ProductRevenue {
        &self.by_product[self.max_product]
    }

    /// Product with the lowest revenue, the first one seen wins a tie
    pub fn min_product(&self) -> &ProductRevenue {
        &self.by_product[self.min_product]
    }
}

/// Groups the records by product and by day
/// Fails on the first record breaking the quantity/price invariants
/// or pushing the totals out of range,
/// and on an empty list, since there would be no extremes to report
pub fn aggregate(records: &[SaleRecord]) -> Result<Aggregation, SalesError> {
    if records.is_empty() {
        return Err(SalesError::EmptyDataset);
    }

    let mut by_product: Vec<ProductRevenue> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    // every per-product and per-day sum is bounded by these two
    let mut total_revenue = Decimal::ZERO;
    let mut total_quantity: i64 = 0;

    for (position, record) in records.iter().enumerate() {
        let row = position as u64 + 1;
        record
            .validate()
            .map_err(|reason| SalesError::invalid(row, reason))?;
        total_revenue = total_revenue
            .checked_add(record.revenue())
            .ok_or_else(|| SalesError::invalid(row, "revenue overflows"))?;
        total_quantity = total_quantity
            .checked_add(record.quantity)
            .ok_or_else(|| SalesError::invalid(row, "quantity overflows"))?;

        trace!("Aggregating record {:?}", record);
        let slot = match index.get(record.product.as_str()) {
            Some(&slot) => slot,
            None => {
                index.insert(record.product.clone(), by_product.len());
                by_product.push(ProductRevenue::new(&record.product));
                by_product.len() - 1
            }
        };
        by_product[slot].add(record);

        *by_day.entry(record.date).or_insert(Decimal::ZERO) += record.revenue();
    }

    // strict comparisons keep the earliest product on ties
    let mut max_product = 0;
    let mut min_product = 0;
    for (slot, product) in by_product.iter().enumerate() {
        if product.total_revenue > by_product[max_product].total_revenue {
            max_product = slot;
        }
        if product.total_revenue < by_product[min_product].total_revenue {
            min_product = slot;
        }
    }

    debug!(
        "Aggregated {} records into {} products over {} days, {} in total",
        records.len(),
        by_product.len(),
        by_day.len(),
        total_revenue
    );

    Ok(Aggregation {
        by_product,
        index,
        by_day,
        max_product,
        min_product,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::sales_reader::{read_from_csv, read_from_reader};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    /* The reference scenario:
        A sells 2 x 100 then 1 x 100, B sells 1 x 50
        A = 300, B = 50, day 1 = 250, day 2 = 100
    */
    #[test]
    fn test_basic_scenario() {
        let records = read_from_csv("tests/data/test_basic.csv").unwrap();
        let aggregation = aggregate(&records).unwrap();

        let a = aggregation.product("A").unwrap();
        assert_eq!(a.total_revenue, dec!(300.0));
        assert_eq!(a.total_quantity, 3);
        assert_eq!(aggregation.product("B").unwrap().total_revenue, dec!(50.0));
        assert!(aggregation.product("C").is_none());

        assert_eq!(aggregation.max_product().product, "A");
        assert_eq!(aggregation.min_product().product, "B");

        assert_eq!(aggregation.day(day(1)), Some(dec!(250.0)));
        assert_eq!(aggregation.day(day(2)), Some(dec!(100.0)));
        assert_eq!(aggregation.days().count(), 2);
    }

    #[test]
    fn test_revenue_is_conserved() {
        let records = read_from_csv("tests/data/test_legacy_headers.csv").unwrap();
        let aggregation = aggregate(&records).unwrap();

        let expected: Decimal = records.iter().map(SaleRecord::revenue).sum();
        let by_product: Decimal = aggregation.products().iter().map(|p| p.total_revenue).sum();
        let by_day: Decimal = aggregation.days().map(|d| d.total_revenue).sum();

        assert_eq!(by_product, expected);
        assert_eq!(by_day, expected);
    }

    #[test]
    fn test_extremes_bound_every_product() {
        let records = read_from_csv("tests/data/test_legacy_headers.csv").unwrap();
        let aggregation = aggregate(&records).unwrap();

        for product in aggregation.products() {
            assert!(aggregation.max_product().total_revenue >= product.total_revenue);
            assert!(aggregation.min_product().total_revenue <= product.total_revenue);
        }
        assert_eq!(aggregation.max_product().product, "Honda Civic");
        assert_eq!(aggregation.min_product().product, "Hyundai HB20");
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        // Zeta and Alpha both make 100, Mid and Beta both make 75
        let records = read_from_csv("tests/data/test_ties.csv").unwrap();
        let aggregation = aggregate(&records).unwrap();

        assert_eq!(aggregation.max_product().product, "Zeta");
        assert_eq!(aggregation.min_product().product, "Mid");
    }

    #[test]
    fn test_products_follow_first_occurrence() {
        let records = read_from_csv("tests/data/test_ties.csv").unwrap();
        let aggregation = aggregate(&records).unwrap();

        let names: Vec<&str> = aggregation
            .products()
            .iter()
            .map(|p| p.product.as_str())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid", "Beta"]);
    }

    #[test]
    fn test_empty_input() {
        let result = aggregate(&[]);
        assert!(matches!(result, Err(SalesError::EmptyDataset)));
    }

    #[test]
    fn test_zero_quantity_halts_aggregation() {
        let records = vec![
            SaleRecord::new(day(1), "A", 2, dec!(100)),
            SaleRecord::new(day(1), "B", 0, dec!(50)),
            SaleRecord::new(day(2), "A", 1, dec!(100)),
        ];

        match aggregate(&records) {
            Err(SalesError::InvalidRecord { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected an invalid record, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let records = vec![SaleRecord::new(day(1), "A", 1, dec!(-1))];
        assert!(matches!(
            aggregate(&records),
            Err(SalesError::InvalidRecord { row: 1, .. })
        ));
    }

    #[test]
    fn test_oversized_revenue_is_rejected() {
        let records = vec![
            SaleRecord::new(day(1), "A", 1, dec!(10)),
            SaleRecord::new(day(1), "B", 1_000_000_000_000_000_000, dec!(1000000000000)),
        ];

        match aggregate(&records) {
            Err(SalesError::InvalidRecord { row, reason }) => {
                assert_eq!(row, 2);
                assert!(reason.starts_with("revenue overflows"));
            }
            other => panic!("expected an invalid record, got {:?}", other),
        }
    }

    #[test]
    fn test_revenue_sum_out_of_range_is_rejected() {
        // each line fits on its own, two of them do not
        let price = dec!(5000000000);
        let records = vec![
            SaleRecord::new(day(1), "A", i64::MAX, price),
            SaleRecord::new(day(2), "A", i64::MAX, price),
        ];
        assert!(records.iter().all(|r| r.validate().is_ok()));

        assert!(matches!(
            aggregate(&records),
            Err(SalesError::InvalidRecord { row: 2, .. })
        ));
    }

    #[test]
    fn test_quantity_sum_out_of_range_is_rejected() {
        let data = "date,product,quantity,unit_price\n\
                    01/01/2024,A,9223372036854775807,0\n\
                    02/01/2024,A,9223372036854775807,0\n";
        let records = read_from_reader(data.as_bytes()).unwrap();

        match aggregate(&records) {
            Err(SalesError::InvalidRecord { row, reason }) => {
                assert_eq!(row, 2);
                assert_eq!(reason, "quantity overflows");
            }
            other => panic!("expected an invalid record, got {:?}", other),
        }
    }
}
