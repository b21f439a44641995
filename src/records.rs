use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents one sale line in our CSV
/// The Portuguese headers of older exports are accepted as aliases
#[derive(Deserialize, Serialize, Clone, PartialEq, Debug)]
pub struct SaleRecord {
    /// Day of the sale, written as dd/mm/yyyy
    #[serde(alias = "data", with = "day_month_year")]
    pub date: NaiveDate,
    /// Product name, free text
    #[serde(alias = "produto")]
    pub product: String,
    /// Units sold. Signed so that a negative count parses and gets rejected by validation
    #[serde(alias = "quantidade")]
    pub quantity: i64,
    /// Price of a single unit
    #[serde(alias = "preco_unitario", with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
}

impl SaleRecord {
    pub fn new(
        date: NaiveDate,
        product: impl Into<String>,
        quantity: i64,
        unit_price: Decimal,
    ) -> Self {
        Self {
            date,
            product: product.into(),
            quantity,
            unit_price,
        }
    }

    /// Revenue of this line, never read from the input
    /// Only call it on a record that passed `validate`
    pub fn revenue(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    /// `None` when quantity times price does not fit a `Decimal`
    pub fn checked_revenue(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }

    /// Checks `quantity >= 1`, `unit_price >= 0` and that the revenue can be computed
    /// Returns the reason of the failure otherwise
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity < 1 {
            return Err(format!(
                "quantity must be at least 1, got {} for {:?}",
                self.quantity, self.product
            ));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(format!(
                "unit price must not be negative, got {} for {:?}",
                self.unit_price, self.product
            ));
        }
        if self.checked_revenue().is_none() {
            return Err(format!(
                "revenue overflows: {} x {} for {:?}",
                self.quantity, self.unit_price, self.product
            ));
        }
        Ok(())
    }
}

/// A record together with its derived revenue, the shape written to exports
#[derive(Serialize, Debug)]
pub struct RevenueRow<'a> {
    #[serde(with = "day_month_year")]
    pub date: NaiveDate,
    pub product: &'a str,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub revenue: Decimal,
}

impl<'a> From<&'a SaleRecord> for RevenueRow<'a> {
    fn from(record: &'a SaleRecord) -> Self {
        Self {
            date: record.date,
            product: &record.product,
            quantity: record.quantity,
            unit_price: record.unit_price,
            revenue: record.revenue(),
        }
    }
}

/// (De)serializes dates as dd/mm/yyyy, also accepting ISO dates on input
pub mod day_month_year {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d/%m/%Y";

    pub fn parse(text: &str) -> Result<NaiveDate, chrono::ParseError> {
        let text = text.trim();
        NaiveDate::parse_from_str(text, FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(|err| {
            serde::de::Error::custom(format!("invalid date {:?} ({})", text, err))
        })
    }
}
