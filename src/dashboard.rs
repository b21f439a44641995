//! Interactive dashboard over the sales records.
//!
//! Every filter change goes through the same pipeline as the batch report:
//! the records are narrowed down by a [`SalesFilter`] and a fresh
//! [`ReportBundle`] is built from the subset. One adapter serves every
//! page layout, the differences live in [`DashboardLayout`].

use std::collections::BTreeSet;

use anyhow::Context;
use chrono::NaiveDate;
use log::*;
use minijinja::{context, Environment};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    currency::{format_compact_currency, format_currency, format_units},
    records::{day_month_year, SaleRecord},
    report::{run_pipeline, ReportBundle},
};

const DASHBOARD_TEMPLATE: &str = "dashboard.html";
const LANDING_TEMPLATE: &str = "landing.html";

/// Cosmetic knobs of the dashboard page
#[derive(Serialize, Clone, Debug)]
pub struct DashboardLayout {
    pub title: String,
    /// Use the full page width instead of a centred column
    pub wide: bool,
    pub show_sidebar: bool,
    pub footer: String,
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self {
            title: "Dashboard de Vendas de Veículos".to_owned(),
            wide: true,
            show_sidebar: true,
            footer: "Análise de Vendas de Veículos".to_owned(),
        }
    }
}

/// Date range and product selection picked by the user
/// An unset bound is open, an empty selection keeps every product
#[derive(Clone, Default, PartialEq, Debug)]
pub struct SalesFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub products: BTreeSet<String>,
}

impl SalesFilter {
    /// Builds a filter out of `start`, `end` and repeated `product` parameters
    /// Dates are accepted as yyyy-mm-dd or dd/mm/yyyy, blank values are ignored
    pub fn from_query(pairs: &[(String, String)]) -> anyhow::Result<Self> {
        let mut filter = SalesFilter::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "start" => filter.start = Some(parse_date(value)?),
                "end" => filter.end = Some(parse_date(value)?),
                "product" => {
                    filter.products.insert(value.to_owned());
                }
                other => debug!("Ignoring unknown dashboard parameter {:?}", other),
            }
        }
        Ok(filter)
    }

    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.start.map_or(true, |start| record.date >= start)
            && self.end.map_or(true, |end| record.date <= end)
            && (self.products.is_empty() || self.products.contains(&record.product))
    }

    /// The records kept by the filter, in input order
    pub fn apply(&self, records: &[SaleRecord]) -> Vec<SaleRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    day_month_year::parse(value).with_context(|| format!("Invalid date {:?}", value))
}

/// The four figures shown on top of the dashboard
#[derive(Serialize, PartialEq, Debug)]
pub struct Metrics {
    pub total_units: String,
    pub total_revenue: String,
    pub average_ticket: String,
    pub product_count: String,
}

impl Metrics {
    pub fn from_bundle(bundle: &ReportBundle) -> Self {
        Self {
            total_units: format_units(bundle.total_quantity()),
            total_revenue: format_compact_currency(bundle.total_revenue()),
            average_ticket: format_compact_currency(bundle.average_ticket()),
            product_count: bundle.product_count().to_string(),
        }
    }
}

#[derive(Serialize, Default, Debug)]
struct LineSeries {
    x: Vec<String>,
    y: Vec<f64>,
}

#[derive(Serialize, Default, Debug)]
struct ShareSeries {
    labels: Vec<String>,
    values: Vec<f64>,
}

#[derive(Serialize, Default, Debug)]
struct BarSeries {
    labels: Vec<String>,
    values: Vec<f64>,
    text: Vec<String>,
}

/// Series fed to the charts on the page
#[derive(Serialize, Default, Debug)]
struct Charts {
    daily: LineSeries,
    share: ShareSeries,
    ranking: BarSeries,
}

impl Charts {
    fn from_bundle(bundle: &ReportBundle) -> Self {
        let daily = LineSeries {
            x: bundle.by_day.iter().map(|d| d.date.to_string()).collect(),
            y: bundle.by_day.iter().map(|d| to_number(d.total_revenue)).collect(),
        };
        let share = ShareSeries {
            labels: bundle.by_product.iter().map(|p| p.product.clone()).collect(),
            values: bundle.by_product.iter().map(|p| to_number(p.total_revenue)).collect(),
        };
        let ranking = BarSeries {
            labels: share.labels.clone(),
            values: share.values.clone(),
            text: bundle
                .by_product
                .iter()
                .map(|p| format_currency(p.total_revenue))
                .collect(),
        };
        Self {
            daily,
            share,
            ranking,
        }
    }
}

fn to_number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[derive(Serialize, Debug)]
struct RankingRow {
    product: String,
    revenue: String,
    quantity: String,
}

#[derive(Serialize, Debug)]
struct RawRow {
    date: String,
    product: String,
    quantity: String,
    unit_price: String,
    revenue: String,
}

#[derive(Serialize, Debug)]
struct ProductOption {
    name: String,
    selected: bool,
}

/// Filter form state, always showing the effective bounds
#[derive(Serialize, Debug)]
struct FilterForm {
    start: String,
    end: String,
    products: Vec<ProductOption>,
}

impl FilterForm {
    fn new(records: &[SaleRecord], filter: &SalesFilter) -> Self {
        let first = records.iter().map(|r| r.date).min();
        let last = records.iter().map(|r| r.date).max();
        let iso = |date: Option<NaiveDate>| date.map(|d| d.to_string()).unwrap_or_default();

        // product options keep the order in which products first appear
        let mut seen = BTreeSet::new();
        let products = records
            .iter()
            .filter(|r| seen.insert(r.product.as_str()))
            .map(|r| ProductOption {
                name: r.product.clone(),
                selected: filter.products.is_empty() || filter.products.contains(&r.product),
            })
            .collect();

        Self {
            start: iso(filter.start.or(first)),
            end: iso(filter.end.or(last)),
            products,
        }
    }
}

/// Links rendered on the pages
#[derive(Serialize, Clone, Debug)]
pub struct Routes {
    pub dashboard: String,
    pub export: String,
    pub workbook: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            dashboard: "/dashboard".to_owned(),
            export: "/export.csv".to_owned(),
            workbook: "/report.xlsx".to_owned(),
        }
    }
}

/// Renders dashboard pages for one layout
pub struct Dashboard {
    templates: Environment<'static>,
    layout: DashboardLayout,
    routes: Routes,
}

impl Dashboard {
    pub fn new(layout: DashboardLayout, routes: Routes) -> anyhow::Result<Self> {
        let mut templates = Environment::new();
        templates
            .add_template(DASHBOARD_TEMPLATE, include_str!("../templates/dashboard.html"))
            .context("Cannot load the dashboard template")?;
        templates
            .add_template(LANDING_TEMPLATE, include_str!("../templates/landing.html"))
            .context("Cannot load the landing template")?;

        Ok(Self {
            templates,
            layout,
            routes,
        })
    }

    pub fn layout(&self) -> &DashboardLayout {
        &self.layout
    }

    /// Renders the dashboard for the records kept by `filter`
    /// An empty selection gives the empty-state page instead of an error
    pub fn render(&self, records: &[SaleRecord], filter: &SalesFilter) -> anyhow::Result<String> {
        let selected = filter.apply(records);
        debug!("Dashboard filter {:?} kept {} records", filter, selected.len());

        let bundle = match run_pipeline(&selected) {
            Ok(bundle) => Some(bundle),
            Err(err) if err.is_empty_dataset() => {
                info!("No sales left after filtering, rendering the empty state");
                None
            }
            Err(err) => return Err(err).context("Cannot build the dashboard report"),
        };

        let metrics = bundle.as_ref().map(Metrics::from_bundle);
        let charts = bundle.as_ref().map(Charts::from_bundle).unwrap_or_default();
        let ranking: Vec<RankingRow> = bundle
            .iter()
            .flat_map(|b| &b.by_product)
            .map(|p| RankingRow {
                product: p.product.clone(),
                revenue: format_currency(p.total_revenue),
                quantity: format_units(p.total_quantity),
            })
            .collect();
        let rows: Vec<RawRow> = selected
            .iter()
            .map(|r| RawRow {
                date: r.date.format(day_month_year::FORMAT).to_string(),
                product: r.product.clone(),
                quantity: format_units(r.quantity),
                unit_price: format_currency(r.unit_price),
                revenue: format_currency(r.revenue()),
            })
            .collect();

        let template = self.templates.get_template(DASHBOARD_TEMPLATE)?;
        let page = template
            .render(context! {
                layout => &self.layout,
                dashboard_path => &self.routes.dashboard,
                export_path => &self.routes.export,
                workbook_path => &self.routes.workbook,
                filter => FilterForm::new(records, filter),
                metrics => metrics,
                charts => charts,
                ranking => ranking,
                rows => rows,
            })
            .context("Cannot render the dashboard")?;
        Ok(page)
    }

    /// Static page pointing at the dashboard
    pub fn render_landing(&self) -> anyhow::Result<String> {
        let template = self.templates.get_template(LANDING_TEMPLATE)?;
        let page = template
            .render(context! {
                title => &self.layout.title,
                dashboard_url => &self.routes.dashboard,
            })
            .context("Cannot render the landing page")?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::sales_reader::read_from_csv;

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(DashboardLayout::default(), Routes::default()).unwrap()
    }

    #[test]
    fn test_filter_from_query() {
        let filter = SalesFilter::from_query(&query(&[
            ("start", "2024-01-02"),
            ("end", "31/01/2024"),
            ("product", "A"),
            ("product", "B"),
            ("product", ""),
            ("page", "1"),
        ]))
        .unwrap();

        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(filter.end, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(filter.products.len(), 2);
    }

    #[test]
    fn test_filter_rejects_bad_dates() {
        assert!(SalesFilter::from_query(&query(&[("start", "yesterday")])).is_err());
    }

    #[test]
    fn test_filter_by_day_and_product() {
        let records = read_from_csv("tests/data/test_basic.csv").unwrap();

        let mut filter = SalesFilter::default();
        assert_eq!(filter.apply(&records).len(), 3);

        filter.start = NaiveDate::from_ymd_opt(2024, 1, 2);
        let kept = filter.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].product, "A");

        filter.start = None;
        filter.products.insert("B".to_owned());
        let kept = filter.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].unit_price, dec!(50.0));
    }

    #[test]
    fn test_range_without_records_has_no_report() {
        let records = read_from_csv("tests/data/test_basic.csv").unwrap();
        let filter = SalesFilter {
            start: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..SalesFilter::default()
        };

        let result = run_pipeline(&filter.apply(&records));
        assert!(result.unwrap_err().is_empty_dataset());
    }

    #[test]
    fn test_metrics() {
        let records = read_from_csv("tests/data/test_basic.csv").unwrap();
        let bundle = run_pipeline(&records).unwrap();

        let metrics = Metrics::from_bundle(&bundle);
        assert_eq!(metrics.total_units, "4");
        assert_eq!(metrics.total_revenue, "R$350.00");
        assert_eq!(metrics.average_ticket, "R$116.67");
        assert_eq!(metrics.product_count, "2");
    }

    #[test]
    fn test_render_dashboard() {
        let records = read_from_csv("tests/data/test_legacy_headers.csv").unwrap();
        let page = dashboard().render(&records, &SalesFilter::default()).unwrap();

        assert!(page.contains("Dashboard de Vendas de Veículos"));
        assert!(page.contains("Faturamento Total"));
        assert!(page.contains("Jeep Compass"));
        assert!(page.contains("value=\"2024-12-18\""));
        // links are html-escaped, slashes included
        assert!(page.contains("export.csv"));
    }

    #[test]
    fn test_render_empty_state() {
        let records = read_from_csv("tests/data/test_basic.csv").unwrap();
        let filter = SalesFilter {
            end: NaiveDate::from_ymd_opt(2023, 12, 31),
            ..SalesFilter::default()
        };

        let page = dashboard().render(&records, &filter).unwrap();
        assert!(page.contains("Nenhuma venda encontrada"));
        assert!(!page.contains("Ticket Médio"));
    }

    #[test]
    fn test_product_names_are_escaped() {
        let records = vec![SaleRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "<script>alert(1)</script>",
            1,
            dec!(10),
        )];
        let page = dashboard().render(&records, &SalesFilter::default()).unwrap();
        assert!(!page.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_layout_changes_the_page() {
        let records = read_from_csv("tests/data/test_basic.csv").unwrap();
        let layout = DashboardLayout {
            title: "Vendas".to_owned(),
            wide: false,
            show_sidebar: false,
            footer: "rodapé".to_owned(),
        };
        let page = Dashboard::new(layout, Routes::default())
            .unwrap()
            .render(&records, &SalesFilter::default())
            .unwrap();

        assert!(page.contains("<h1>Vendas</h1>"));
        assert!(page.contains("960px"));
        assert!(!page.contains("<aside>"));
    }

    #[test]
    fn test_render_landing() {
        let page = dashboard().render_landing().unwrap();
        assert!(page.contains("Acessar Dashboard"));
        assert!(page.contains("dashboard\" class=\"btn\""));
    }
}
