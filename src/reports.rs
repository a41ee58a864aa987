use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::aggregate::{group_by_date, sum_by_key, DateBucket, DateBuckets};
use crate::api::{self, RevenueEndpoint};
use crate::dates::DateRange;
use crate::error::Result;
use crate::fetcher::{FetchContext, JsonSource};
use crate::goals::{GoalStatus, GoalThresholds};
use crate::models::{DailySales, DocKind, Parsed, ProductLine, Quarantined, RawRecord, Vocabulary};

// ---------------------------------------------------------------------------
// Daily sales against goals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SalesDay {
    pub date: NaiveDate,
    pub doal: f64,
    pub licitacao: f64,
    pub representantes: f64,
    pub total: f64,
    pub accumulated: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalesDayStatus {
    pub doal: GoalStatus,
    pub licitacao: GoalStatus,
    pub representantes: GoalStatus,
    pub total: GoalStatus,
    pub accumulated: GoalStatus,
}

impl SalesDay {
    /// Compare against thresholds; a missing accumulated value counts as zero.
    pub fn status(&self, goals: &GoalThresholds) -> SalesDayStatus {
        SalesDayStatus {
            doal: GoalStatus::daily(self.doal, goals.daily_doal),
            licitacao: GoalStatus::daily(self.licitacao, goals.daily_licitacao),
            representantes: GoalStatus::daily(self.representantes, goals.daily_representantes),
            total: GoalStatus::daily(self.total, goals.daily_total),
            accumulated: GoalStatus::accumulated(self.accumulated.unwrap_or(0.0), goals.monthly),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub date: NaiveDate,
    pub days: Vec<SalesDay>,
    pub quarantined: Vec<Quarantined>,
}

pub fn build_sales(date: NaiveDate, parsed: Parsed<DailySales>) -> SalesReport {
    let days = parsed
        .rows
        .into_iter()
        .map(|r| SalesDay {
            date: r.docdate,
            doal: r.total_doal,
            licitacao: r.total_licitacao,
            representantes: r.representantes,
            total: r.total_doal + r.total_licitacao + r.representantes,
            accumulated: r.acumulado,
        })
        .collect();
    SalesReport {
        date,
        days,
        quarantined: parsed.quarantined,
    }
}

pub fn get_sales(
    source: &dyn JsonSource,
    date: NaiveDate,
    goals: &GoalThresholds,
) -> Result<SalesReport> {
    let context = FetchContext {
        date,
        monthly_goal: goals.monthly,
        business_days: goals.business_days,
    };
    let parsed = api::fetch_daily_sales(source, date, context)?;
    Ok(build_sales(date, parsed))
}

// ---------------------------------------------------------------------------
// Revenue by day
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub endpoint: RevenueEndpoint,
    pub range: DateRange,
    pub buckets: DateBuckets,
    pub quarantined: Vec<Quarantined>,
}

impl RevenueReport {
    /// Days drawn as bars: days with no activity at all are left out.
    pub fn chart_buckets(&self) -> Vec<&DateBucket> {
        self.buckets.active().collect()
    }

    /// Days listed in tables: every day the backend returned.
    pub fn table_buckets(&self) -> &[DateBucket] {
        self.buckets.as_slice()
    }

    pub fn total(&self, kind: DocKind) -> f64 {
        self.buckets.total(kind)
    }
}

pub fn build_revenue(
    endpoint: RevenueEndpoint,
    range: DateRange,
    parsed: Parsed<RawRecord>,
    vocabulary: &Vocabulary,
) -> Result<RevenueReport> {
    let mut buckets = group_by_date(&parsed.rows, vocabulary)?;
    if endpoint.sorts_by_date() {
        buckets.sort_by_date();
    }
    Ok(RevenueReport {
        endpoint,
        range,
        buckets,
        quarantined: parsed.quarantined,
    })
}

pub fn get_revenue(
    source: &dyn JsonSource,
    endpoint: RevenueEndpoint,
    range: DateRange,
    vocabulary: &Vocabulary,
) -> Result<RevenueReport> {
    let parsed = api::fetch_revenue(source, endpoint, range)?;
    build_revenue(endpoint, range, parsed, vocabulary)
}

// ---------------------------------------------------------------------------
// Product and client groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub name: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductReport {
    pub range: DateRange,
    pub by_product: Vec<GroupTotal>,
    pub by_client: Vec<GroupTotal>,
    /// Sum over client groups.
    pub total_invoiced: f64,
    pub quarantined: Vec<Quarantined>,
}

fn to_group_totals(pairs: Vec<(String, f64)>) -> Vec<GroupTotal> {
    pairs
        .into_iter()
        .map(|(name, total)| GroupTotal { name, total })
        .collect()
}

pub fn build_products(range: DateRange, parsed: Parsed<ProductLine>) -> ProductReport {
    let by_product = to_group_totals(sum_by_key(
        &parsed.rows,
        |r| r.product_group.as_str(),
        |r| r.line_total,
    ));
    let by_client = to_group_totals(sum_by_key(
        &parsed.rows,
        |r| r.client_group.as_str(),
        |r| r.line_total,
    ));
    let total_invoiced = by_client.iter().map(|g| g.total).sum();
    ProductReport {
        range,
        by_product,
        by_client,
        total_invoiced,
        quarantined: parsed.quarantined,
    }
}

pub fn get_products(source: &dyn JsonSource, range: DateRange) -> Result<ProductReport> {
    let parsed = api::fetch_product_lines(source, range)?;
    Ok(build_products(range, parsed))
}

// ---------------------------------------------------------------------------
// Chart scaling
// ---------------------------------------------------------------------------

/// Vertical axis of the revenue bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ChartScale {
    /// log10(1 + amount).
    #[default]
    Log,
    Linear,
}

impl ChartScale {
    /// Map an amount onto the axis. Non-positive amounts sit at zero.
    pub fn project(self, value: f64) -> f64 {
        if !value.is_finite() || value <= 0.0 {
            return 0.0;
        }
        match self {
            ChartScale::Log => (1.0 + value).log10(),
            ChartScale::Linear => value,
        }
    }

    /// Bar length in cells for `value`, given the largest value drawn.
    pub fn bar_len(self, value: f64, max: f64, width: usize) -> usize {
        let top = self.project(max);
        if top <= 0.0 {
            return 0;
        }
        let len = (self.project(value) / top * width as f64).round() as usize;
        len.min(width)
    }

    pub fn next(self) -> Self {
        match self {
            ChartScale::Log => ChartScale::Linear,
            ChartScale::Linear => ChartScale::Log,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartScale::Log => "log",
            ChartScale::Linear => "linear",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fetcher::testing::StaticSource;
    use crate::models::LabelPolicy;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn september() -> DateRange {
        DateRange::new(ymd(2024, 9, 1), ymd(2024, 9, 30)).unwrap()
    }

    #[test]
    fn test_sales_totals_and_status() {
        let source = StaticSource::ok(vec![
            json!({"docdate": "2024-09-02", "total_doal": 100000.0, "total_licitacao": 10000.0,
                   "Representantes": 20000.0, "acumulado": 3600000.0}),
            json!({"docdate": "2024-09-03", "total_doal": 1.0, "total_licitacao": 1.0,
                   "Representantes": 1.0}),
            json!({"docdate": "2024-09-04"}),
        ]);
        let goals = GoalThresholds::compute(3_500_000.0, 22).unwrap();
        let report = get_sales(&source, ymd(2024, 9, 4), &goals).unwrap();
        assert_eq!(report.days.len(), 2);
        assert_eq!(report.quarantined.len(), 1);

        let first = &report.days[0];
        assert_eq!(first.total, 130000.0);
        let status = first.status(&goals);
        assert_eq!(status.doal, GoalStatus::Met);
        assert_eq!(status.licitacao, GoalStatus::Below);
        assert_eq!(status.representantes, GoalStatus::Met);
        assert_eq!(status.total, GoalStatus::Below);
        assert_eq!(status.accumulated, GoalStatus::Met);

        assert_eq!(report.days[1].status(&goals).accumulated, GoalStatus::Below);
    }

    #[test]
    fn test_revenue_sorted_and_chart_suppression() {
        let source = StaticSource::ok(vec![
            json!({"Tipo de doc.": "NF", "Data de expedição": "05/09/2024", "Total Valor": 10.0}),
            json!({"Tipo de doc.": "Orçamento", "Data de expedição": "03/09/2024", "Total Valor": 4.0}),
            json!({"Tipo de doc.": "Pedidos", "Data de expedição": "02/09/2024", "Total Valor": 7.0}),
            json!({"Tipo de doc.": "Devolução", "Data de expedição": "05/09/2024", "Total Valor": 2.0}),
        ]);
        let vocab = Vocabulary::standard(LabelPolicy::Drop);
        let report = get_revenue(&source, RevenueEndpoint::Faturado, september(), &vocab).unwrap();

        let table: Vec<NaiveDate> = report.table_buckets().iter().map(|b| b.date).collect();
        assert_eq!(table, vec![ymd(2024, 9, 2), ymd(2024, 9, 3), ymd(2024, 9, 5)]);

        let chart: Vec<NaiveDate> = report.chart_buckets().iter().map(|b| b.date).collect();
        assert_eq!(chart, vec![ymd(2024, 9, 2), ymd(2024, 9, 5)]);

        assert_eq!(report.total(DocKind::Invoice), 10.0);
        assert_eq!(report.total(DocKind::Return), 2.0);
        assert_eq!(report.buckets.dropped, 1);
    }

    #[test]
    fn test_revenue_unsorted_endpoint_keeps_backend_order() {
        let source = StaticSource::ok(vec![
            json!({"Tipo de doc.": "NF", "Data de expedição": "2024-09-05", "Total Valor": 1.0}),
            json!({"Tipo de doc.": "NF", "Data de expedição": "2024-09-01", "Total Valor": 1.0}),
        ]);
        let vocab = Vocabulary::standard(LabelPolicy::Drop);
        let report = get_revenue(&source, RevenueEndpoint::Teste2, september(), &vocab).unwrap();
        let order: Vec<NaiveDate> = report.table_buckets().iter().map(|b| b.date).collect();
        assert_eq!(order, vec![ymd(2024, 9, 5), ymd(2024, 9, 1)]);
    }

    #[test]
    fn test_products_group_twice() {
        let source = StaticSource::ok(vec![
            json!({"grupo_de_produtos": "Luvas", "linetotal": 100.0, "groupname": "Hospitais"}),
            json!({"grupo_de_produtos": "Seringas", "linetotal": 50.0, "groupname": "Clínicas"}),
            json!({"grupo_de_produtos": "Luvas", "linetotal": 25.0, "groupname": "Clínicas"}),
        ]);
        let report = get_products(&source, september()).unwrap();
        assert_eq!(
            report.by_product,
            vec![
                GroupTotal { name: "Luvas".into(), total: 125.0 },
                GroupTotal { name: "Seringas".into(), total: 50.0 },
            ]
        );
        assert_eq!(
            report.by_client,
            vec![
                GroupTotal { name: "Hospitais".into(), total: 100.0 },
                GroupTotal { name: "Clínicas".into(), total: 75.0 },
            ]
        );
        assert_eq!(report.total_invoiced, 175.0);
    }

    #[test]
    fn test_chart_scale_bars() {
        assert_eq!(ChartScale::Linear.bar_len(50.0, 100.0, 40), 20);
        assert_eq!(ChartScale::Linear.bar_len(100.0, 100.0, 40), 40);
        assert_eq!(ChartScale::Linear.bar_len(-3.0, 100.0, 40), 0);
        assert_eq!(ChartScale::Log.bar_len(0.0, 100.0, 40), 0);
        assert_eq!(ChartScale::Log.bar_len(5.0, 0.0, 40), 0);
        // Log keeps a 1% value clearly visible.
        assert!(ChartScale::Log.bar_len(1000.0, 100_000.0, 40) > 20);
        assert!(ChartScale::Linear.bar_len(1000.0, 100_000.0, 40) < 1);
    }
}
