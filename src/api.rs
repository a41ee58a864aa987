use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::dates::DateRange;
use crate::error::Result;
use crate::fetcher::{with_context, FetchContext, JsonSource};
use crate::models::{parse_rows, DailySales, Parsed, ProductLine, RawRecord};

pub const ORDERS_PATH: &str = "/api/pedidos";
pub const PRODUCTS_PATH: &str = "/api/produtos_clientes";

/// The three endpoints that return `Tipo de doc.` / `Data de expedição` /
/// `Total Valor` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RevenueEndpoint {
    #[default]
    Faturado,
    PedidosGrafico,
    Teste2,
}

impl RevenueEndpoint {
    pub const ALL: [RevenueEndpoint; 3] = [
        RevenueEndpoint::Faturado,
        RevenueEndpoint::PedidosGrafico,
        RevenueEndpoint::Teste2,
    ];

    pub fn path(self) -> &'static str {
        match self {
            RevenueEndpoint::Faturado => "/api/faturado",
            RevenueEndpoint::PedidosGrafico => "/api/pedidos_grafico",
            RevenueEndpoint::Teste2 => "/api/teste2",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RevenueEndpoint::Faturado => "Faturamento",
            RevenueEndpoint::PedidosGrafico => "Pedidos (gráfico)",
            RevenueEndpoint::Teste2 => "Teste 2",
        }
    }

    /// Only the invoiced view puts its days in calendar order; the others
    /// keep the order the backend sent.
    pub fn sorts_by_date(self) -> bool {
        matches!(self, RevenueEndpoint::Faturado)
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|e| *e == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// `POST /api/pedidos` for one day. Failures carry the goal inputs in effect.
pub fn fetch_daily_sales(
    source: &dyn JsonSource,
    date: NaiveDate,
    context: FetchContext,
) -> Result<Parsed<DailySales>> {
    let body = json!({ "date": date.format("%Y-%m-%d").to_string() });
    let values = source
        .post(ORDERS_PATH, &body)
        .map_err(|e| with_context(e, context))?;
    let parsed = parse_rows(values);
    info!(
        rows = parsed.rows.len(),
        quarantined = parsed.quarantined.len(),
        "fetched daily sales for {date}"
    );
    Ok(parsed)
}

pub fn fetch_revenue(
    source: &dyn JsonSource,
    endpoint: RevenueEndpoint,
    range: DateRange,
) -> Result<Parsed<RawRecord>> {
    let values = source.get(endpoint.path(), &range.query())?;
    let parsed = parse_rows(values);
    info!(
        endpoint = endpoint.path(),
        rows = parsed.rows.len(),
        quarantined = parsed.quarantined.len(),
        "fetched revenue rows"
    );
    Ok(parsed)
}

pub fn fetch_product_lines(source: &dyn JsonSource, range: DateRange) -> Result<Parsed<ProductLine>> {
    let values = source.get(PRODUCTS_PATH, &range.query())?;
    let parsed = parse_rows(values);
    info!(
        rows = parsed.rows.len(),
        quarantined = parsed.quarantined.len(),
        "fetched product lines"
    );
    Ok(parsed)
}
