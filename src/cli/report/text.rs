use colored::{Color, ColoredString, Colorize};
use comfy_table::{Cell, CellAlignment, Table};

use crate::fmt::{br_date, reais, reais_or_zero};
use crate::goals::{GoalStatus, GoalThresholds};
use crate::models::{DocKind, Quarantined};
use crate::reports::{ChartScale, GroupTotal, ProductReport, RevenueReport, SalesReport};

/// Width of the text bar chart, in characters.
const BAR_WIDTH: usize = 40;

fn goal_colored(text: String, status: GoalStatus) -> ColoredString {
    match status {
        GoalStatus::Met => text.green(),
        GoalStatus::Below => text.red(),
    }
}

fn amount_cell(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

fn kind_color(kind: DocKind) -> Color {
    match kind {
        DocKind::Order => Color::Blue,
        DocKind::Invoice => Color::Green,
        DocKind::Return => Color::Red,
    }
}

fn quarantine_note(quarantined: &[Quarantined]) -> Option<String> {
    if quarantined.is_empty() {
        return None;
    }
    Some(
        format!(
            "Aviso: {} linha(s) com formato inválido ignorada(s)",
            quarantined.len()
        )
        .yellow()
        .to_string(),
    )
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

pub fn format_goals(goals: &GoalThresholds) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Canal", "Meta diária"]);
    table.add_row(vec![Cell::new("DOAL"), amount_cell(reais(goals.daily_doal))]);
    table.add_row(vec![
        Cell::new("Licitação"),
        amount_cell(reais(goals.daily_licitacao)),
    ]);
    table.add_row(vec![
        Cell::new("Representantes"),
        amount_cell(reais(goals.daily_representantes)),
    ]);
    table.add_row(vec![
        Cell::new("Total".bold()),
        amount_cell(reais(goals.daily_total).bold().to_string()),
    ]);
    format!(
        "Meta mensal {} em {} dias úteis\n{table}",
        reais(goals.monthly),
        goals.business_days
    )
}

// ---------------------------------------------------------------------------
// Daily orders
// ---------------------------------------------------------------------------

pub fn format_sales(report: &SalesReport, goals: &GoalThresholds) -> String {
    let title = format!("Pedidos de {}", br_date(report.date));
    if report.days.is_empty() {
        return format!("{title}\n\nNenhum pedido encontrado.");
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Data",
        "DOAL",
        "Licitação",
        "Representantes",
        "Total",
        "Acumulado",
    ]);
    table.add_row(vec![
        Cell::new("Meta".bold()),
        amount_cell(reais(goals.daily_doal)),
        amount_cell(reais(goals.daily_licitacao)),
        amount_cell(reais(goals.daily_representantes)),
        amount_cell(reais(goals.daily_total)),
        amount_cell(reais(goals.monthly)),
    ]);
    for day in &report.days {
        let status = day.status(goals);
        table.add_row(vec![
            Cell::new(br_date(day.date)),
            amount_cell(goal_colored(reais(day.doal), status.doal).to_string()),
            amount_cell(goal_colored(reais(day.licitacao), status.licitacao).to_string()),
            amount_cell(
                goal_colored(reais(day.representantes), status.representantes).to_string(),
            ),
            amount_cell(goal_colored(reais(day.total), status.total).to_string()),
            amount_cell(
                goal_colored(reais_or_zero(day.accumulated), status.accumulated).to_string(),
            ),
        ]);
    }

    let mut out = format!("{title}\n{table}");
    if let Some(note) = quarantine_note(&report.quarantined) {
        out.push_str(&format!("\n{note}"));
    }
    out
}

// ---------------------------------------------------------------------------
// Revenue by day
// ---------------------------------------------------------------------------

pub fn format_revenue(report: &RevenueReport, scale: ChartScale) -> String {
    let title = format!(
        "{} de {} a {}",
        report.endpoint.title(),
        br_date(report.range.start),
        br_date(report.range.end)
    );
    if report.buckets.is_empty() {
        return format!("{title}\n\nNenhum documento no período.");
    }

    let mut table = Table::new();
    let mut header = vec!["Data"];
    header.extend(DocKind::ALL.iter().map(|k| k.title()));
    table.set_header(header);
    for bucket in report.table_buckets() {
        let mut row = vec![Cell::new(br_date(bucket.date))];
        row.extend(DocKind::ALL.iter().map(|k| amount_cell(reais(bucket.get(*k)))));
        table.add_row(row);
    }
    let mut totals = vec![Cell::new("Total".bold())];
    totals.extend(
        DocKind::ALL
            .iter()
            .map(|k| amount_cell(reais(report.total(*k)).bold().to_string())),
    );
    table.add_row(totals);

    let mut out = format!("{title}\n{table}");

    let chart = format_revenue_chart(report, scale);
    if !chart.is_empty() {
        out.push_str(&format!("\n\nGráfico (escala {})\n{chart}", scale.label()));
    }
    if report.buckets.dropped > 0 {
        out.push_str(&format!(
            "\n{}",
            format!(
                "Aviso: {} documento(s) de tipo desconhecido ignorado(s)",
                report.buckets.dropped
            )
            .yellow()
        ));
    }
    if let Some(note) = quarantine_note(&report.quarantined) {
        out.push_str(&format!("\n{note}"));
    }
    out
}

/// One group of bars per day with activity.
pub fn format_revenue_chart(report: &RevenueReport, scale: ChartScale) -> String {
    let buckets = report.chart_buckets();
    let max = buckets
        .iter()
        .flat_map(|b| DocKind::ALL.iter().map(move |k| b.get(*k)))
        .fold(0.0_f64, f64::max);

    let mut lines = Vec::new();
    for bucket in buckets {
        let day = bucket.date.format("%d/%m").to_string();
        for (i, kind) in DocKind::ALL.iter().enumerate() {
            let value = bucket.get(*kind);
            let bar = "█".repeat(scale.bar_len(value, max, BAR_WIDTH));
            let label = if i == 0 { day.as_str() } else { "" };
            lines.push(format!(
                "{label:<6}{:<10} {} {}",
                kind.title(),
                bar.color(kind_color(*kind)),
                reais(value)
            ));
        }
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Products and clients
// ---------------------------------------------------------------------------

fn group_table(heading: &str, groups: &[GroupTotal]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![heading, "Total"]);
    for g in groups {
        table.add_row(vec![Cell::new(&g.name), amount_cell(reais(g.total))]);
    }
    table
}

pub fn format_products(report: &ProductReport) -> String {
    let title = format!(
        "Produtos e clientes de {} a {}",
        br_date(report.range.start),
        br_date(report.range.end)
    );
    if report.by_product.is_empty() && report.by_client.is_empty() {
        return format!("{title}\n\nNenhum faturamento no período.");
    }

    let mut out = format!(
        "{title}\n\nPor grupo de produtos\n{}\n\nPor grupo de clientes\n{}\n\nTotal faturado: {}",
        group_table("Grupo de produtos", &report.by_product),
        group_table("Grupo de clientes", &report.by_client),
        reais(report.total_invoiced).bold()
    );
    if let Some(note) = quarantine_note(&report.quarantined) {
        out.push_str(&format!("\n{note}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::api::RevenueEndpoint;
    use crate::dates::DateRange;
    use crate::models::{parse_rows, LabelPolicy, Vocabulary};
    use crate::reports::{build_products, build_revenue, build_sales};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(ymd(2024, 9, 1), ymd(2024, 9, 30)).unwrap()
    }

    #[test]
    fn test_format_goals() {
        let goals = GoalThresholds::compute(3_500_000.0, 22).unwrap();
        let out = format_goals(&goals);
        assert!(out.contains("R$ 3.500.000,00"));
        assert!(out.contains("22 dias úteis"));
        assert!(out.contains("R$ 95.454,55"));
        assert!(out.contains("R$ 47.727,27"));
        assert!(out.contains("R$ 15.909,09"));
        assert!(out.contains("R$ 159.090,91"));
    }

    #[test]
    fn test_format_sales_rows_and_goal_header() {
        let parsed = parse_rows(vec![
            json!({"docdate": "2024-09-02", "total_doal": 1000.0, "total_licitacao": 500.0,
                   "Representantes": 250.5}),
            json!({"bad": true}),
        ]);
        let report = build_sales(ymd(2024, 9, 2), parsed);
        let goals = GoalThresholds::compute(3_500_000.0, 22).unwrap();
        let out = format_sales(&report, &goals);
        assert!(out.contains("Pedidos de 02/09/2024"));
        assert!(out.contains("Meta"));
        assert!(out.contains("R$ 1.750,50"));
        // Missing accumulated renders as zero.
        assert!(out.contains("R$ 0,00"));
        assert!(out.contains("1 linha(s)"));
    }

    #[test]
    fn test_format_sales_empty() {
        let report = build_sales(ymd(2024, 9, 2), parse_rows(vec![]));
        let goals = GoalThresholds::compute(1000.0, 10).unwrap();
        assert!(format_sales(&report, &goals).contains("Nenhum pedido"));
    }

    #[test]
    fn test_format_revenue_table_keeps_zero_days_chart_does_not() {
        let parsed = parse_rows(vec![
            json!({"Tipo de doc.": "NF", "Data de expedição": "2024-09-05", "Total Valor": 1500.0}),
            json!({"Tipo de doc.": "Orçamento", "Data de expedição": "2024-09-03", "Total Valor": 9.0}),
        ]);
        let vocab = Vocabulary::standard(LabelPolicy::Drop);
        let report = build_revenue(RevenueEndpoint::Faturado, range(), parsed, &vocab).unwrap();

        let out = format_revenue(&report, ChartScale::Linear);
        assert!(out.contains("03/09/2024"));
        assert!(out.contains("05/09/2024"));
        assert!(out.contains("R$ 1.500,00"));
        assert!(out.contains("1 documento(s) de tipo desconhecido"));

        let chart = format_revenue_chart(&report, ChartScale::Linear);
        assert!(chart.contains("05/09"));
        assert!(!chart.contains("03/09"));
        assert!(chart.contains(&"█".repeat(BAR_WIDTH)));
    }

    #[test]
    fn test_format_revenue_empty() {
        let vocab = Vocabulary::standard(LabelPolicy::Drop);
        let report =
            build_revenue(RevenueEndpoint::Teste2, range(), parse_rows(vec![]), &vocab).unwrap();
        assert!(format_revenue(&report, ChartScale::Log).contains("Nenhum documento"));
    }

    #[test]
    fn test_format_products() {
        let parsed = parse_rows(vec![
            json!({"grupo_de_produtos": "Luvas", "linetotal": 100.0, "groupname": "Hospitais"}),
            json!({"grupo_de_produtos": "Seringas", "linetotal": 50.25, "groupname": "Clínicas"}),
        ]);
        let out = format_products(&build_products(range(), parsed));
        assert!(out.contains("Luvas"));
        assert!(out.contains("Clínicas"));
        assert!(out.contains("R$ 150,25"));
    }
}
