use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Cell, Paragraph, Row, Table},
    Frame,
};

use crossterm::event::KeyCode;

use crate::error::Result;
use crate::fmt::{br_date, compact_reais, reais, reais_or_zero};
use crate::goals::{GoalStatus, GoalThresholds};
use crate::models::{DocKind, Quarantined};
use crate::reports::{ChartScale, GroupTotal, ProductReport, RevenueReport, SalesReport};
use crate::tui::{
    goal_style, kind_color, run_report_view, ReportView, ReportViewAction, FOOTER_STYLE,
    HEADER_STYLE,
};

use super::ReportData;

/// Dispatch fetched report data to an interactive ratatui view.
pub fn dispatch(data: ReportData) -> Result<()> {
    match data {
        ReportData::Sales { report, goals } => run_report_view(&mut sales_table(&report, &goals)),
        ReportData::Revenue { report, scale } => {
            run_report_view(&mut RevenueReportView::new(report, scale))
        }
        ReportData::Products(report) => run_report_view(&mut products_table(&report)),
    }
}

// ---------------------------------------------------------------------------
// Table-based report view
// ---------------------------------------------------------------------------

const BOLD: Style = Style::new().add_modifier(Modifier::BOLD);
const SECTION_STYLE: Style = HEADER_STYLE;
pub(crate) const HEADER_ROW_STYLE: Style = FOOTER_STYLE.add_modifier(Modifier::BOLD);

pub(crate) struct TableReportView {
    title: String,
    header: Row<'static>,
    rows: Vec<Row<'static>>,
    widths: Vec<Constraint>,
    notes: Vec<String>,
    offset: usize,
    visible_count: usize,
}

impl TableReportView {
    pub(crate) fn new(
        title: impl Into<String>,
        header: Row<'static>,
        rows: Vec<Row<'static>>,
        widths: Vec<Constraint>,
    ) -> Self {
        Self {
            title: title.into(),
            header,
            rows,
            widths,
            notes: Vec::new(),
            offset: 0,
            visible_count: 20,
        }
    }

    pub(crate) fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Start scrolled down by `offset` rows, clamped to the last row.
    pub(crate) fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset.min(self.rows.len().saturating_sub(1));
        self
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Draw just the scrolling table into `area`.
    pub(crate) fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        // Header row plus its bottom margin.
        let header_overhead = 2u16;
        let visible = area.height.saturating_sub(header_overhead) as usize;
        self.visible_count = visible.max(1);

        let visible_rows: Vec<Row> = self
            .rows
            .iter()
            .skip(self.offset)
            .take(visible)
            .cloned()
            .collect();

        let table = Table::new(visible_rows, self.widths.clone())
            .header(self.header.clone())
            .column_spacing(2);
        frame.render_widget(table, area);
    }

    fn position_info(&self) -> String {
        if self.rows.len() > self.visible_count {
            format!("  line {}/{}", self.offset + 1, self.rows.len())
        } else {
            String::new()
        }
    }

    /// Apply a scroll key. Returns false for keys it does not handle.
    pub(crate) fn scroll(&mut self, code: KeyCode) -> bool {
        let page = self.visible_count;
        let max = self.rows.len().saturating_sub(page);
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.offset = self.offset.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.offset = (self.offset + 1).min(max),
            KeyCode::PageUp => self.offset = self.offset.saturating_sub(page),
            KeyCode::PageDown => self.offset = (self.offset + page).min(max),
            KeyCode::Home => self.offset = 0,
            KeyCode::End => self.offset = max,
            _ => return false,
        }
        true
    }
}

impl ReportView for TableReportView {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let notes_height = self.notes.len() as u16;
        let [header_area, sep_area, content_area, notes_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(notes_height),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {}", self.title)).style(HEADER_STYLE),
            header_area,
        );
        frame.render_widget(
            Paragraph::new("━".repeat(area.width as usize)).style(FOOTER_STYLE),
            sep_area,
        );

        self.render_table(frame, content_area);

        let notes: Vec<Line> = self
            .notes
            .iter()
            .map(|n| Line::from(Span::styled(format!(" {n}"), SECTION_STYLE)))
            .collect();
        frame.render_widget(Paragraph::new(notes), notes_area);

        frame.render_widget(
            Paragraph::new(format!(
                " \u{2191}/\u{2193}=scroll  q/Esc=close{}",
                self.position_info()
            ))
            .style(FOOTER_STYLE),
            footer_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => ReportViewAction::Close,
            other => {
                self.scroll(other);
                ReportViewAction::Continue
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helper: create cells with consistent styling
// ---------------------------------------------------------------------------

fn amount_cell(text: String, style: Style) -> Cell<'static> {
    Cell::from(Line::from(Span::styled(text, style)).alignment(Alignment::Right))
}

fn money_cell(amount: f64) -> Cell<'static> {
    amount_cell(reais(amount), Style::new())
}

fn goal_cell(amount: f64, status: GoalStatus) -> Cell<'static> {
    amount_cell(reais(amount), goal_style(status))
}

fn text_cell(s: impl Into<String>) -> Cell<'static> {
    Cell::from(s.into())
}

fn bold_cell(s: impl Into<String>) -> Cell<'static> {
    Cell::from(Span::styled(s.into(), BOLD))
}

fn section_row(label: &str, num_cols: usize) -> Row<'static> {
    let mut cells: Vec<Cell> = vec![Cell::from(Span::styled(label.to_string(), SECTION_STYLE))];
    for _ in 1..num_cols {
        cells.push(Cell::from(""));
    }
    Row::new(cells)
}

fn blank_row(num_cols: usize) -> Row<'static> {
    Row::new(vec![Cell::from(""); num_cols])
}

pub(crate) fn quarantine_notes(quarantined: &[Quarantined], dropped: usize) -> Vec<String> {
    let mut notes = Vec::new();
    if !quarantined.is_empty() {
        notes.push(format!(
            "{} linha(s) com formato inválido ignorada(s)",
            quarantined.len()
        ));
    }
    if dropped > 0 {
        notes.push(format!(
            "{dropped} documento(s) de tipo desconhecido ignorado(s)"
        ));
    }
    notes
}

// ---------------------------------------------------------------------------
// Daily orders
// ---------------------------------------------------------------------------

pub(crate) fn sales_table(report: &SalesReport, goals: &GoalThresholds) -> TableReportView {
    let widths = vec![
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(18),
    ];
    let header = Row::new([
        "Data",
        "DOAL",
        "Licitação",
        "Representantes",
        "Total",
        "Acumulado",
    ])
    .style(HEADER_ROW_STYLE)
    .bottom_margin(1);

    let mut rows = vec![Row::new([
        bold_cell("Meta"),
        money_cell(goals.daily_doal),
        money_cell(goals.daily_licitacao),
        money_cell(goals.daily_representantes),
        money_cell(goals.daily_total),
        money_cell(goals.monthly),
    ])];
    rows.push(blank_row(6));

    if report.days.is_empty() {
        rows.push(section_row("Nenhum pedido encontrado.", 6));
    }
    for day in &report.days {
        let status = day.status(goals);
        rows.push(Row::new([
            text_cell(br_date(day.date)),
            goal_cell(day.doal, status.doal),
            goal_cell(day.licitacao, status.licitacao),
            goal_cell(day.representantes, status.representantes),
            goal_cell(day.total, status.total),
            amount_cell(reais_or_zero(day.accumulated), goal_style(status.accumulated)),
        ]));
    }

    TableReportView::new(
        format!("Pedidos de {}", br_date(report.date)),
        header,
        rows,
        widths,
    )
    .with_notes(quarantine_notes(&report.quarantined, 0))
}

// ---------------------------------------------------------------------------
// Revenue: bar chart over active days plus the full daily table
// ---------------------------------------------------------------------------

/// Pick a round top tick and a mid tick for the chart's y axis.
pub(crate) fn y_axis_ticks(scale: ChartScale, max_val: f64) -> (f64, f64) {
    match scale {
        ChartScale::Linear => {
            // Round steps: 1k, 2.5k, 5k, 10k, ... up to 100 mi
            let steps = [
                1_000.0, 2_500.0, 5_000.0, 10_000.0, 25_000.0, 50_000.0, 100_000.0, 250_000.0,
                500_000.0, 1_000_000.0, 2_500_000.0, 5_000_000.0, 10_000_000.0, 25_000_000.0,
                50_000_000.0, 100_000_000.0,
            ];
            let top = steps
                .iter()
                .copied()
                .find(|&s| s >= max_val)
                .unwrap_or(max_val);
            (top, top / 2.0)
        }
        ChartScale::Log => {
            let top = max_val.max(0.0);
            let mid = 10f64.powf(scale.project(top) / 2.0) - 1.0;
            (top, mid)
        }
    }
}

/// Integer bar height for ratatui's BarChart.
fn bar_value(scale: ChartScale, value: f64) -> u64 {
    (scale.project(value) * 100.0).round() as u64
}

pub(crate) fn revenue_table(report: &RevenueReport) -> TableReportView {
    let mut widths = vec![Constraint::Length(12)];
    widths.extend(DocKind::ALL.iter().map(|_| Constraint::Length(18)));
    let mut header: Vec<&str> = vec!["Data"];
    header.extend(DocKind::ALL.iter().map(|k| k.title()));
    let header = Row::new(header).style(HEADER_ROW_STYLE).bottom_margin(1);

    let mut rows: Vec<Row> = report
        .table_buckets()
        .iter()
        .map(|b| {
            let mut cells = vec![text_cell(br_date(b.date))];
            cells.extend(DocKind::ALL.iter().map(|k| money_cell(b.get(*k))));
            Row::new(cells)
        })
        .collect();
    if rows.is_empty() {
        rows.push(section_row("Nenhum documento no período.", 4));
    } else {
        let mut totals = vec![bold_cell("Total")];
        totals.extend(
            DocKind::ALL
                .iter()
                .map(|k| amount_cell(reais(report.total(*k)), BOLD)),
        );
        rows.push(Row::new(totals));
    }

    TableReportView::new(
        format!(
            "{} de {} a {}",
            report.endpoint.title(),
            br_date(report.range.start),
            br_date(report.range.end)
        ),
        header,
        rows,
        widths,
    )
    .with_notes(quarantine_notes(&report.quarantined, report.buckets.dropped))
}

/// Grouped bars (orders, invoices, returns) for every day with activity.
pub(crate) fn render_revenue_chart(
    frame: &mut Frame,
    area: Rect,
    report: &RevenueReport,
    scale: ChartScale,
) {
    let buckets = report.chart_buckets();
    if buckets.is_empty() {
        frame.render_widget(
            Paragraph::new(" Sem movimento no período.").style(FOOTER_STYLE),
            area,
        );
        return;
    }

    let max_val = buckets
        .iter()
        .flat_map(|b| DocKind::ALL.iter().map(move |k| b.get(*k)))
        .fold(0.0_f64, f64::max);
    let (top_tick, mid_tick) = y_axis_ticks(scale, max_val);
    let top_label = compact_reais(top_tick);
    let mid_label = compact_reais(mid_tick);
    let y_label_width = top_label.chars().count().max(mid_label.chars().count()) as u16 + 1;

    let [y_axis_area, bar_area] = Layout::horizontal([
        Constraint::Length(y_label_width),
        Constraint::Fill(1),
    ])
    .areas(area);

    // Top tick on the first row, mid tick halfway down; the last row holds day labels.
    let inner_height = bar_area.height.saturating_sub(1);
    let mid_row = inner_height / 2;
    let y_lines: Vec<Line> = (0..inner_height)
        .map(|row| {
            let label = if row == 0 {
                top_label.as_str()
            } else if row == mid_row {
                mid_label.as_str()
            } else {
                ""
            };
            Line::from(Span::styled(
                format!("{:>width$}", label, width = y_label_width as usize),
                FOOTER_STYLE,
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(y_lines), y_axis_area);

    let groups: Vec<BarGroup> = buckets
        .iter()
        .map(|b| {
            let bars: Vec<Bar> = DocKind::ALL
                .iter()
                .map(|k| {
                    Bar::default()
                        .value(bar_value(scale, b.get(*k)))
                        .text_value(String::new())
                        .style(Style::new().fg(kind_color(*k)))
                })
                .collect();
            BarGroup::default()
                .label(Line::from(b.date.format("%d/%m").to_string()))
                .bars(&bars)
        })
        .collect();

    let mut chart = BarChart::default()
        .bar_width(2)
        .bar_gap(0)
        .group_gap(2)
        .max(bar_value(scale, top_tick).max(1));
    for group in &groups {
        chart = chart.data(group.clone());
    }
    frame.render_widget(chart, bar_area);
}

pub(crate) fn chart_legend(scale: ChartScale) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for kind in DocKind::ALL {
        spans.push(Span::styled("■ ", Style::new().fg(kind_color(kind))));
        spans.push(Span::raw(format!("{}  ", kind.title())));
    }
    spans.push(Span::styled(format!("escala {}", scale.label()), FOOTER_STYLE));
    Line::from(spans)
}

pub(crate) struct RevenueReportView {
    report: RevenueReport,
    scale: ChartScale,
    table: TableReportView,
}

impl RevenueReportView {
    pub(crate) fn new(report: RevenueReport, scale: ChartScale) -> Self {
        let table = revenue_table(&report);
        Self {
            report,
            scale,
            table,
        }
    }
}

impl ReportView for RevenueReportView {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let notes_height = self.table.notes.len() as u16;
        let [header_area, sep_area, legend_area, chart_area, table_area, notes_area, footer_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Percentage(55),
                Constraint::Fill(1),
                Constraint::Length(notes_height),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {}", self.table.title)).style(HEADER_STYLE),
            header_area,
        );
        frame.render_widget(
            Paragraph::new("━".repeat(area.width as usize)).style(FOOTER_STYLE),
            sep_area,
        );
        frame.render_widget(Paragraph::new(chart_legend(self.scale)), legend_area);
        render_revenue_chart(frame, chart_area, &self.report, self.scale);
        self.table.render_table(frame, table_area);

        let notes: Vec<Line> = self
            .table
            .notes
            .iter()
            .map(|n| Line::from(Span::styled(format!(" {n}"), SECTION_STYLE)))
            .collect();
        frame.render_widget(Paragraph::new(notes), notes_area);

        frame.render_widget(
            Paragraph::new(format!(
                " s=log/linear  \u{2191}/\u{2193}=scroll  q/Esc=close{}",
                self.table.position_info()
            ))
            .style(FOOTER_STYLE),
            footer_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => ReportViewAction::Close,
            KeyCode::Char('s') => {
                self.scale = self.scale.next();
                ReportViewAction::Continue
            }
            other => {
                self.table.scroll(other);
                ReportViewAction::Continue
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Products and clients
// ---------------------------------------------------------------------------

fn group_rows(rows: &mut Vec<Row<'static>>, heading: &str, groups: &[GroupTotal]) {
    rows.push(section_row(heading, 2));
    for g in groups {
        rows.push(Row::new([
            text_cell(format!("  {}", g.name)),
            money_cell(g.total),
        ]));
    }
    rows.push(blank_row(2));
}

pub(crate) fn products_table(report: &ProductReport) -> TableReportView {
    let widths = vec![Constraint::Fill(1), Constraint::Length(18)];
    let header = Row::new(["Grupo", "Total"])
        .style(HEADER_ROW_STYLE)
        .bottom_margin(1);

    let mut rows = Vec::new();
    group_rows(&mut rows, "POR GRUPO DE PRODUTOS", &report.by_product);
    group_rows(&mut rows, "POR GRUPO DE CLIENTES", &report.by_client);
    rows.push(Row::new([
        bold_cell("TOTAL FATURADO"),
        amount_cell(reais(report.total_invoiced), BOLD),
    ]));

    TableReportView::new(
        format!(
            "Produtos e clientes de {} a {}",
            br_date(report.range.start),
            br_date(report.range.end)
        ),
        header,
        rows,
        widths,
    )
    .with_notes(quarantine_notes(&report.quarantined, 0))
}
