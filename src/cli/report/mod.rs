pub mod text;
pub mod view;

use std::io::IsTerminal;
use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{parse_range, today, ExportFormat, ReportCommands, ReportOutputArgs};
use crate::dates::parse_user_date;
use crate::error::{PainelError, Result};
use crate::goals::{GoalStatus, GoalThresholds};
use crate::models::DocKind;
use crate::reports::{
    self, ChartScale, ProductReport, RevenueReport, SalesDayStatus, SalesReport,
};
use crate::settings::{load_settings, Settings};

/// Fetched data for one report, ready to render.
pub enum ReportData {
    Sales { report: SalesReport, goals: GoalThresholds },
    Revenue { report: RevenueReport, scale: ChartScale },
    Products(ProductReport),
}

pub fn dispatch(cmd: ReportCommands) -> Result<()> {
    let settings = load_settings();

    // Goals need no network and are always plain text.
    if let ReportCommands::Metas { goals } = &cmd {
        println!("{}", text::format_goals(&goals.resolve(&settings)?));
        return Ok(());
    }

    let args = cmd.output_args();
    let name = cmd.report_name();
    let data = load(cmd, &settings)?;

    let exporting = args.output.is_some()
        || matches!(args.format, Some(ExportFormat::Csv | ExportFormat::Json));
    if exporting {
        dispatch_export(&data, &args, name)
    } else if std::io::stdout().is_terminal() {
        view::dispatch(data)
    } else {
        // Non-TTY: plain text to stdout
        println!("{}", render_text(&data));
        Ok(())
    }
}

/// Validate arguments, then fetch. Bad dates or goals fail before any request.
fn load(cmd: ReportCommands, settings: &Settings) -> Result<ReportData> {
    match cmd {
        ReportCommands::Pedidos { date, goals, .. } => {
            let date = match date {
                Some(d) => parse_user_date(&d)?,
                None => today(),
            };
            let goals = goals.resolve(settings)?;
            let source = settings.orders_source()?;
            let report = reports::get_sales(&source, date, &goals)?;
            Ok(ReportData::Sales { report, goals })
        }
        ReportCommands::Faturamento {
            from_date,
            to_date,
            endpoint,
            scale,
            ..
        } => {
            let range = parse_range(&from_date, &to_date)?;
            let source = settings.revenue_source()?;
            let report = reports::get_revenue(&source, endpoint, range, &settings.vocabulary())?;
            Ok(ReportData::Revenue { report, scale })
        }
        ReportCommands::Produtos {
            from_date, to_date, ..
        } => {
            let range = parse_range(&from_date, &to_date)?;
            let source = settings.orders_source()?;
            Ok(ReportData::Products(reports::get_products(&source, range)?))
        }
        ReportCommands::Metas { .. } => Err(PainelError::Other(
            "`report metas` has nothing to fetch".into(),
        )),
    }
}

pub(crate) fn render_text(data: &ReportData) -> String {
    match data {
        ReportData::Sales { report, goals } => text::format_sales(report, goals),
        ReportData::Revenue { report, scale } => text::format_revenue(report, *scale),
        ReportData::Products(report) => text::format_products(report),
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SalesExport<'a> {
    #[serde(flatten)]
    report: &'a SalesReport,
    goals: &'a GoalThresholds,
    status: Vec<SalesDayStatus>,
}

fn render_json(data: &ReportData) -> Result<String> {
    let json = match data {
        ReportData::Sales { report, goals } => serde_json::to_string_pretty(&SalesExport {
            report,
            goals,
            status: report.days.iter().map(|d| d.status(goals)).collect(),
        })?,
        ReportData::Revenue { report, .. } => serde_json::to_string_pretty(report)?,
        ReportData::Products(report) => serde_json::to_string_pretty(report)?,
    };
    Ok(json)
}

fn status_label(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::Met => "met",
        GoalStatus::Below => "below",
    }
}

fn render_csv(data: &ReportData) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    match data {
        ReportData::Sales { report, goals } => {
            wtr.write_record([
                "date",
                "doal",
                "licitacao",
                "representantes",
                "total",
                "acumulado",
                "total_status",
            ])?;
            for day in &report.days {
                wtr.write_record([
                    day.date.format("%Y-%m-%d").to_string(),
                    day.doal.to_string(),
                    day.licitacao.to_string(),
                    day.representantes.to_string(),
                    day.total.to_string(),
                    day.accumulated.map(|a| a.to_string()).unwrap_or_default(),
                    status_label(day.status(goals).total).to_string(),
                ])?;
            }
        }
        ReportData::Revenue { report, .. } => {
            wtr.write_record(["date", "pedidos", "nf", "devolucao"])?;
            for b in report.table_buckets() {
                wtr.write_record([
                    b.date.format("%Y-%m-%d").to_string(),
                    b.get(DocKind::Order).to_string(),
                    b.get(DocKind::Invoice).to_string(),
                    b.get(DocKind::Return).to_string(),
                ])?;
            }
        }
        ReportData::Products(report) => {
            wtr.write_record(["group", "name", "total"])?;
            for g in &report.by_product {
                let total = g.total.to_string();
                wtr.write_record(["produto", g.name.as_str(), total.as_str()])?;
            }
            for g in &report.by_client {
                let total = g.total.to_string();
                wtr.write_record(["cliente", g.name.as_str(), total.as_str()])?;
            }
        }
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| PainelError::Other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn dispatch_export(data: &ReportData, args: &ReportOutputArgs, name: &str) -> Result<()> {
    let format = args.format.unwrap_or(ExportFormat::Text);
    let Some(path) = &args.output else {
        let body = match format {
            ExportFormat::Text => render_text(data),
            ExportFormat::Csv => render_csv(data)?,
            ExportFormat::Json => render_json(data)?,
        };
        print!("{body}");
        if !body.ends_with('\n') {
            println!();
        }
        return Ok(());
    };

    let body = match format {
        ExportFormat::Text => {
            // Files never get ANSI colors.
            colored::control::set_override(false);
            let s = render_text(data);
            colored::control::unset_override();
            s
        }
        ExportFormat::Csv => render_csv(data)?,
        ExportFormat::Json => render_json(data)?,
    };
    let p = PathBuf::from(path);
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&p, body)?;
    println!("Wrote {name} report to {}", p.display());
    Ok(())
}
