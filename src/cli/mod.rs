pub mod config;
pub mod dashboard;
pub mod report;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::api::RevenueEndpoint;
use crate::dates::{parse_user_date, DateRange};
use crate::error::Result;
use crate::goals::GoalThresholds;
use crate::reports::ChartScale;
use crate::settings::Settings;

pub(crate) fn parse_range(from: &str, to: &str) -> Result<DateRange> {
    DateRange::new(parse_user_date(from)?, parse_user_date(to)?)
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Parser)]
#[command(
    name = "painel",
    version,
    about = "Sales, revenue and product dashboards for the terminal."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard (the default).
    Dashboard,
    /// Print or export a report.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Text,
    Csv,
    Json,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReportOutputArgs {
    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<String>,
    /// Export format (default: text)
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GoalArgs {
    /// Monthly goal in reais (default: monthly_goal setting)
    #[arg(long)]
    pub meta: Option<f64>,
    /// Business days in the month (default: business_days setting)
    #[arg(long)]
    pub dias: Option<u32>,
}

impl GoalArgs {
    pub fn resolve(&self, settings: &Settings) -> Result<GoalThresholds> {
        GoalThresholds::compute(
            self.meta.unwrap_or(settings.monthly_goal),
            self.dias.unwrap_or(settings.business_days),
        )
    }
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Orders for one day against the daily goals.
    Pedidos {
        /// Day: YYYY-MM-DD, DD/MM/YYYY or DDMMYYYY (default: today)
        #[arg(long)]
        date: Option<String>,
        #[command(flatten)]
        goals: GoalArgs,
        #[command(flatten)]
        out: ReportOutputArgs,
    },
    /// Orders, invoices and returns per day.
    Faturamento {
        /// Start date
        #[arg(long = "from")]
        from_date: String,
        /// End date
        #[arg(long = "to")]
        to_date: String,
        #[arg(long, value_enum, default_value_t)]
        endpoint: RevenueEndpoint,
        /// Chart axis
        #[arg(long, value_enum, default_value_t)]
        scale: ChartScale,
        #[command(flatten)]
        out: ReportOutputArgs,
    },
    /// Invoiced totals by product group and client group.
    Produtos {
        #[arg(long = "from")]
        from_date: String,
        #[arg(long = "to")]
        to_date: String,
        #[command(flatten)]
        out: ReportOutputArgs,
    },
    /// Daily goal breakdown for a monthly goal (no network).
    Metas {
        #[command(flatten)]
        goals: GoalArgs,
    },
}

impl ReportCommands {
    pub fn output_args(&self) -> ReportOutputArgs {
        match self {
            ReportCommands::Pedidos { out, .. }
            | ReportCommands::Faturamento { out, .. }
            | ReportCommands::Produtos { out, .. } => out.clone(),
            ReportCommands::Metas { .. } => ReportOutputArgs::default(),
        }
    }

    pub fn report_name(&self) -> &'static str {
        match self {
            ReportCommands::Pedidos { .. } => "pedidos",
            ReportCommands::Faturamento { .. } => "faturamento",
            ReportCommands::Produtos { .. } => "produtos",
            ReportCommands::Metas { .. } => "metas",
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Print the settings file location.
    Path,
    /// Change one setting.
    Set {
        /// One of: orders_api_url, revenue_api_url, monthly_goal, business_days,
        /// unknown_labels, extra_labels, request_timeout_secs, log_level
        key: String,
        /// New value (extra_labels takes LABEL=order|invoice|return)
        value: String,
    },
}
