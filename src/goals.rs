use serde::Serialize;

use crate::error::{PainelError, Result};

/// Share of the daily goal expected from direct sales (DOAL).
pub const DOAL_SHARE: f64 = 0.6;
/// Share expected from public tenders (licitação).
pub const LICITACAO_SHARE: f64 = 0.3;
/// Share expected from sales representatives.
pub const REPRESENTANTES_SHARE: f64 = 0.1;

/// Daily targets derived from a monthly goal and a count of business days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalThresholds {
    pub monthly: f64,
    pub business_days: u32,
    pub daily_doal: f64,
    pub daily_licitacao: f64,
    pub daily_representantes: f64,
    pub daily_total: f64,
}

impl GoalThresholds {
    pub fn compute(monthly: f64, business_days: u32) -> Result<Self> {
        if !monthly.is_finite() || monthly < 0.0 {
            return Err(PainelError::InvalidGoal(format!(
                "monthly goal must be a non-negative amount, got {monthly}"
            )));
        }
        if business_days == 0 {
            return Err(PainelError::InvalidGoal(
                "business days must be at least 1".into(),
            ));
        }
        let daily_total = monthly / f64::from(business_days);
        Ok(Self {
            monthly,
            business_days,
            daily_doal: daily_total * DOAL_SHARE,
            daily_licitacao: daily_total * LICITACAO_SHARE,
            daily_representantes: daily_total * REPRESENTANTES_SHARE,
            daily_total,
        })
    }

    /// Parse the two goal fields as typed by the user.
    pub fn from_inputs(monthly: &str, business_days: &str) -> Result<Self> {
        let monthly: f64 = monthly
            .trim()
            .parse()
            .map_err(|_| PainelError::InvalidGoal(format!("{monthly:?} is not an amount")))?;
        let days: u32 = business_days.trim().parse().map_err(|_| {
            PainelError::InvalidGoal(format!("{business_days:?} is not a day count"))
        })?;
        Self::compute(monthly, days)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Met,
    Below,
}

impl GoalStatus {
    /// A day meets its goal when the value reaches the threshold.
    pub fn daily(value: f64, threshold: f64) -> Self {
        if value >= threshold {
            GoalStatus::Met
        } else {
            GoalStatus::Below
        }
    }

    /// The month-to-date total only counts once it is strictly over the goal.
    pub fn accumulated(value: f64, monthly: f64) -> Self {
        if value > monthly {
            GoalStatus::Met
        } else {
            GoalStatus::Below
        }
    }
}
