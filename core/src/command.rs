use crate::{
    config::GenerationParams,
    dashboard::{Controls, Dashboard, DashboardView},
    error::DashResult,
    filter::FilterCriteria,
    types::Seed,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// All user-issued dashboard commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DashboardCommand {
    // ── Filters ───────────────────────────────────
    SetFilter { criteria: FilterCriteria },
    ClearFilter,

    // ── Scenario sliders ──────────────────────────
    SetPriceShift { percent: f64 },
    SetRiskTolerance { z: f64 },

    // ── Dataset ───────────────────────────────────
    Regenerate {
        #[serde(default)]
        seed: Option<Seed>,
        #[serde(default)]
        record_count: Option<i64>,
        #[serde(default)]
        start: Option<NaiveDateTime>,
        #[serde(default)]
        window_seconds: Option<i64>,
    },
}

/// The current selections of one dashboard user.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub params: GenerationParams,
    pub criteria: FilterCriteria,
    pub controls: Controls,
}

impl Session {
    pub fn new(dashboard: &Dashboard) -> DashResult<Self> {
        Ok(Self {
            params: dashboard.default_params()?,
            criteria: FilterCriteria::all(),
            controls: dashboard.default_controls(),
        })
    }

    /// Apply one command. On error the session is left unchanged.
    pub fn apply(&mut self, dashboard: &Dashboard, command: DashboardCommand) -> DashResult<()> {
        match command {
            DashboardCommand::SetFilter { criteria } => self.criteria = criteria,
            DashboardCommand::ClearFilter => self.criteria = FilterCriteria::all(),
            DashboardCommand::SetPriceShift { percent } => {
                self.controls = dashboard.controls(percent, self.controls.risk_tolerance())?;
            }
            DashboardCommand::SetRiskTolerance { z } => {
                let shift = self.controls.price_shift().as_percent();
                self.controls = dashboard.controls(shift, z)?;
            }
            DashboardCommand::Regenerate { seed, record_count, start, window_seconds } => {
                // Omitted fields keep their current value.
                let current = self.params;
                self.params = GenerationParams::new(
                    seed.unwrap_or(current.seed()),
                    record_count.unwrap_or(current.record_count() as i64),
                    start.unwrap_or(current.start()),
                    window_seconds.unwrap_or(current.window_seconds() as i64),
                )?;
            }
        }
        Ok(())
    }

    pub fn view(&self, dashboard: &mut Dashboard) -> DashResult<DashboardView> {
        dashboard.render(&self.params, &self.criteria, &self.controls)
    }
}
