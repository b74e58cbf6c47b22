//! ROI figures for proposals

use sales_agent_core::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOURLY_RATE: f64 = 50.0;
pub const WORKING_DAYS_PER_MONTH: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiReport {
    pub investment: f64,
    pub hours_saved_per_day: f64,
    pub hourly_rate: f64,
    pub monthly_savings: f64,
    pub yearly_savings: f64,
    /// Months until savings cover the investment; 0 when nothing is saved
    pub payback_months: f64,
    /// First-year ROI in percent; 0 when nothing is invested
    pub roi_percent: f64,
    pub three_year_value: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct RoiCalculator {
    default_hourly_rate: f64,
}

impl Default for RoiCalculator {
    fn default() -> Self {
        Self {
            default_hourly_rate: DEFAULT_HOURLY_RATE,
        }
    }
}

impl RoiCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hourly_rate(rate: f64) -> Self {
        Self {
            default_hourly_rate: rate,
        }
    }

    pub fn calculate(
        &self,
        investment: f64,
        hours_saved_per_day: f64,
        hourly_rate: Option<f64>,
    ) -> Result<RoiReport> {
        let hourly_rate = hourly_rate.unwrap_or(self.default_hourly_rate);
        for (field, value) in [
            ("investment", investment),
            ("hours_saved_per_day", hours_saved_per_day),
            ("hourly_rate", hourly_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_input(
                    field,
                    format!("must be a non-negative number, got {}", value),
                ));
            }
        }

        let monthly_savings = hours_saved_per_day * hourly_rate * WORKING_DAYS_PER_MONTH;
        let yearly_savings = monthly_savings * 12.0;
        let payback_months = if monthly_savings > 0.0 {
            investment / monthly_savings
        } else {
            0.0
        };
        let roi_percent = if investment > 0.0 {
            (yearly_savings - investment) / investment * 100.0
        } else {
            0.0
        };

        Ok(RoiReport {
            investment,
            hours_saved_per_day,
            hourly_rate,
            monthly_savings,
            yearly_savings,
            payback_months,
            roi_percent,
            three_year_value: yearly_savings * 3.0 - investment,
        })
    }
}
