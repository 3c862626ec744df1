use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// late fee policy: a prorated percentage of the scheduled amount per period late
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateFeePolicy {
    /// fee rate charged per full period late
    pub rate: Rate,
    /// length of the proration period in days
    pub period_days: u32,
    /// days late tolerated before any fee applies
    pub grace_days: u32,
    pub enabled: bool,
}

impl LateFeePolicy {
    /// 2% of the scheduled amount per 30 days late
    pub fn standard() -> Self {
        Self {
            rate: Rate::from_percentage(2),
            period_days: 30,
            grace_days: 0,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::standard()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.period_days == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "late fee period must be at least one day".to_string(),
            });
        }
        if self.rate.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("late fee rate must not be negative: {}", self.rate),
            });
        }
        Ok(())
    }

    /// assess the fee for an installment paid `days_late` days after its due date
    pub fn assess(&self, scheduled_amount: Money, days_late: u32) -> LateFeeAssessment {
        if !self.enabled || days_late == 0 || days_late <= self.grace_days {
            return LateFeeAssessment {
                fee: Money::ZERO,
                days_late,
                days_charged: 0,
                fee_base: scheduled_amount,
                grace_applied: days_late > 0 && self.enabled,
            };
        }

        let days_charged = days_late - self.grace_days;

        // multiply before dividing so whole-period fees stay exact
        let fee = scheduled_amount.as_decimal() * self.rate.as_decimal() * Decimal::from(days_charged)
            / Decimal::from(self.period_days);

        LateFeeAssessment {
            fee: Money::from_decimal(fee),
            days_late,
            days_charged,
            fee_base: scheduled_amount,
            grace_applied: false,
        }
    }
}

impl Default for LateFeePolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// late fee assessment result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateFeeAssessment {
    pub fee: Money,
    pub days_late: u32,
    pub days_charged: u32,
    pub fee_base: Money,
    pub grace_applied: bool,
}
