use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

use super::amortization::monthly_payment;
use super::calendar::add_months;

/// one row of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub opening_balance: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub scheduled_amount: Money,
    pub balance_after: Money,
}

/// amortization schedule derived from loan terms
#[derive(Debug, Clone, PartialEq)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_payment: Money,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_amount: Money,
}

impl AmortizationSchedule {
    /// generate and verify a schedule
    pub fn generate(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Result<Self> {
        let monthly_payment = monthly_payment(principal, annual_rate, term_months)?;
        let payments = build_rows(principal, annual_rate, term_months, start_date, monthly_payment)?;
        verify_schedule(principal, term_months, &payments)?;

        let total_interest: Money = payments.iter().map(|p| p.interest_portion).sum();
        let total_amount: Money = payments.iter().map(|p| p.scheduled_amount).sum();

        Ok(Self {
            principal,
            annual_rate,
            term_months,
            start_date,
            end_date: add_months(start_date, term_months)?,
            monthly_payment,
            payments,
            total_interest,
            total_amount,
        })
    }

    pub fn get_payment(&self, sequence: u32) -> Option<&ScheduledPayment> {
        sequence
            .checked_sub(1)
            .and_then(|idx| self.payments.get(idx as usize))
    }
}

/// ordered installments for the given terms
pub fn generate_schedule(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    start_date: NaiveDate,
) -> Result<Vec<ScheduledPayment>> {
    AmortizationSchedule::generate(principal, annual_rate, term_months, start_date)
        .map(|schedule| schedule.payments)
}

fn build_rows(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    start_date: NaiveDate,
    monthly_payment: Money,
) -> Result<Vec<ScheduledPayment>> {
    let monthly_rate: Decimal = annual_rate.monthly_rate().as_decimal();
    let mut rows = Vec::with_capacity(term_months as usize);
    let mut balance = principal;

    for sequence in 1..=term_months {
        let interest_portion = if annual_rate.is_zero() {
            Money::ZERO
        } else {
            balance * monthly_rate
        };

        let mut principal_portion = monthly_payment - interest_portion;
        let mut scheduled_amount = monthly_payment;

        // tiny principals can amortize early; never take more than what is left
        if principal_portion > balance {
            principal_portion = balance;
            scheduled_amount = principal_portion + interest_portion;
        }

        let opening_balance = balance;
        balance = (balance - principal_portion).max(Money::ZERO);

        rows.push(ScheduledPayment {
            sequence,
            due_date: add_months(start_date, sequence)?,
            opening_balance,
            principal_portion,
            interest_portion,
            scheduled_amount,
            balance_after: balance,
        });
    }

    apply_final_installment_correction(&mut rows, principal);
    Ok(rows)
}

/// fold the rounding residual into the final installment
///
/// the last row's principal becomes whatever the earlier rows left unamortized,
/// its scheduled amount is recomputed from that and its closing balance is zero.
pub fn apply_final_installment_correction(rows: &mut [ScheduledPayment], principal: Money) {
    let Some((last, earlier)) = rows.split_last_mut() else {
        return;
    };

    let amortized: Money = earlier.iter().map(|p| p.principal_portion).sum();
    let residual = principal - amortized;

    last.principal_portion = residual;
    last.scheduled_amount = residual + last.interest_portion;
    last.balance_after = Money::ZERO;
}

/// consistency check: a schedule that fails here is a defect, not user input
pub fn verify_schedule(principal: Money, term_months: u32, rows: &[ScheduledPayment]) -> Result<()> {
    if rows.len() != term_months as usize {
        return Err(LedgerError::ScheduleInvariant {
            message: format!("expected {} installments, found {}", term_months, rows.len()),
        });
    }

    for (idx, row) in rows.iter().enumerate() {
        let expected = idx as u32 + 1;
        if row.sequence != expected {
            return Err(LedgerError::ScheduleInvariant {
                message: format!("sequence {} found at position {}", row.sequence, expected),
            });
        }
        if row.principal_portion.is_negative() {
            return Err(LedgerError::ScheduleInvariant {
                message: format!("installment {} has negative principal {}", row.sequence, row.principal_portion),
            });
        }
    }

    if let Some(last) = rows.last() {
        if !last.balance_after.is_zero() {
            return Err(LedgerError::ScheduleInvariant {
                message: format!("final balance is {}, expected 0", last.balance_after),
            });
        }
        if last.scheduled_amount != last.principal_portion + last.interest_portion {
            return Err(LedgerError::ScheduleInvariant {
                message: "final installment amount does not equal principal plus interest".to_string(),
            });
        }
    }

    let amortized: Money = rows.iter().map(|p| p.principal_portion).sum();
    let tolerance = Money::CENT * Decimal::from(term_months);
    if (amortized - principal).abs() > tolerance {
        return Err(LedgerError::ScheduleInvariant {
            message: format!("principal portions sum to {}, loan principal is {}", amortized, principal),
        });
    }

    Ok(())
}
