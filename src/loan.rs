use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::schedule::{validate_terms, AmortizationSchedule, ScheduledPayment};
use crate::types::{
    AssociateId, InstallmentId, InstallmentStatus, LoanDirection, LoanId, LoanStatus, PaymentMethod,
};

/// terms requested for a new loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub associate_id: AssociateId,
    pub direction: LoanDirection,
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    /// caller-chosen loan number; generated when absent
    pub loan_number: Option<String>,
    pub notes: Option<String>,
}

impl LoanTerms {
    pub fn new(
        associate_id: AssociateId,
        direction: LoanDirection,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            associate_id,
            direction,
            principal,
            annual_rate,
            term_months,
            start_date,
            loan_number: None,
            notes: None,
        }
    }

    pub fn loan_number(mut self, loan_number: impl Into<String>) -> Self {
        self.loan_number = Some(loan_number.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_terms(self.principal, self.annual_rate, self.term_months)?;
        if let Some(number) = &self.loan_number {
            if number.trim().is_empty() {
                return Err(LedgerError::InvalidLoanNumber {
                    loan_number: number.clone(),
                });
            }
        }
        Ok(())
    }
}

/// principal obligation between the company and one associate
///
/// the economics (principal, rate, term, monthly payment) are fixed at creation;
/// only `status` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub loan_number: String,
    pub associate_id: AssociateId,
    pub direction: LoanDirection,
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_amount: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LoanStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
}

impl Loan {
    /// build the loan row and its installment rows from a generated schedule
    pub fn originate(
        terms: &LoanTerms,
        loan_number: String,
        schedule: &AmortizationSchedule,
        now: DateTime<Utc>,
    ) -> (Loan, Vec<Installment>) {
        let loan = Loan {
            id: Uuid::new_v4(),
            loan_number,
            associate_id: terms.associate_id,
            direction: terms.direction,
            principal: schedule.principal,
            annual_rate: schedule.annual_rate,
            term_months: schedule.term_months,
            monthly_payment: schedule.monthly_payment,
            total_interest: schedule.total_interest,
            total_amount: schedule.total_amount,
            start_date: schedule.start_date,
            end_date: schedule.end_date,
            status: LoanStatus::Active,
            notes: terms.notes.clone(),
            created_at: now,
            status_changed_at: now,
        };

        let installments = schedule
            .payments
            .iter()
            .map(|row| Installment::scheduled(loan.id, row))
            .collect();

        (loan, installments)
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// move to a new status, rejecting anything but active -> terminal
    pub fn transition_to(&mut self, next: LoanStatus, now: DateTime<Utc>) -> Result<LoanStatus> {
        if !self.status.can_transition_to(next) {
            return Err(LedgerError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        let old = self.status;
        self.status = next;
        self.status_changed_at = now;
        Ok(old)
    }
}

/// one scheduled repayment of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub scheduled_amount: Money,
    pub actual_amount: Money,
    pub balance_after: Money,
    pub status: InstallmentStatus,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub receipt_reference: Option<String>,
    pub notes: Option<String>,
    pub days_late: u32,
    pub late_fee: Money,
}

impl Installment {
    /// fresh installment from a schedule row
    ///
    /// rows left with nothing to pay after early amortization start out paid.
    pub fn scheduled(loan_id: LoanId, row: &ScheduledPayment) -> Self {
        let status = if row.scheduled_amount.is_zero() {
            InstallmentStatus::Paid
        } else {
            InstallmentStatus::Pending
        };

        Self {
            id: Uuid::new_v4(),
            loan_id,
            sequence: row.sequence,
            due_date: row.due_date,
            principal_portion: row.principal_portion,
            interest_portion: row.interest_portion,
            scheduled_amount: row.scheduled_amount,
            actual_amount: Money::ZERO,
            balance_after: row.balance_after,
            status,
            paid_date: None,
            payment_method: None,
            payment_reference: None,
            receipt_reference: None,
            notes: None,
            days_late: 0,
            late_fee: Money::ZERO,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }

    /// scheduled amount not yet covered by recorded payments
    pub fn remaining_amount(&self) -> Money {
        (self.scheduled_amount - self.actual_amount).max(Money::ZERO)
    }

    /// mark as skipped by an operator
    pub fn skip(&mut self) -> Result<()> {
        match self.status {
            InstallmentStatus::Pending | InstallmentStatus::Partial => {
                self.status = InstallmentStatus::Skipped;
                Ok(())
            }
            from => Err(LedgerError::InvalidInstallmentTransition {
                from,
                to: InstallmentStatus::Skipped,
            }),
        }
    }
}
