pub mod late_fee;
pub mod recorder;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::PaymentMethod;

pub use late_fee::{LateFeeAssessment, LateFeePolicy};
pub use recorder::{fully_paid, payment_status, AppliedPayment, PaymentRecorder, RecordedPayment};

/// an actual repayment made against one installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Money,
    pub paid_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub receipt_reference: Option<String>,
    pub notes: Option<String>,
}

impl PaymentRequest {
    pub fn new(amount: Money, paid_date: NaiveDate, method: PaymentMethod) -> Self {
        Self {
            amount,
            paid_date,
            method,
            reference: None,
            receipt_reference: None,
            notes: None,
        }
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn receipt(mut self, receipt_reference: impl Into<String>) -> Self {
        self.receipt_reference = Some(receipt_reference.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount.is_negative() {
            return Err(LedgerError::InvalidPaymentAmount { amount: self.amount });
        }
        Ok(())
    }
}
