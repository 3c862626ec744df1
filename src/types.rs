use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for an associate
pub type AssociateId = Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a scheduled installment
pub type InstallmentId = Uuid;

/// which party is the debtor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDirection {
    /// associate owes the company
    ToCompany,
    /// company owes the associate
    FromCompany,
}

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// performing, installments outstanding
    Active,
    /// every installment paid
    PaidOff,
    /// declared in default by an operator
    Defaulted,
    /// cancelled by an operator
    Cancelled,
}

impl LoanStatus {
    /// whether the engine may move a loan from `self` to `next`
    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Active, LoanStatus::PaidOff)
                | (LoanStatus::Active, LoanStatus::Defaulted)
                | (LoanStatus::Active, LoanStatus::Cancelled)
        )
    }
}

/// installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Partial,
    Skipped,
}

impl InstallmentStatus {
    /// statuses whose actual amount counts as money received
    pub fn counts_as_paid(&self) -> bool {
        matches!(self, InstallmentStatus::Paid | InstallmentStatus::Partial)
    }
}

/// how a repayment was made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Check,
    Card,
    PayrollDeduction,
    Other(String),
}
