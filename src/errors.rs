use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::{AssociateId, InstallmentId, InstallmentStatus, LoanId, LoanStatus};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid principal: {amount} (must be positive)")]
    InvalidPrincipal {
        amount: Money,
    },

    #[error("invalid term: {months} months (must be at least 1)")]
    InvalidTerm {
        months: u32,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid associate: {message}")]
    InvalidAssociate {
        message: String,
    },

    #[error("associate not found: {id}")]
    AssociateNotFound {
        id: AssociateId,
    },

    #[error("associate is inactive: {id}")]
    AssociateInactive {
        id: AssociateId,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("installment not found: {id}")]
    InstallmentNotFound {
        id: InstallmentId,
    },

    #[error("loan number already in use: {loan_number}")]
    DuplicateLoanNumber {
        loan_number: String,
    },

    #[error("invalid loan number: {loan_number:?}")]
    InvalidLoanNumber {
        loan_number: String,
    },

    #[error("loan {id} is paid off; installment {sequence} cannot become {status:?}")]
    LoanSettled {
        id: LoanId,
        sequence: u32,
        status: InstallmentStatus,
    },

    #[error("loan not active: current status is {status:?}")]
    LoanNotActive {
        status: LoanStatus,
    },

    #[error("invalid loan status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: LoanStatus,
        to: LoanStatus,
    },

    #[error("invalid installment status transition: {from:?} -> {to:?}")]
    InvalidInstallmentTransition {
        from: InstallmentStatus,
        to: InstallmentStatus,
    },

    #[error("schedule invariant violated: {message}")]
    ScheduleInvariant {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("store error: {message}")]
    Store {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
