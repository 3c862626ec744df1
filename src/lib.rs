pub mod associate;
pub mod balance;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod loan;
pub mod payments;
pub mod schedule;
pub mod statement;
pub mod store;
pub mod types;

// re-export key types
pub use associate::{Associate, ContactDetails, NewAssociate};
pub use balance::{associate_balance, AssociateBalance, LoanExposure};
pub use config::{LedgerConfig, LoanNumbering};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{LoanLedger, PaymentOutcome};
pub use loan::{Installment, Loan, LoanTerms};
pub use payments::{LateFeeAssessment, LateFeePolicy, PaymentRecorder, PaymentRequest};
pub use schedule::{monthly_payment, AmortizationSchedule, ScheduledPayment};
pub use statement::{LoanStatement, NextDue, StatementTotals};
pub use store::{InMemoryStore, LedgerStore, StoreTx};
pub use types::{
    AssociateId, InstallmentId, InstallmentStatus, LoanDirection, LoanId, LoanStatus,
    PaymentMethod,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
