use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{
    AssociateId, InstallmentId, InstallmentStatus, LoanDirection, LoanId, LoanStatus,
};

/// all events that can be emitted by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // associate events
    AssociateRegistered {
        associate_id: AssociateId,
        name: String,
        timestamp: DateTime<Utc>,
    },
    AssociateDeactivated {
        associate_id: AssociateId,
        timestamp: DateTime<Utc>,
    },

    // loan events
    LoanCreated {
        loan_id: LoanId,
        loan_number: String,
        associate_id: AssociateId,
        direction: LoanDirection,
        principal: Money,
        monthly_payment: Money,
        term_months: u32,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentRecorded {
        loan_id: LoanId,
        installment_id: InstallmentId,
        sequence: u32,
        amount: Money,
        paid_date: NaiveDate,
        status: InstallmentStatus,
        timestamp: DateTime<Utc>,
    },
    LateFeeAssessed {
        loan_id: LoanId,
        installment_id: InstallmentId,
        fee_amount: Money,
        days_late: u32,
        timestamp: DateTime<Utc>,
    },
    InstallmentSkipped {
        loan_id: LoanId,
        installment_id: InstallmentId,
        sequence: u32,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
