use chrono::{Days, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info};
use uuid::Uuid;

use crate::associate::{Associate, NewAssociate};
use crate::balance::{associate_balance, AssociateBalance};
use crate::config::LedgerConfig;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::loan::{Installment, Loan, LoanTerms};
use crate::payments::{LateFeeAssessment, PaymentRecorder, PaymentRequest};
use crate::schedule::AmortizationSchedule;
use crate::statement::LoanStatement;
use crate::store::{LedgerStore, StoreTx};
use crate::types::{AssociateId, InstallmentId, InstallmentStatus, LoanId, LoanStatus};

const LOAN_NUMBER_ATTEMPTS: usize = 8;

/// result of recording a payment through the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub installment: Installment,
    pub late_fee: LateFeeAssessment,
    pub loan_status: LoanStatus,
    /// set when this payment moved the loan to paid-off
    pub loan_closed: bool,
}

/// loan ledger facade over a record store
///
/// every operation reads what it needs from the store inside one transaction and
/// writes its results back in the same transaction; no ledger state is cached here.
pub struct LoanLedger<S: LedgerStore> {
    store: S,
    config: LedgerConfig,
    recorder: PaymentRecorder,
    events: EventStore,
}

impl<S: LedgerStore> LoanLedger<S> {
    pub fn new(store: S, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        let recorder = PaymentRecorder::new(config.late_fee.clone());

        Ok(Self {
            store,
            config,
            recorder,
            events: EventStore::new(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // associates

    pub fn register_associate(
        &mut self,
        request: NewAssociate,
        time_provider: &SafeTimeProvider,
    ) -> Result<Associate> {
        let now = time_provider.now();
        let associate = Associate::register(request, now)?;

        let stored = associate.clone();
        self.store.transaction(move |tx| tx.put_associate(stored))?;

        info!(associate_id = %associate.id, name = %associate.name, "associate registered");
        self.events.emit(Event::AssociateRegistered {
            associate_id: associate.id,
            name: associate.name.clone(),
            timestamp: now,
        });

        Ok(associate)
    }

    pub fn deactivate_associate(
        &mut self,
        associate_id: AssociateId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Associate> {
        let now = time_provider.now();

        let (associate, changed) = self.store.transaction(|tx| {
            let mut associate = require_associate(tx, associate_id)?;
            let changed = associate.active;
            associate.deactivate(now);
            tx.put_associate(associate.clone())?;
            Ok((associate, changed))
        })?;

        if changed {
            info!(associate_id = %associate_id, "associate deactivated");
            self.events.emit(Event::AssociateDeactivated {
                associate_id,
                timestamp: now,
            });
        }

        Ok(associate)
    }

    pub fn associate(&self, associate_id: AssociateId) -> Result<Associate> {
        self.store.transaction(|tx| require_associate(tx, associate_id))
    }

    // loans

    /// validate terms, generate the schedule and persist loan plus installments together
    pub fn create_loan(&mut self, terms: LoanTerms, time_provider: &SafeTimeProvider) -> Result<Loan> {
        terms.validate()?;

        let schedule = AmortizationSchedule::generate(
            terms.principal,
            terms.annual_rate,
            terms.term_months,
            terms.start_date,
        )?;
        let now = time_provider.now();
        let prefix = self.config.numbering.prefix.clone();

        let loan = self.store.transaction(|tx| {
            let associate = require_associate(tx, terms.associate_id)?;
            if !associate.active {
                return Err(LedgerError::AssociateInactive { id: associate.id });
            }

            let loan_number = match &terms.loan_number {
                Some(requested) => {
                    let requested = requested.trim().to_string();
                    if tx.loan_by_number(&requested)?.is_some() {
                        return Err(LedgerError::DuplicateLoanNumber { loan_number: requested });
                    }
                    requested
                }
                None => next_loan_number(tx, &prefix)?,
            };

            let (loan, installments) = Loan::originate(&terms, loan_number, &schedule, now);
            tx.put_loan(loan.clone())?;
            for installment in installments {
                tx.put_installment(installment)?;
            }
            Ok(loan)
        })?;

        info!(
            loan_id = %loan.id,
            loan_number = %loan.loan_number,
            associate_id = %loan.associate_id,
            principal = %loan.principal,
            monthly_payment = %loan.monthly_payment,
            term_months = loan.term_months,
            "loan created"
        );
        self.events.emit(Event::LoanCreated {
            loan_id: loan.id,
            loan_number: loan.loan_number.clone(),
            associate_id: loan.associate_id,
            direction: loan.direction,
            principal: loan.principal,
            monthly_payment: loan.monthly_payment,
            term_months: loan.term_months,
            timestamp: now,
        });

        Ok(loan)
    }

    /// record an actual payment against an installment, closing the loan when it is fully paid
    pub fn record_payment(
        &mut self,
        installment_id: InstallmentId,
        payment: PaymentRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentOutcome> {
        payment.validate()?;
        let now = time_provider.now();
        let recorder = &self.recorder;

        let recorded = self.store.transaction(|tx| {
            let installment = tx
                .installment(installment_id)?
                .ok_or(LedgerError::InstallmentNotFound { id: installment_id })?;
            let loan = require_loan(tx, installment.loan_id)?;
            let rows = tx.installments_for_loan(loan.id)?;

            let recorded = recorder.record(&loan, &rows, installment_id, &payment, now)?;

            tx.put_installment(recorded.applied.installment.clone())?;
            if recorded.closed_loan {
                tx.put_loan(recorded.loan.clone())?;
            }
            Ok(recorded)
        })?;

        let installment = recorded.applied.installment;
        let late_fee = recorded.applied.late_fee;

        debug!(
            installment_id = %installment.id,
            amount = %installment.actual_amount,
            status = ?installment.status,
            "payment recorded"
        );
        self.events.emit(Event::PaymentRecorded {
            loan_id: installment.loan_id,
            installment_id: installment.id,
            sequence: installment.sequence,
            amount: installment.actual_amount,
            paid_date: payment.paid_date,
            status: installment.status,
            timestamp: now,
        });

        if late_fee.fee.is_positive() {
            self.events.emit(Event::LateFeeAssessed {
                loan_id: installment.loan_id,
                installment_id: installment.id,
                fee_amount: late_fee.fee,
                days_late: late_fee.days_late,
                timestamp: now,
            });
        }

        if recorded.closed_loan {
            info!(loan_id = %recorded.loan.id, loan_number = %recorded.loan.loan_number, "loan paid off");
            self.events.emit(Event::StatusChanged {
                loan_id: recorded.loan.id,
                old_status: LoanStatus::Active,
                new_status: LoanStatus::PaidOff,
                reason: "all installments paid".to_string(),
                timestamp: now,
            });
        }

        Ok(PaymentOutcome {
            installment,
            late_fee,
            loan_status: recorded.loan.status,
            loan_closed: recorded.closed_loan,
        })
    }

    /// operator action: mark an open installment of an active loan as skipped
    pub fn skip_installment(
        &mut self,
        installment_id: InstallmentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Installment> {
        let now = time_provider.now();

        let installment = self.store.transaction(|tx| {
            let mut installment = tx
                .installment(installment_id)?
                .ok_or(LedgerError::InstallmentNotFound { id: installment_id })?;
            let loan = require_loan(tx, installment.loan_id)?;
            if !loan.is_active() {
                return Err(LedgerError::LoanNotActive { status: loan.status });
            }
            installment.skip()?;
            tx.put_installment(installment.clone())?;
            Ok(installment)
        })?;

        info!(installment_id = %installment.id, sequence = installment.sequence, "installment skipped");
        self.events.emit(Event::InstallmentSkipped {
            loan_id: installment.loan_id,
            installment_id: installment.id,
            sequence: installment.sequence,
            timestamp: now,
        });

        Ok(installment)
    }

    /// operator action: declare the loan in default
    pub fn mark_defaulted(
        &mut self,
        loan_id: LoanId,
        reason: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<Loan> {
        self.change_status(loan_id, LoanStatus::Defaulted, reason, time_provider)
    }

    /// operator action: cancel the loan
    pub fn cancel_loan(
        &mut self,
        loan_id: LoanId,
        reason: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<Loan> {
        self.change_status(loan_id, LoanStatus::Cancelled, reason, time_provider)
    }

    fn change_status(
        &mut self,
        loan_id: LoanId,
        new_status: LoanStatus,
        reason: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<Loan> {
        let now = time_provider.now();

        let (loan, old_status) = self.store.transaction(|tx| {
            let mut loan = require_loan(tx, loan_id)?;
            let old_status = loan.transition_to(new_status, now)?;
            tx.put_loan(loan.clone())?;
            Ok((loan, old_status))
        })?;

        info!(loan_id = %loan_id, ?old_status, ?new_status, reason, "loan status changed");
        self.events.emit(Event::StatusChanged {
            loan_id,
            old_status,
            new_status,
            reason: reason.to_string(),
            timestamp: now,
        });

        Ok(loan)
    }

    // queries

    pub fn loan(&self, loan_id: LoanId) -> Result<Loan> {
        self.store.transaction(|tx| require_loan(tx, loan_id))
    }

    pub fn associate_loans(&self, associate_id: AssociateId) -> Result<Vec<Loan>> {
        self.store.transaction(|tx| {
            require_associate(tx, associate_id)?;
            tx.loans_for_associate(associate_id)
        })
    }

    /// installments of a loan ordered by sequence number
    pub fn loan_schedule(&self, loan_id: LoanId) -> Result<Vec<Installment>> {
        self.store.transaction(|tx| {
            require_loan(tx, loan_id)?;
            tx.installments_for_loan(loan_id)
        })
    }

    /// pending installments whose due date has passed
    pub fn overdue_installments(&self, time_provider: &SafeTimeProvider) -> Result<Vec<Installment>> {
        let today = time_provider.now().date_naive();
        self.pending_between(None, |due| due < today)
    }

    /// pending installments due from today through `within_days` days ahead
    ///
    /// uses the configured window when `within_days` is not given.
    pub fn upcoming_installments(
        &self,
        within_days: Option<u32>,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<Installment>> {
        let today = time_provider.now().date_naive();
        let days = within_days.unwrap_or(self.config.upcoming_window_days);
        let horizon = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        self.pending_between(Some(days), |due| due >= today && due <= horizon)
    }

    fn pending_between<F>(&self, window: Option<u32>, keep: F) -> Result<Vec<Installment>>
    where
        F: Fn(NaiveDate) -> bool,
    {
        let mut rows: Vec<Installment> = self
            .store
            .transaction(|tx| tx.installments_with_status(InstallmentStatus::Pending))?
            .into_iter()
            .filter(|i| keep(i.due_date))
            .collect();
        rows.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.sequence.cmp(&b.sequence)));

        debug!(count = rows.len(), ?window, "pending installments selected");
        Ok(rows)
    }

    /// net exposure between the company and an associate, recomputed from current rows
    pub fn associate_balance(&self, associate_id: AssociateId) -> Result<AssociateBalance> {
        let (loans, installments) = self.store.transaction(|tx| {
            require_associate(tx, associate_id)?;
            let loans = tx.loans_for_associate(associate_id)?;
            let mut installments = Vec::new();
            for loan in loans.iter().filter(|l| l.is_active()) {
                installments.extend(tx.installments_for_loan(loan.id)?);
            }
            Ok((loans, installments))
        })?;

        Ok(associate_balance(associate_id, &loans, &installments))
    }

    pub fn loan_statement(&self, loan_id: LoanId, time_provider: &SafeTimeProvider) -> Result<LoanStatement> {
        let today = time_provider.now().date_naive();
        let (loan, installments) = self.store.transaction(|tx| {
            let loan = require_loan(tx, loan_id)?;
            let installments = tx.installments_for_loan(loan_id)?;
            Ok((loan, installments))
        })?;

        Ok(LoanStatement::build(loan, installments, today))
    }

    // events

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}

fn require_associate(tx: &mut dyn StoreTx, id: AssociateId) -> Result<Associate> {
    tx.associate(id)?.ok_or(LedgerError::AssociateNotFound { id })
}

fn require_loan(tx: &mut dyn StoreTx, id: LoanId) -> Result<Loan> {
    tx.loan(id)?.ok_or(LedgerError::LoanNotFound { id })
}

fn next_loan_number(tx: &mut dyn StoreTx, prefix: &str) -> Result<String> {
    for _ in 0..LOAN_NUMBER_ATTEMPTS {
        let candidate = format!("{}-{}", prefix, Uuid::new_v4().simple().to_string()[..8].to_uppercase());
        if tx.loan_by_number(&candidate)?.is_none() {
            return Ok(candidate);
        }
    }
    Err(LedgerError::Store {
        message: "could not allocate a unique loan number".to_string(),
    })
}
