use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::associate::Associate;
use crate::errors::{LedgerError, Result};
use crate::loan::{Installment, Loan};
use crate::types::{AssociateId, InstallmentId, InstallmentStatus, LoanId};

/// record access inside a store transaction
pub trait StoreTx {
    fn associate(&self, id: AssociateId) -> Result<Option<Associate>>;
    fn put_associate(&mut self, associate: Associate) -> Result<()>;

    fn loan(&self, id: LoanId) -> Result<Option<Loan>>;
    fn loan_by_number(&self, loan_number: &str) -> Result<Option<Loan>>;
    fn loans_for_associate(&self, associate_id: AssociateId) -> Result<Vec<Loan>>;
    fn put_loan(&mut self, loan: Loan) -> Result<()>;

    fn installment(&self, id: InstallmentId) -> Result<Option<Installment>>;
    /// every installment of a loan, ordered by sequence number
    fn installments_for_loan(&self, loan_id: LoanId) -> Result<Vec<Installment>>;
    fn installments_with_status(&self, status: InstallmentStatus) -> Result<Vec<Installment>>;
    fn put_installment(&mut self, installment: Installment) -> Result<()>;
}

/// persistence port for the ledger
///
/// `transaction` must run `f` atomically and in isolation from other
/// transactions: either every write made through the handle becomes visible
/// or, when `f` fails, none does.
pub trait LedgerStore {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T>;
}

impl<S: LedgerStore> LedgerStore for Arc<S> {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T>,
    {
        (**self).transaction(f)
    }
}

/// in-memory record tables
#[derive(Debug, Clone, Default)]
pub struct LedgerTables {
    associates: HashMap<AssociateId, Associate>,
    loans: HashMap<LoanId, Loan>,
    installments: HashMap<InstallmentId, Installment>,
}

impl StoreTx for LedgerTables {
    fn associate(&self, id: AssociateId) -> Result<Option<Associate>> {
        Ok(self.associates.get(&id).cloned())
    }

    fn put_associate(&mut self, associate: Associate) -> Result<()> {
        self.associates.insert(associate.id, associate);
        Ok(())
    }

    fn loan(&self, id: LoanId) -> Result<Option<Loan>> {
        Ok(self.loans.get(&id).cloned())
    }

    fn loan_by_number(&self, loan_number: &str) -> Result<Option<Loan>> {
        Ok(self
            .loans
            .values()
            .find(|l| l.loan_number == loan_number)
            .cloned())
    }

    fn loans_for_associate(&self, associate_id: AssociateId) -> Result<Vec<Loan>> {
        let mut loans: Vec<Loan> = self
            .loans
            .values()
            .filter(|l| l.associate_id == associate_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.loan_number.cmp(&b.loan_number)));
        Ok(loans)
    }

    fn put_loan(&mut self, loan: Loan) -> Result<()> {
        self.loans.insert(loan.id, loan);
        Ok(())
    }

    fn installment(&self, id: InstallmentId) -> Result<Option<Installment>> {
        Ok(self.installments.get(&id).cloned())
    }

    fn installments_for_loan(&self, loan_id: LoanId) -> Result<Vec<Installment>> {
        let mut rows: Vec<Installment> = self
            .installments
            .values()
            .filter(|i| i.loan_id == loan_id)
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.sequence);
        Ok(rows)
    }

    fn installments_with_status(&self, status: InstallmentStatus) -> Result<Vec<Installment>> {
        Ok(self
            .installments
            .values()
            .filter(|i| i.status == status)
            .cloned()
            .collect())
    }

    fn put_installment(&mut self, installment: Installment) -> Result<()> {
        self.installments.insert(installment.id, installment);
        Ok(())
    }
}

/// reference store: whole-table snapshot per transaction under a mutex
///
/// transactions are serialized, so concurrent writers never interleave.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<LedgerTables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan_count(&self) -> Result<usize> {
        Ok(self.lock()?.loans.len())
    }

    pub fn installment_count(&self) -> Result<usize> {
        Ok(self.lock()?.installments.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerTables>> {
        self.tables.lock().map_err(|_| LedgerError::Store {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl LedgerStore for InMemoryStore {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T>,
    {
        let mut tables = self.lock()?;
        let mut working = tables.clone();
        let tx: &mut dyn StoreTx = &mut working;
        let out = f(tx)?;
        *tables = working;
        Ok(out)
    }
}
