use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::{Installment, Loan};
use crate::schedule::days_late;
use crate::types::{InstallmentId, InstallmentStatus, LoanStatus};

use super::late_fee::{LateFeeAssessment, LateFeePolicy};
use super::PaymentRequest;

/// outcome of applying a payment to one installment
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPayment {
    pub installment: Installment,
    pub previous_status: InstallmentStatus,
    pub late_fee: LateFeeAssessment,
}

/// outcome of recording a payment against a loan
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPayment {
    pub applied: AppliedPayment,
    pub loan: Loan,
    /// set when this payment moved the loan to paid-off
    pub closed_loan: bool,
}

/// computes lateness, late fees and statuses for repayments
#[derive(Debug, Clone)]
pub struct PaymentRecorder {
    policy: LateFeePolicy,
}

impl PaymentRecorder {
    pub fn new(policy: LateFeePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LateFeePolicy {
        &self.policy
    }

    /// apply a payment to an installment, replacing any previously recorded payment
    pub fn apply(&self, installment: &Installment, payment: &PaymentRequest) -> Result<AppliedPayment> {
        payment.validate()?;

        let days_late = days_late(installment.due_date, payment.paid_date);
        let late_fee = self.policy.assess(installment.scheduled_amount, days_late);
        let status = payment_status(payment.amount, installment.scheduled_amount);

        let mut updated = installment.clone();
        updated.actual_amount = payment.amount;
        updated.paid_date = Some(payment.paid_date);
        updated.payment_method = Some(payment.method.clone());
        updated.payment_reference = payment.reference.clone();
        updated.receipt_reference = payment.receipt_reference.clone();
        updated.notes = payment.notes.clone();
        updated.days_late = days_late;
        updated.late_fee = late_fee.fee;
        updated.status = status;

        debug!(
            installment_id = %installment.id,
            sequence = installment.sequence,
            amount = %payment.amount,
            days_late,
            late_fee = %late_fee.fee,
            status = ?status,
            "payment applied to installment"
        );

        Ok(AppliedPayment {
            installment: updated,
            previous_status: installment.status,
            late_fee,
        })
    }

    /// apply a payment and re-evaluate whether the loan is now paid off
    ///
    /// `installments` must hold every installment of `loan`; closure is decided
    /// from all of them, with the target row taking its new status. a paid-off loan
    /// only accepts corrections that leave every installment paid.
    pub fn record(
        &self,
        loan: &Loan,
        installments: &[Installment],
        installment_id: InstallmentId,
        payment: &PaymentRequest,
        now: DateTime<Utc>,
    ) -> Result<RecordedPayment> {
        match loan.status {
            LoanStatus::Active | LoanStatus::PaidOff => {}
            status => return Err(LedgerError::LoanNotActive { status }),
        }

        let target = installments
            .iter()
            .find(|i| i.id == installment_id && i.loan_id == loan.id)
            .ok_or(LedgerError::InstallmentNotFound { id: installment_id })?;

        let applied = self.apply(target, payment)?;

        let mut loan = loan.clone();
        let all_paid = fully_paid(installments.iter().map(|i| {
            if i.id == installment_id {
                applied.installment.status
            } else {
                i.status
            }
        }));

        if loan.status == LoanStatus::PaidOff && !all_paid {
            warn!(
                loan_id = %loan.id,
                installment_id = %installment_id,
                status = ?applied.installment.status,
                "rejected correction that would reopen a paid-off loan"
            );
            return Err(LedgerError::LoanSettled {
                id: loan.id,
                sequence: target.sequence,
                status: applied.installment.status,
            });
        }

        let mut closed_loan = false;
        if loan.status == LoanStatus::Active && all_paid {
            loan.transition_to(LoanStatus::PaidOff, now)?;
            closed_loan = true;
        }

        Ok(RecordedPayment {
            applied,
            loan,
            closed_loan,
        })
    }
}

impl Default for PaymentRecorder {
    fn default() -> Self {
        Self::new(LateFeePolicy::standard())
    }
}

/// paid when the scheduled amount is covered, partial when something was paid
pub fn payment_status(actual: Money, scheduled: Money) -> InstallmentStatus {
    if actual >= scheduled {
        InstallmentStatus::Paid
    } else if actual.is_positive() {
        InstallmentStatus::Partial
    } else {
        InstallmentStatus::Pending
    }
}

/// true when there is at least one installment and every one is paid
pub fn fully_paid<I>(statuses: I) -> bool
where
    I: IntoIterator<Item = InstallmentStatus>,
{
    let mut any = false;
    for status in statuses {
        if status != InstallmentStatus::Paid {
            return false;
        }
        any = true;
    }
    any
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::loan::LoanTerms;
    use crate::schedule::AmortizationSchedule;
    use crate::types::{LoanDirection, PaymentMethod};
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn loan_with_schedule(principal: i64, term: u32) -> (Loan, Vec<Installment>) {
        let terms = LoanTerms::new(
            Uuid::new_v4(),
            LoanDirection::ToCompany,
            Money::from_major(principal),
            Rate::ZERO,
            term,
            date(2024, 1, 1),
        );
        let schedule = AmortizationSchedule::generate(
            terms.principal,
            terms.annual_rate,
            terms.term_months,
            terms.start_date,
        )
        .unwrap();
        Loan::originate(&terms, "LN-TEST".to_string(), &schedule, now())
    }

    fn pay(amount: Money, paid: NaiveDate) -> PaymentRequest {
        PaymentRequest::new(amount, paid, PaymentMethod::BankTransfer)
    }

    #[test]
    fn test_on_time_full_payment() {
        let (_, installments) = loan_with_schedule(3_000, 3);
        let inst = &installments[0];
        let recorder = PaymentRecorder::default();

        let applied = recorder
            .apply(inst, &pay(inst.scheduled_amount, inst.due_date).reference("TRX-1").receipt("RC-1"))
            .unwrap();

        assert_eq!(applied.installment.status, InstallmentStatus::Paid);
        assert_eq!(applied.installment.days_late, 0);
        assert_eq!(applied.installment.late_fee, Money::ZERO);
        assert_eq!(applied.installment.paid_date, Some(inst.due_date));
        assert_eq!(applied.installment.payment_reference.as_deref(), Some("TRX-1"));
        assert_eq!(applied.installment.receipt_reference.as_deref(), Some("RC-1"));
        assert_eq!(applied.previous_status, InstallmentStatus::Pending);
    }

    #[test]
    fn test_late_payment_fee() {
        let (_, installments) = loan_with_schedule(3_000, 3);
        let inst = &installments[0];
        assert_eq!(inst.scheduled_amount, Money::from_major(1_000));

        let paid = inst.due_date + chrono::Duration::days(45);
        let applied = PaymentRecorder::default()
            .apply(inst, &pay(Money::from_major(1_000), paid))
            .unwrap();

        assert_eq!(applied.installment.days_late, 45);
        assert_eq!(applied.installment.late_fee, Money::from_major(30));
        assert_eq!(applied.late_fee.days_charged, 45);
        assert_eq!(applied.installment.status, InstallmentStatus::Paid);
    }

    #[test]
    fn test_early_payment_is_not_late() {
        let (_, installments) = loan_with_schedule(3_000, 3);
        let inst = &installments[1];
        let applied = PaymentRecorder::default()
            .apply(inst, &pay(inst.scheduled_amount, date(2024, 1, 20)))
            .unwrap();

        assert_eq!(applied.installment.days_late, 0);
        assert_eq!(applied.installment.late_fee, Money::ZERO);
    }

    #[test]
    fn test_status_from_amount() {
        let scheduled = Money::from_major(1_000);
        assert_eq!(payment_status(Money::from_major(1_200), scheduled), InstallmentStatus::Paid);
        assert_eq!(payment_status(scheduled, scheduled), InstallmentStatus::Paid);
        assert_eq!(payment_status(Money::from_major(400), scheduled), InstallmentStatus::Partial);
        assert_eq!(payment_status(Money::ZERO, scheduled), InstallmentStatus::Pending);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let (_, installments) = loan_with_schedule(3_000, 3);
        let result = PaymentRecorder::default().apply(&installments[0], &pay(Money::from_major(-5), date(2024, 2, 1)));
        assert!(matches!(result, Err(LedgerError::InvalidPaymentAmount { .. })));
    }

    #[test]
    fn test_rerecording_is_idempotent() {
        let (_, installments) = loan_with_schedule(3_000, 3);
        let recorder = PaymentRecorder::default();
        let payment = pay(Money::from_major(1_000), date(2024, 2, 11));

        let first = recorder.apply(&installments[0], &payment).unwrap();
        let second = recorder.apply(&first.installment, &payment).unwrap();

        assert_eq!(first.installment, second.installment);
        assert_eq!(second.previous_status, InstallmentStatus::Paid);
    }

    #[test]
    fn test_last_payment_closes_loan() {
        let (loan, mut installments) = loan_with_schedule(2_000, 2);
        let recorder = PaymentRecorder::default();

        let first = recorder
            .record(&loan, &installments, installments[0].id, &pay(Money::from_major(1_000), date(2024, 2, 1)), now())
            .unwrap();
        assert!(!first.closed_loan);
        assert_eq!(first.loan.status, LoanStatus::Active);
        installments[0] = first.applied.installment;

        let second = recorder
            .record(&loan, &installments, installments[1].id, &pay(Money::from_major(1_000), date(2024, 3, 1)), now())
            .unwrap();
        assert!(second.closed_loan);
        assert_eq!(second.loan.status, LoanStatus::PaidOff);
        assert_eq!(second.loan.status_changed_at, now());
    }

    #[test]
    fn test_partial_last_payment_keeps_loan_active() {
        let (loan, mut installments) = loan_with_schedule(2_000, 2);
        let recorder = PaymentRecorder::default();
        installments[0].status = InstallmentStatus::Paid;

        let result = recorder
            .record(&loan, &installments, installments[1].id, &pay(Money::from_major(999), date(2024, 3, 1)), now())
            .unwrap();

        assert_eq!(result.applied.installment.status, InstallmentStatus::Partial);
        assert!(!result.closed_loan);
        assert_eq!(result.loan.status, LoanStatus::Active);
    }

    #[test]
    fn test_out_of_order_recording_closes_loan() {
        let (loan, mut installments) = loan_with_schedule(3_000, 3);
        let recorder = PaymentRecorder::default();

        for idx in [2usize, 0] {
            let recorded = recorder
                .record(&loan, &installments, installments[idx].id, &pay(Money::from_major(1_000), date(2024, 2, 1)), now())
                .unwrap();
            assert!(!recorded.closed_loan);
            installments[idx] = recorded.applied.installment;
        }

        let last = recorder
            .record(&loan, &installments, installments[1].id, &pay(Money::from_major(1_000), date(2024, 3, 1)), now())
            .unwrap();
        assert!(last.closed_loan);
    }

    #[test]
    fn test_skipped_installment_blocks_closure() {
        let (loan, mut installments) = loan_with_schedule(2_000, 2);
        installments[0].status = InstallmentStatus::Skipped;

        let result = PaymentRecorder::default()
            .record(&loan, &installments, installments[1].id, &pay(Money::from_major(1_000), date(2024, 3, 1)), now())
            .unwrap();
        assert!(!result.closed_loan);
    }

    #[test]
    fn test_unknown_installment() {
        let (loan, installments) = loan_with_schedule(2_000, 2);
        let missing = Uuid::new_v4();
        let result = PaymentRecorder::default().record(
            &loan,
            &installments,
            missing,
            &pay(Money::from_major(1_000), date(2024, 3, 1)),
            now(),
        );
        assert!(matches!(result, Err(LedgerError::InstallmentNotFound { id }) if id == missing));
    }

    #[test]
    fn test_cancelled_loan_rejects_payment() {
        let (mut loan, installments) = loan_with_schedule(2_000, 2);
        loan.transition_to(LoanStatus::Cancelled, now()).unwrap();

        let result = PaymentRecorder::default().record(
            &loan,
            &installments,
            installments[0].id,
            &pay(Money::from_major(1_000), date(2024, 2, 1)),
            now(),
        );
        assert!(matches!(result, Err(LedgerError::LoanNotActive { status: LoanStatus::Cancelled })));
    }

    #[test]
    fn test_correction_on_paid_off_loan() {
        let (mut loan, mut installments) = loan_with_schedule(2_000, 2);
        for inst in installments.iter_mut() {
            inst.status = InstallmentStatus::Paid;
            inst.actual_amount = inst.scheduled_amount;
        }
        loan.transition_to(LoanStatus::PaidOff, now()).unwrap();
        let recorder = PaymentRecorder::default();

        let short = recorder.record(
            &loan,
            &installments,
            installments[1].id,
            &pay(Money::from_major(500), date(2024, 3, 1)),
            now(),
        );
        assert!(matches!(
            short,
            Err(LedgerError::LoanSettled { sequence: 2, status: InstallmentStatus::Partial, .. })
        ));

        // a correction that keeps the row paid is still accepted
        let fixed = recorder
            .record(
                &loan,
                &installments,
                installments[1].id,
                &pay(Money::from_major(1_000), date(2024, 3, 1)).reference("TRF-FIX"),
                now(),
            )
            .unwrap();
        assert_eq!(fixed.applied.installment.status, InstallmentStatus::Paid);
        assert_eq!(fixed.applied.installment.payment_reference.as_deref(), Some("TRF-FIX"));
        assert_eq!(fixed.loan.status, LoanStatus::PaidOff);
        assert!(!fixed.closed_loan);
    }

    #[test]
    fn test_fully_paid_requires_rows() {
        assert!(!fully_paid(Vec::<InstallmentStatus>::new()));
        assert!(fully_paid(vec![InstallmentStatus::Paid, InstallmentStatus::Paid]));
        assert!(!fully_paid(vec![InstallmentStatus::Paid, InstallmentStatus::Partial]));
    }
}
