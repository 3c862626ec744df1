use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::decimal::Money;
use crate::loan::{Installment, Loan};
use crate::types::{AssociateId, LoanDirection, LoanId};

/// exposure of one active loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanExposure {
    pub loan_id: LoanId,
    pub loan_number: String,
    pub direction: LoanDirection,
    pub principal: Money,
    pub paid_so_far: Money,
    /// principal minus payments; negative when overpaid
    pub outstanding: Money,
    /// late fees assessed so far, tracked apart from the principal balance
    pub late_fees: Money,
}

impl LoanExposure {
    pub fn is_overpaid(&self) -> bool {
        self.outstanding.is_negative()
    }
}

/// net position between the company and one associate across active loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociateBalance {
    pub associate_id: AssociateId,
    pub company_owes_associate: Money,
    pub associate_owes_company: Money,
    /// company_owes_associate - associate_owes_company
    pub net: Money,
    pub loans: Vec<LoanExposure>,
}

impl AssociateBalance {
    pub fn has_overpayment(&self) -> bool {
        self.loans.iter().any(LoanExposure::is_overpaid)
    }
}

/// compute an associate's balance from the supplied loans and installments
///
/// loans of other associates and loans that are not active are ignored;
/// installments are matched to loans by id.
pub fn associate_balance(
    associate_id: AssociateId,
    loans: &[Loan],
    installments: &[Installment],
) -> AssociateBalance {
    let mut company_owes_associate = Money::ZERO;
    let mut associate_owes_company = Money::ZERO;
    let mut exposures = Vec::new();

    for loan in loans
        .iter()
        .filter(|l| l.associate_id == associate_id && l.is_active())
    {
        let exposure = loan_exposure(loan, installments);

        if exposure.is_overpaid() {
            warn!(
                loan_id = %loan.id,
                outstanding = %exposure.outstanding,
                "loan is overpaid"
            );
        }

        match loan.direction {
            LoanDirection::FromCompany => company_owes_associate += exposure.outstanding,
            LoanDirection::ToCompany => associate_owes_company += exposure.outstanding,
        }
        exposures.push(exposure);
    }

    AssociateBalance {
        associate_id,
        company_owes_associate,
        associate_owes_company,
        net: company_owes_associate - associate_owes_company,
        loans: exposures,
    }
}

fn loan_exposure(loan: &Loan, installments: &[Installment]) -> LoanExposure {
    let own = || installments.iter().filter(|i| i.loan_id == loan.id);

    let paid_so_far: Money = own()
        .filter(|i| i.status.counts_as_paid())
        .map(|i| i.actual_amount)
        .sum();
    let late_fees: Money = own().map(|i| i.late_fee).sum();

    LoanExposure {
        loan_id: loan.id,
        loan_number: loan.loan_number.clone(),
        direction: loan.direction,
        principal: loan.principal,
        paid_so_far,
        outstanding: loan.principal - paid_so_far,
        late_fees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::loan::LoanTerms;
    use crate::schedule::AmortizationSchedule;
    use crate::types::{InstallmentStatus, LoanStatus};
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn make_loan(
        associate_id: AssociateId,
        direction: LoanDirection,
        principal: i64,
        term: u32,
    ) -> (Loan, Vec<Installment>) {
        let terms = LoanTerms::new(
            associate_id,
            direction,
            Money::from_major(principal),
            Rate::ZERO,
            term,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let schedule = AmortizationSchedule::generate(
            terms.principal,
            terms.annual_rate,
            terms.term_months,
            terms.start_date,
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Loan::originate(&terms, format!("LN-{}", principal), &schedule, now)
    }

    #[test]
    fn test_two_directions_unpaid() {
        let associate = Uuid::new_v4();
        let (lent, mut rows) = make_loan(associate, LoanDirection::FromCompany, 50_000, 10);
        let (borrowed, rows2) = make_loan(associate, LoanDirection::ToCompany, 20_000, 4);
        rows.extend(rows2);

        let balance = associate_balance(associate, &[lent, borrowed], &rows);

        assert_eq!(balance.company_owes_associate, Money::from_major(50_000));
        assert_eq!(balance.associate_owes_company, Money::from_major(20_000));
        assert_eq!(balance.net, Money::from_major(30_000));
        assert_eq!(balance.loans.len(), 2);
        assert!(!balance.has_overpayment());
    }

    #[test]
    fn test_paid_and_partial_count() {
        let associate = Uuid::new_v4();
        let (loan, mut rows) = make_loan(associate, LoanDirection::ToCompany, 4_000, 4);

        rows[0].status = InstallmentStatus::Paid;
        rows[0].actual_amount = Money::from_major(1_000);
        rows[0].late_fee = Money::from_major(20);
        rows[1].status = InstallmentStatus::Partial;
        rows[1].actual_amount = Money::from_major(250);
        // skipped rows carry no money even if an amount lingers
        rows[2].status = InstallmentStatus::Skipped;
        rows[2].actual_amount = Money::from_major(999);

        let balance = associate_balance(associate, &[loan], &rows);

        assert_eq!(balance.loans[0].paid_so_far, Money::from_major(1_250));
        assert_eq!(balance.associate_owes_company, Money::from_major(2_750));
        assert_eq!(balance.loans[0].late_fees, Money::from_major(20));
        assert_eq!(balance.net, Money::from_major(-2_750));
    }

    #[test]
    fn test_overpayment_is_not_floored() {
        let associate = Uuid::new_v4();
        let (loan, mut rows) = make_loan(associate, LoanDirection::FromCompany, 1_000, 1);
        rows[0].status = InstallmentStatus::Paid;
        rows[0].actual_amount = Money::from_major(1_100);

        let balance = associate_balance(associate, &[loan], &rows);

        assert_eq!(balance.company_owes_associate, Money::from_major(-100));
        assert!(balance.has_overpayment());
    }

    #[test]
    fn test_non_active_and_foreign_loans_excluded() {
        let associate = Uuid::new_v4();
        let (mut paid_off, rows_a) = make_loan(associate, LoanDirection::ToCompany, 1_000, 1);
        let (mut defaulted, rows_b) = make_loan(associate, LoanDirection::ToCompany, 2_000, 2);
        let (foreign, rows_c) = make_loan(Uuid::new_v4(), LoanDirection::ToCompany, 3_000, 3);
        let now = Utc::now();
        paid_off.status = LoanStatus::PaidOff;
        defaulted.transition_to(LoanStatus::Defaulted, now).unwrap();

        let rows: Vec<Installment> = rows_a.into_iter().chain(rows_b).chain(rows_c).collect();
        let balance = associate_balance(associate, &[paid_off, defaulted, foreign], &rows);

        assert_eq!(balance.company_owes_associate, Money::ZERO);
        assert_eq!(balance.associate_owes_company, Money::ZERO);
        assert_eq!(balance.net, Money::ZERO);
        assert!(balance.loans.is_empty());
    }

    #[test]
    fn test_balance_is_repeatable() {
        let associate = Uuid::new_v4();
        let (loan, mut rows) = make_loan(associate, LoanDirection::FromCompany, 9_000, 3);
        rows[0].status = InstallmentStatus::Paid;
        rows[0].actual_amount = Money::from_major(3_000);
        let loans = vec![loan];

        let first = associate_balance(associate, &loans, &rows);
        let second = associate_balance(associate, &loans, &rows);
        assert_eq!(first, second);
    }
}
