/// serializable loan statement
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::{Installment, Loan};
use crate::types::{InstallmentId, InstallmentStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanStatement {
    pub loan: Loan,
    pub installments: Vec<Installment>,
    pub totals: StatementTotals,
    pub next_due: Option<NextDue>,
    pub generated_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementTotals {
    pub scheduled: Money,
    pub paid: Money,
    pub late_fees: Money,
    /// scheduled amounts still uncovered on pending and partial installments
    pub remaining_scheduled: Money,
    pub paid_count: u32,
    pub overdue_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextDue {
    pub installment_id: InstallmentId,
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub amount_due: Money,
}

fn is_open(status: InstallmentStatus) -> bool {
    matches!(status, InstallmentStatus::Pending | InstallmentStatus::Partial)
}

impl LoanStatement {
    pub fn build(loan: Loan, mut installments: Vec<Installment>, today: NaiveDate) -> Self {
        installments.sort_by_key(|i| i.sequence);

        let mut totals = StatementTotals {
            scheduled: Money::ZERO,
            paid: Money::ZERO,
            late_fees: Money::ZERO,
            remaining_scheduled: Money::ZERO,
            paid_count: 0,
            overdue_count: 0,
        };

        for inst in &installments {
            totals.scheduled += inst.scheduled_amount;
            totals.late_fees += inst.late_fee;
            if inst.status.counts_as_paid() {
                totals.paid += inst.actual_amount;
            }
            if inst.is_paid() {
                totals.paid_count += 1;
            }
            if is_open(inst.status) {
                totals.remaining_scheduled += inst.remaining_amount();
                if inst.due_date < today {
                    totals.overdue_count += 1;
                }
            }
        }

        let next_due = installments
            .iter()
            .find(|i| is_open(i.status))
            .map(|i| NextDue {
                installment_id: i.id,
                sequence: i.sequence,
                due_date: i.due_date,
                amount_due: i.remaining_amount(),
            });

        Self {
            loan,
            installments,
            totals,
            next_due,
            generated_on: today,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::loan::LoanTerms;
    use crate::schedule::AmortizationSchedule;
    use crate::types::LoanDirection;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan() -> (Loan, Vec<Installment>) {
        let terms = LoanTerms::new(
            Uuid::new_v4(),
            LoanDirection::ToCompany,
            Money::from_major(3_000),
            Rate::ZERO,
            3,
            date(2024, 1, 1),
        );
        let schedule = AmortizationSchedule::generate(
            terms.principal,
            terms.annual_rate,
            terms.term_months,
            terms.start_date,
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Loan::originate(&terms, "LN-STMT".to_string(), &schedule, now)
    }

    #[test]
    fn test_statement_totals() {
        let (loan, mut rows) = loan();
        rows[0].status = InstallmentStatus::Paid;
        rows[0].actual_amount = Money::from_major(1_000);
        rows[0].late_fee = Money::from_str_exact("6.67").unwrap();
        rows[1].status = InstallmentStatus::Partial;
        rows[1].actual_amount = Money::from_major(400);

        let statement = LoanStatement::build(loan, rows, date(2024, 3, 15));

        assert_eq!(statement.totals.scheduled, Money::from_major(3_000));
        assert_eq!(statement.totals.paid, Money::from_major(1_400));
        assert_eq!(statement.totals.late_fees, Money::from_str_exact("6.67").unwrap());
        assert_eq!(statement.totals.remaining_scheduled, Money::from_major(1_600));
        assert_eq!(statement.totals.paid_count, 1);
        // installment 2 (due 03-01) is open and past due; installment 3 is not yet due
        assert_eq!(statement.totals.overdue_count, 1);

        let next = statement.next_due.unwrap();
        assert_eq!(next.sequence, 2);
        assert_eq!(next.amount_due, Money::from_major(600));
    }

    #[test]
    fn test_statement_json() {
        let (loan, rows) = loan();
        let statement = LoanStatement::build(loan, rows, date(2024, 1, 1));
        let json = statement.to_json_pretty().unwrap();

        assert!(json.contains("\"loan_number\": \"LN-STMT\""));
        assert!(json.contains("\"direction\": \"to_company\""));
        assert!(json.contains("\"status\": \"pending\""));

        let parsed: LoanStatement = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, statement);
    }

    #[test]
    fn test_fully_paid_statement_has_no_next_due() {
        let (loan, mut rows) = loan();
        for row in rows.iter_mut() {
            row.status = InstallmentStatus::Paid;
            row.actual_amount = row.scheduled_amount;
        }

        let statement = LoanStatement::build(loan, rows, date(2024, 6, 1));
        assert!(statement.next_due.is_none());
        assert_eq!(statement.totals.remaining_scheduled, Money::ZERO);
        assert_eq!(statement.totals.paid_count, 3);
    }
}
