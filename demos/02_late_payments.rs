/// late payments - late fees, partial payments, overdue queries and loan closure
use associate_ledger::{
    InMemoryStore, LedgerConfig, LoanDirection, LoanLedger, LoanTerms, Money, NewAssociate,
    PaymentMethod, PaymentRequest, Rate, SafeTimeProvider, TimeSource,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== late payments ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();
    let mut ledger = LoanLedger::new(InMemoryStore::new(), LedgerConfig::standard())?;

    let associate = ledger.register_associate(NewAssociate::new("Luis Pardo"), &time)?;
    let loan = ledger.create_loan(
        LoanTerms::new(
            associate.id,
            LoanDirection::ToCompany,
            Money::from_major(3_000),
            Rate::from_percentage(12),
            3,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ),
        &time,
    )?;
    let schedule = ledger.loan_schedule(loan.id)?;
    println!("loan {} monthly payment {}", loan.loan_number, loan.monthly_payment);

    // first installment paid 10 days late
    controller.advance(Duration::days(41));
    let today = time.now().date_naive();
    let overdue = ledger.overdue_installments(&time)?;
    println!("\n{}: {} overdue installment(s)", today, overdue.len());

    let outcome = ledger.record_payment(
        schedule[0].id,
        PaymentRequest::new(schedule[0].scheduled_amount, today, PaymentMethod::Cash),
        &time,
    )?;
    println!(
        "installment 1 paid {} days late, late fee {}",
        outcome.installment.days_late, outcome.late_fee.fee
    );

    // second installment only partly covered
    controller.advance(Duration::days(20));
    let today = time.now().date_naive();
    let partial = ledger.record_payment(
        schedule[1].id,
        PaymentRequest::new(Money::from_major(500), today, PaymentMethod::PayrollDeduction),
        &time,
    )?;
    println!(
        "installment 2 is {:?}, {} still uncovered",
        partial.installment.status,
        partial.installment.remaining_amount()
    );

    // correction tops it up, then the last installment closes the loan
    let corrected = ledger.record_payment(
        schedule[1].id,
        PaymentRequest::new(schedule[1].scheduled_amount, today, PaymentMethod::PayrollDeduction)
            .notes("topped up after payroll correction"),
        &time,
    )?;
    println!("installment 2 corrected to {:?}", corrected.installment.status);

    let upcoming = ledger.upcoming_installments(Some(31), &time)?;
    println!("\n{} installment(s) due in the next 31 days", upcoming.len());

    controller.advance(Duration::days(30));
    let closing = ledger.record_payment(
        schedule[2].id,
        PaymentRequest::new(schedule[2].scheduled_amount, time.now().date_naive(), PaymentMethod::Cash),
        &time,
    )?;
    println!("loan closed: {} ({:?})", closing.loan_closed, closing.loan_status);

    let statement = ledger.loan_statement(loan.id, &time)?;
    println!("\n{}", statement.to_json_pretty()?);

    Ok(())
}
