/// associate loans - register an associate, lend in both directions, check the net balance
use associate_ledger::{
    InMemoryStore, LedgerConfig, LoanDirection, LoanLedger, LoanTerms, Money, NewAssociate,
    PaymentMethod, PaymentRequest, Rate, SafeTimeProvider, TimeSource,
};
use chrono::{NaiveDate, TimeZone, Utc};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== associate loans ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    ));
    let mut ledger = LoanLedger::new(InMemoryStore::new(), LedgerConfig::standard())?;

    let associate = ledger.register_associate(
        NewAssociate::new("Marta Ruiz")
            .relationship("founding partner")
            .email("marta@example.com"),
        &time,
    )?;
    println!("registered {} ({})", associate.name, associate.id);

    // the associate borrows from the company
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let borrowed = ledger.create_loan(
        LoanTerms::new(
            associate.id,
            LoanDirection::ToCompany,
            Money::from_major(120_000),
            Rate::from_percentage(8),
            12,
            start,
        )
        .notes("home renovation"),
        &time,
    )?;
    println!(
        "loan {}: {} over {} months, monthly payment {}",
        borrowed.loan_number, borrowed.principal, borrowed.term_months, borrowed.monthly_payment
    );

    println!("\n{:>3}  {:<10}  {:>10}  {:>10}  {:>10}  {:>11}", "#", "due", "principal", "interest", "amount", "balance");
    for row in ledger.loan_schedule(borrowed.id)? {
        println!(
            "{:>3}  {}  {:>10}  {:>10}  {:>10}  {:>11}",
            row.sequence, row.due_date, row.principal_portion, row.interest_portion, row.scheduled_amount, row.balance_after
        );
    }
    println!("total interest: {}", borrowed.total_interest);

    // the company also owes the associate on a capital advance
    let lent = ledger.create_loan(
        LoanTerms::new(
            associate.id,
            LoanDirection::FromCompany,
            Money::from_major(50_000),
            Rate::ZERO,
            10,
            start,
        ),
        &time,
    )?;
    println!("\nloan {}: company owes {}", lent.loan_number, lent.principal);

    let first = &ledger.loan_schedule(borrowed.id)?[0];
    let payment = PaymentRequest::new(first.scheduled_amount, first.due_date, PaymentMethod::BankTransfer)
        .reference("TRF-0001");
    let outcome = ledger.record_payment(first.id, payment, &time)?;
    println!("installment {} is {:?}", outcome.installment.sequence, outcome.installment.status);

    let balance = ledger.associate_balance(associate.id)?;
    println!("\ncompany owes associate: {}", balance.company_owes_associate);
    println!("associate owes company: {}", balance.associate_owes_company);
    println!("net: {}", balance.net);

    println!("\n{} events emitted", ledger.events().len());

    Ok(())
}
