/// ledger config - load business rules from json and compare late fees
use associate_ledger::{LateFeePolicy, LedgerConfig, Money};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ledger config ===\n");

    let standard = LedgerConfig::standard();
    println!("standard config:\n{}\n", standard.to_json_pretty()?);

    let custom = LedgerConfig::from_json_str(
        r#"{
            "late_fee": { "rate": "0.03", "period_days": 30, "grace_days": 5, "enabled": true },
            "numbering": { "prefix": "ASC" },
            "upcoming_window_days": 14
        }"#,
    )?;

    let installment = Money::from_major(1_000);
    println!("{:>5}  {:>9}  {:>9}  {:>9}", "days", "standard", "custom", "disabled");
    for days in [0, 3, 10, 30, 45, 90] {
        println!(
            "{:>5}  {:>9}  {:>9}  {:>9}",
            days,
            standard.late_fee.assess(installment, days).fee,
            custom.late_fee.assess(installment, days).fee,
            LateFeePolicy::disabled().assess(installment, days).fee,
        );
    }

    match LedgerConfig::from_json_str(r#"{ "late_fee": { "rate": "0.02", "period_days": 0, "grace_days": 0, "enabled": true }, "numbering": { "prefix": "LN" }, "upcoming_window_days": 7 }"#) {
        Ok(_) => println!("\nunexpectedly accepted"),
        Err(e) => println!("\nrejected: {}", e),
    }

    Ok(())
}
