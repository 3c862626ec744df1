use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// check loan economics before any computation
pub fn validate_terms(principal: Money, annual_rate: Rate, term_months: u32) -> Result<()> {
    if !principal.is_positive() {
        return Err(LedgerError::InvalidPrincipal { amount: principal });
    }
    if term_months == 0 {
        return Err(LedgerError::InvalidTerm { months: term_months });
    }
    if annual_rate.is_negative() {
        return Err(LedgerError::InvalidInterestRate { rate: annual_rate });
    }
    Ok(())
}

/// fixed monthly payment that amortizes `principal` over `term_months`
///
/// zero-rate loans split the principal evenly; otherwise the standard annuity
/// formula `P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r = annual_rate / 12`.
/// the result is rounded half-up to cents.
pub fn monthly_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Result<Money> {
    validate_terms(principal, annual_rate, term_months)?;

    if annual_rate.is_zero() {
        return Ok(Money::from_decimal(principal.as_decimal() / Decimal::from(term_months)));
    }

    let r = annual_rate.monthly_rate().as_decimal();
    let compound = compound_factor(r, term_months)?;
    let denominator = compound - Decimal::ONE;

    if denominator.is_zero() {
        return Err(LedgerError::CalculationError {
            message: format!("rate {} too small to amortize over {} months", annual_rate, term_months),
        });
    }

    let numerator = principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(|| LedgerError::CalculationError {
            message: "monthly payment overflow".to_string(),
        })?;

    Ok(Money::from_decimal(numerator / denominator))
}

/// (1 + r)^n by repeated multiplication
fn compound_factor(r: Decimal, n: u32) -> Result<Decimal> {
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..n {
        compound = compound
            .checked_mul(base)
            .ok_or_else(|| LedgerError::CalculationError {
                message: format!("compound factor overflow after {} periods", n),
            })?;
    }
    Ok(compound)
}
