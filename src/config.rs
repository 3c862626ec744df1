use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::payments::LateFeePolicy;

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub late_fee: LateFeePolicy,
    pub numbering: LoanNumbering,
    /// default look-ahead for upcoming installment queries
    pub upcoming_window_days: u32,
}

/// how loan numbers are generated when the caller does not supply one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanNumbering {
    pub prefix: String,
}

impl LedgerConfig {
    /// standard business rules: 2% per 30 days late, no grace, LN- numbering
    pub fn standard() -> Self {
        Self {
            late_fee: LateFeePolicy::standard(),
            numbering: LoanNumbering {
                prefix: "LN".to_string(),
            },
            upcoming_window_days: 7,
        }
    }

    /// interest-free lending between partners, no late fee
    pub fn without_late_fees() -> Self {
        Self {
            late_fee: LateFeePolicy::disabled(),
            ..Self::standard()
        }
    }

    /// load from a json document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.late_fee.validate()?;

        let prefix = self.numbering.prefix.trim();
        if prefix.is_empty() {
            return Err(LedgerError::InvalidConfiguration {
                message: "loan number prefix must not be empty".to_string(),
            });
        }
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("loan number prefix must be alphanumeric: {}", prefix),
            });
        }

        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::standard()
    }
}
