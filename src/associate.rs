use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::types::AssociateId;

/// a counterparty that can lend to or borrow from the company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Associate {
    pub id: AssociateId,
    pub name: String,
    /// free-form relationship label (partner, employee, supplier, ...)
    pub relationship: Option<String>,
    pub contact: ContactDetails,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// registration request for a new associate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssociate {
    pub name: String,
    pub relationship: Option<String>,
    pub contact: ContactDetails,
}

impl NewAssociate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.contact.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.contact.email = Some(email.into());
        self
    }
}

impl Associate {
    pub fn register(request: NewAssociate, now: DateTime<Utc>) -> Result<Self> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidAssociate {
                message: "name must not be empty".to_string(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            relationship: request.relationship,
            contact: request.contact,
            active: true,
            created_at: now,
            deactivated_at: None,
        })
    }

    /// soft delete; idempotent
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        if self.active {
            self.active = false;
            self.deactivated_at = Some(now);
        }
    }
}
