use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business profile of an authenticated user; identifies the issuer on invoices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company_name: String,
    /// Danish central business register number.
    pub cvr: String,
    pub created_at: DateTime<Utc>,
}

impl BusinessUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        company_name: impl Into<String>,
        cvr: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            company_name: company_name.into(),
            cvr: cvr.into(),
            created_at: Utc::now(),
        }
    }
}
