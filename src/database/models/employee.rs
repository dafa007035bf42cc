use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only view of an employee profile. Profiles are owned by the
/// employee directory; payroll only reads identity and company scoping.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn belongs_to(&self, company_id: Uuid) -> bool {
        self.company_id == company_id
    }
}
