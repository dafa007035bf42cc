use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct SalaryStructure {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub monthly_wage: BigDecimal,                      // NUMERIC(14,2)
    pub working_days_per_week: i32,
    pub break_hours: f64,
    pub pf_employee_rate: Option<BigDecimal>,          // percent
    pub pf_employer_rate: Option<BigDecimal>,          // percent
    pub professional_tax_override: Option<BigDecimal>, // flat amount
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalaryStructure {
    pub fn yearly_wage(&self) -> BigDecimal {
        &self.monthly_wage * BigDecimal::from(12)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryStructureInput {
    pub monthly_wage: BigDecimal,
    pub working_days_per_week: Option<i32>,
    pub break_hours: Option<f64>,
    pub pf_employee_rate: Option<BigDecimal>,
    pub pf_employer_rate: Option<BigDecimal>,
    pub professional_tax_override: Option<BigDecimal>,
}

impl SalaryStructureInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.monthly_wage <= BigDecimal::zero() {
            return Err(AppError::Validation(
                "monthly_wage must be greater than 0".to_string(),
            ));
        }
        if let Some(days) = self.working_days_per_week {
            if !(5..=7).contains(&days) {
                return Err(AppError::Validation(
                    "working_days_per_week must be 5, 6 or 7".to_string(),
                ));
            }
        }
        if self.break_hours.is_some_and(|hours| hours < 0.0 || !hours.is_finite()) {
            return Err(AppError::Validation(
                "break_hours must be a non-negative number".to_string(),
            ));
        }
        for (field, value) in [
            ("pf_employee_rate", &self.pf_employee_rate),
            ("pf_employer_rate", &self.pf_employer_rate),
            ("professional_tax_override", &self.professional_tax_override),
        ] {
            if value.as_ref().is_some_and(|v| *v < BigDecimal::zero()) {
                return Err(AppError::Validation(format!("{} must not be negative", field)));
            }
        }
        Ok(())
    }
}

/// Fully resolved values written by an upsert.
#[derive(Debug, Clone)]
pub struct SalaryStructureUpsert {
    pub employee_id: Uuid,
    pub monthly_wage: BigDecimal,
    pub working_days_per_week: i32,
    pub break_hours: f64,
    pub pf_employee_rate: Option<BigDecimal>,
    pub pf_employer_rate: Option<BigDecimal>,
    pub professional_tax_override: Option<BigDecimal>,
}

impl SalaryStructureUpsert {
    pub fn new(employee_id: Uuid, input: SalaryStructureInput) -> Self {
        Self {
            employee_id,
            monthly_wage: input.monthly_wage,
            working_days_per_week: input.working_days_per_week.unwrap_or(5),
            break_hours: input.break_hours.unwrap_or(0.0),
            pf_employee_rate: input.pf_employee_rate,
            pf_employer_rate: input.pf_employer_rate,
            professional_tax_override: input.professional_tax_override,
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ComputationType {
        Fixed => "fixed",
        Percentage => "percentage",
    }
}

impl ComputationType {
    /// Evaluates a component value against a wage base.
    pub fn evaluate(&self, value: &BigDecimal, base: &BigDecimal) -> BigDecimal {
        match self {
            ComputationType::Fixed => value.clone(),
            ComputationType::Percentage => base * value / BigDecimal::from(100),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct SalaryComponent {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub name: String,
    pub computation_type: ComputationType,
    pub value: BigDecimal,
    /// Snapshot taken at write time against the nominal monthly wage.
    /// Payslips re-evaluate against the prorated base instead.
    pub amount: BigDecimal,
    pub is_deduction: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryComponentInput {
    pub name: String,
    pub computation_type: ComputationType,
    pub value: BigDecimal,
    #[serde(default)]
    pub is_deduction: bool,
}

impl SalaryComponentInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        if self.value < BigDecimal::zero() {
            return Err(AppError::Validation("value must not be negative".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewSalaryComponent {
    pub employee_id: Uuid,
    pub name: String,
    pub computation_type: ComputationType,
    pub value: BigDecimal,
    pub amount: BigDecimal,
    pub is_deduction: bool,
}

/// Partial update of a salary component; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalaryComponentPatch {
    pub name: Option<String>,
    pub computation_type: Option<ComputationType>,
    pub value: Option<BigDecimal>,
    pub is_deduction: Option<bool>,
}

impl SalaryComponentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.computation_type.is_none()
            && self.value.is_none()
            && self.is_deduction.is_none()
    }

    pub fn apply(&self, component: &mut SalaryComponent) {
        if let Some(name) = &self.name {
            component.name = name.clone();
        }
        if let Some(computation_type) = self.computation_type {
            component.computation_type = computation_type;
        }
        if let Some(value) = &self.value {
            component.value = value.clone();
        }
        if let Some(is_deduction) = self.is_deduction {
            component.is_deduction = is_deduction;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryOverview {
    pub structure: Option<SalaryStructure>,
    pub components: Vec<SalaryComponent>,
}
