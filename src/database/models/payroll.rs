use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::error::AppError;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PayrunStatus {
        Completed => "completed",
        Validated => "validated",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PayslipStatus {
        Generated => "generated",
        Validated => "validated",
        Cancelled => "cancelled",
    }
}

/// Unique per (company_id, period_month, period_year).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Payrun {
    pub id: Uuid,
    pub company_id: Uuid,
    pub period_month: i32,
    pub period_year: i32,
    pub employee_count: i32,
    pub total_employer_cost: BigDecimal,
    pub status: PayrunStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrunInput {
    pub period_month: i32,
    pub period_year: i32,
}

impl PayrunInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=12).contains(&self.period_month) {
            return Err(AppError::Validation(
                "period_month must be between 1 and 12".to_string(),
            ));
        }
        if !(1970..=9999).contains(&self.period_year) {
            return Err(AppError::Validation(
                "period_year is out of range".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewPayrun {
    pub company_id: Uuid,
    pub period_month: i32,
    pub period_year: i32,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PayrunWarnings {
    pub employees_without_salary: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrunCreated {
    #[serde(flatten)]
    pub payrun: Payrun,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<PayrunWarnings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Payslip {
    pub id: Uuid,
    pub payrun_id: Uuid,
    pub employee_id: Uuid,
    pub payable_days: i32,
    pub total_worked_days: i32,
    pub total_leaves: i32,
    pub basic_wage: BigDecimal,
    pub gross_wage: BigDecimal,
    pub net_wage: BigDecimal,
    pub employer_cost: BigDecimal,
    pub status: PayslipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived monetary fields and day counts of a payslip.
#[derive(Debug, Clone, PartialEq)]
pub struct PayslipFigures {
    pub payable_days: i32,
    pub total_worked_days: i32,
    pub total_leaves: i32,
    pub basic_wage: BigDecimal,
    pub gross_wage: BigDecimal,
    pub net_wage: BigDecimal,
    pub employer_cost: BigDecimal,
}

impl PayslipFigures {
    pub fn apply(&self, payslip: &mut Payslip) {
        payslip.payable_days = self.payable_days;
        payslip.total_worked_days = self.total_worked_days;
        payslip.total_leaves = self.total_leaves;
        payslip.basic_wage = self.basic_wage.clone();
        payslip.gross_wage = self.gross_wage.clone();
        payslip.net_wage = self.net_wage.clone();
        payslip.employer_cost = self.employer_cost.clone();
    }
}

#[derive(Debug, Clone)]
pub struct NewPayslip {
    pub payrun_id: Uuid,
    pub employee_id: Uuid,
    pub figures: PayslipFigures,
}

/// A named earning or deduction line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayLine {
    pub name: String,
    pub amount: BigDecimal,
    pub is_deduction: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct PayslipComponent {
    pub id: Uuid,
    pub payslip_id: Uuid,
    pub component_name: String,
    pub amount: BigDecimal,
    pub is_deduction: bool,
}

/// Payslip enriched for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipView {
    #[serde(flatten)]
    pub payslip: Payslip,
    pub period_month: i32,
    pub period_year: i32,
    pub employee_name: String,
    pub expected_working_days: i32,
    pub absent_days: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipSummary {
    pub earnings: Vec<PayslipComponent>,
    pub deductions: Vec<PayslipComponent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipDetail {
    pub payslip: PayslipView,
    pub components: Vec<PayslipComponent>,
    pub summary: PayslipSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeOutcome {
    pub id: Uuid,
    pub status: PayslipStatus,
    pub payrun: Payrun,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyEmployerCost {
    pub month: u32,
    pub employer_cost: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerCostReport {
    pub year: i32,
    pub months: Vec<MonthlyEmployerCost>,
}
