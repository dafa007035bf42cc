//! Payslip computation.
//!
//! [`compute_payslip`] is a pure function of the salary structure, the
//! component list and the attendance counts of the period. Recompute relies
//! on that: the same inputs always produce the same figures.

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::Serialize;
use uuid::Uuid;

use super::calendar;
use crate::config::EmployerCostPolicy;
use crate::database::models::{
    AttendanceCounts, PayLine, PayslipFigures, SalaryComponent, SalaryStructure,
};
use crate::database::store::Session;
use crate::error::AppError;

pub const MONTHLY_WAGE: &str = "Monthly Wage";
pub const PF_EMPLOYEE: &str = "PF Employee";
pub const PROFESSIONAL_TAX: &str = "Professional Tax";

/// Rounds half-up to two decimal places.
pub fn round_money(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

fn percent_of(base: &BigDecimal, rate: &BigDecimal) -> BigDecimal {
    round_money(&(base * rate / BigDecimal::from(100)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayslipCounts {
    pub present: i64,
    pub leave: i64,
    pub payable_days: i64,
    pub expected_working_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayslipComputation {
    pub counts: PayslipCounts,
    pub earnings: Vec<PayLine>,
    pub deductions: Vec<PayLine>,
    /// Prorated monthly wage.
    pub basic_wage: BigDecimal,
    pub gross: BigDecimal,
    pub net: BigDecimal,
    pub employer_pf: BigDecimal,
    pub employer_cost: BigDecimal,
}

impl PayslipComputation {
    pub fn figures(&self) -> PayslipFigures {
        PayslipFigures {
            payable_days: self.counts.payable_days as i32,
            total_worked_days: self.counts.present as i32,
            total_leaves: self.counts.leave as i32,
            basic_wage: self.basic_wage.clone(),
            gross_wage: self.gross.clone(),
            net_wage: self.net.clone(),
            employer_cost: self.employer_cost.clone(),
        }
    }

    /// Earnings followed by deductions.
    pub fn lines(&self) -> Vec<PayLine> {
        self.earnings
            .iter()
            .chain(self.deductions.iter())
            .cloned()
            .collect()
    }
}

pub fn compute_payslip(
    structure: &SalaryStructure,
    components: &[SalaryComponent],
    attendance: AttendanceCounts,
    year: i32,
    month: u32,
    policy: EmployerCostPolicy,
) -> PayslipComputation {
    let expected = calendar::expected_working_days(year, month, structure.working_days_per_week);
    let payable_days = (attendance.present + attendance.leave).min(expected);

    let base = if expected > 0 {
        round_money(
            &(&structure.monthly_wage * &BigDecimal::from(payable_days)
                / BigDecimal::from(expected)),
        )
    } else {
        round_money(&structure.monthly_wage)
    };

    let mut earnings = vec![PayLine {
        name: MONTHLY_WAGE.to_string(),
        amount: base.clone(),
        is_deduction: false,
    }];
    let mut deductions = Vec::new();

    for component in components {
        let amount = round_money(&component.computation_type.evaluate(&component.value, &base));
        let line = PayLine {
            name: component.name.clone(),
            amount,
            is_deduction: component.is_deduction,
        };
        if component.is_deduction {
            deductions.push(line);
        } else {
            earnings.push(line);
        }
    }

    if let Some(rate) = structure.pf_employee_rate.as_ref().filter(|r| !r.is_zero()) {
        deductions.push(PayLine {
            name: PF_EMPLOYEE.to_string(),
            amount: percent_of(&base, rate),
            is_deduction: true,
        });
    }

    if let Some(tax) = structure
        .professional_tax_override
        .as_ref()
        .filter(|t| !t.is_zero())
    {
        deductions.push(PayLine {
            name: PROFESSIONAL_TAX.to_string(),
            amount: round_money(tax),
            is_deduction: true,
        });
    }

    let employer_pf = structure
        .pf_employer_rate
        .as_ref()
        .map(|rate| percent_of(&base, rate))
        .unwrap_or_else(BigDecimal::zero);

    let gross = earnings
        .iter()
        .fold(BigDecimal::zero(), |sum, line| sum + &line.amount);
    let total_deductions = deductions
        .iter()
        .fold(BigDecimal::zero(), |sum, line| sum + &line.amount);
    let net = &gross - &total_deductions;

    let employer_cost = match policy {
        EmployerCostPolicy::BasicWage => base.clone(),
        EmployerCostPolicy::GrossPlusEmployerPf => &gross + &employer_pf,
    };

    PayslipComputation {
        counts: PayslipCounts {
            present: attendance.present,
            leave: attendance.leave,
            payable_days,
            expected_working_days: expected,
        },
        earnings,
        deductions,
        basic_wage: base,
        gross,
        net,
        employer_pf,
        employer_cost,
    }
}

/// Loads the inputs for one employee and period and computes the payslip.
/// Returns `None` when the employee has no salary structure.
pub async fn compute_for_employee<S: Session>(
    session: &mut S,
    employee_id: Uuid,
    year: i32,
    month: u32,
    policy: EmployerCostPolicy,
) -> Result<Option<PayslipComputation>, AppError> {
    let Some(structure) = session.find_salary_structure(employee_id).await? else {
        return Ok(None);
    };
    let components = session.list_salary_components(employee_id).await?;
    let (from, to) = calendar::month_range(year, month)?;
    let attendance = session
        .count_attendance_by_status(employee_id, from, to)
        .await?;

    Ok(Some(compute_payslip(
        &structure,
        &components,
        attendance,
        year,
        month,
        policy,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ComputationType;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn structure(monthly_wage: &str) -> SalaryStructure {
        SalaryStructure {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            monthly_wage: dec(monthly_wage),
            working_days_per_week: 5,
            break_hours: 1.0,
            pf_employee_rate: None,
            pf_employer_rate: None,
            professional_tax_override: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn component(
        name: &str,
        computation_type: ComputationType,
        value: &str,
        is_deduction: bool,
    ) -> SalaryComponent {
        SalaryComponent {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            name: name.to_string(),
            computation_type,
            value: dec(value),
            amount: dec("0"),
            is_deduction,
            created_at: Utc::now(),
        }
    }

    fn present(days: i64) -> AttendanceCounts {
        AttendanceCounts {
            present: days,
            leave: 0,
            absent: 0,
        }
    }

    // September 2025 has 22 weekdays.
    const YEAR: i32 = 2025;
    const MONTH: u32 = 9;

    #[test]
    fn prorates_wage_by_payable_days() {
        let result = compute_payslip(
            &structure("40000"),
            &[],
            present(20),
            YEAR,
            MONTH,
            EmployerCostPolicy::BasicWage,
        );

        assert_eq!(result.counts.expected_working_days, 22);
        assert_eq!(result.counts.payable_days, 20);
        assert_eq!(result.basic_wage, dec("36363.64"));
        assert_eq!(result.gross, dec("36363.64"));
        assert_eq!(result.net, dec("36363.64"));
        assert_eq!(result.employer_cost, dec("36363.64"));
        assert_eq!(result.earnings.len(), 1);
        assert_eq!(result.earnings[0].name, MONTHLY_WAGE);
    }

    #[test]
    fn payable_days_never_exceed_expected() {
        let attendance = AttendanceCounts {
            present: 21,
            leave: 4,
            absent: 0,
        };
        let result = compute_payslip(
            &structure("40000"),
            &[],
            attendance,
            YEAR,
            MONTH,
            EmployerCostPolicy::BasicWage,
        );

        assert_eq!(result.counts.payable_days, 22);
        assert_eq!(result.basic_wage, dec("40000.00"));
    }

    #[test]
    fn leave_days_count_as_payable() {
        let attendance = AttendanceCounts {
            present: 6,
            leave: 5,
            absent: 11,
        };
        let result = compute_payslip(
            &structure("44000"),
            &[],
            attendance,
            YEAR,
            MONTH,
            EmployerCostPolicy::BasicWage,
        );

        assert_eq!(result.counts.payable_days, 11);
        assert_eq!(result.basic_wage, dec("22000.00"));
    }

    #[test]
    fn expands_components_against_prorated_base() {
        let mut salary = structure("40000");
        salary.pf_employee_rate = Some(dec("12"));
        salary.pf_employer_rate = Some(dec("13"));
        salary.professional_tax_override = Some(dec("200"));
        let components = vec![
            component("HRA", ComputationType::Percentage, "10", false),
            component("Loan", ComputationType::Fixed, "500", true),
        ];

        let result = compute_payslip(
            &salary,
            &components,
            present(11),
            YEAR,
            MONTH,
            EmployerCostPolicy::BasicWage,
        );

        assert_eq!(result.basic_wage, dec("20000.00"));
        let earnings: Vec<(&str, BigDecimal)> = result
            .earnings
            .iter()
            .map(|line| (line.name.as_str(), line.amount.clone()))
            .collect();
        assert_eq!(
            earnings,
            vec![(MONTHLY_WAGE, dec("20000.00")), ("HRA", dec("2000.00"))]
        );
        let deductions: Vec<(&str, BigDecimal)> = result
            .deductions
            .iter()
            .map(|line| (line.name.as_str(), line.amount.clone()))
            .collect();
        assert_eq!(
            deductions,
            vec![
                ("Loan", dec("500.00")),
                (PF_EMPLOYEE, dec("2400.00")),
                (PROFESSIONAL_TAX, dec("200.00")),
            ]
        );
        assert_eq!(result.gross, dec("22000.00"));
        assert_eq!(result.net, dec("18900.00"));
        assert!(result.net < result.gross);
        assert_eq!(result.employer_pf, dec("2600.00"));
        assert_eq!(result.employer_cost, dec("20000.00"));
    }

    #[test]
    fn gross_plus_employer_pf_policy() {
        let mut salary = structure("40000");
        salary.pf_employer_rate = Some(dec("13"));
        let components = vec![component("HRA", ComputationType::Fixed, "1000", false)];

        let result = compute_payslip(
            &salary,
            &components,
            present(22),
            YEAR,
            MONTH,
            EmployerCostPolicy::GrossPlusEmployerPf,
        );

        assert_eq!(result.gross, dec("41000.00"));
        assert_eq!(result.employer_pf, dec("5200.00"));
        assert_eq!(result.employer_cost, dec("46200.00"));
    }

    #[test]
    fn zero_rates_add_no_statutory_lines() {
        let mut salary = structure("30000");
        salary.pf_employee_rate = Some(dec("0"));
        salary.professional_tax_override = Some(dec("0"));

        let result = compute_payslip(
            &salary,
            &[],
            present(22),
            YEAR,
            MONTH,
            EmployerCostPolicy::BasicWage,
        );

        assert!(result.deductions.is_empty());
        assert_eq!(result.net, result.gross);
    }

    #[test]
    fn computation_is_deterministic() {
        let mut salary = structure("52500.50");
        salary.pf_employee_rate = Some(dec("12"));
        let components = vec![component("Bonus", ComputationType::Percentage, "7.5", false)];

        let first = compute_payslip(
            &salary,
            &components,
            present(13),
            YEAR,
            MONTH,
            EmployerCostPolicy::BasicWage,
        );
        let second = compute_payslip(
            &salary,
            &components,
            present(13),
            YEAR,
            MONTH,
            EmployerCostPolicy::BasicWage,
        );

        assert_eq!(first, second);
    }

    #[test]
    fn figures_and_lines_follow_computation() {
        let mut salary = structure("40000");
        salary.professional_tax_override = Some(dec("200"));
        let result = compute_payslip(
            &salary,
            &[],
            AttendanceCounts {
                present: 18,
                leave: 2,
                absent: 2,
            },
            YEAR,
            MONTH,
            EmployerCostPolicy::BasicWage,
        );

        let figures = result.figures();
        assert_eq!(figures.payable_days, 20);
        assert_eq!(figures.total_worked_days, 18);
        assert_eq!(figures.total_leaves, 2);
        assert_eq!(figures.net_wage, dec("36163.64"));

        let lines = result.lines();
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].is_deduction);
        assert!(lines[1].is_deduction);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_money(&dec("0.005")), dec("0.01"));
        assert_eq!(round_money(&dec("2.345")), dec("2.35"));
        assert_eq!(round_money(&dec("2.344")), dec("2.34"));
    }
}
