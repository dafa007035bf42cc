//! In-process store used by the test suite and local tooling.
//!
//! A session takes the store lock, works on a private copy of the state and
//! writes it back on commit. Dropping or rolling back a session discards
//! every change, so the all-or-nothing behaviour of Postgres transactions
//! holds here too.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::database::models::{
    AttendanceCounts, AttendancePatch, AttendanceRecord, Employee, LeaveAllocation, LeaveRequest,
    LeaveRequestFilter, LeaveRequestStatus, LeaveType, LeaveTypeInput, NewAttendanceRecord,
    NewLeaveAllocation, NewLeaveRequest, NewPayrun, NewPayslip, NewSalaryComponent, Page,
    PageRequest, PayLine,
    Payrun, PayrunStatus, Payslip, PayslipComponent, PayslipFigures, PayslipStatus,
    SalaryComponent, SalaryComponentPatch, SalaryStructure, SalaryStructureUpsert,
};
use crate::database::store::{
    AttendanceStore, Database, EmployeeDirectory, LeaveStore, PayrunStore, SalaryStore, Session,
    StoreResult,
};
use crate::error::AppError;

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub employees: Vec<Employee>,
    pub attendance: Vec<AttendanceRecord>,
    pub leave_types: Vec<LeaveType>,
    pub leave_allocations: Vec<LeaveAllocation>,
    pub leave_requests: Vec<LeaveRequest>,
    pub salary_structures: Vec<SalaryStructure>,
    pub salary_components: Vec<SalaryComponent>,
    pub payruns: Vec<Payrun>,
    pub payslips: Vec<Payslip>,
    pub payslip_components: Vec<PayslipComponent>,
    failing_payslips: HashSet<Uuid>,
    racing_attendance: HashMap<(Uuid, NaiveDate), NewAttendanceRecord>,
}

impl MemoryState {
    fn employee(&self, employee_id: Uuid) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == employee_id)
    }

    fn in_company(&self, employee_id: Uuid, company_id: Uuid) -> bool {
        self.employee(employee_id)
            .is_some_and(|e| e.belongs_to(company_id))
    }

    fn payrun_period(&self, payrun_id: Uuid) -> (i32, i32) {
        self.payruns
            .iter()
            .find(|p| p.id == payrun_id)
            .map(|p| (p.period_year, p.period_month))
            .unwrap_or_default()
    }

    fn push_attendance(&mut self, record: NewAttendanceRecord) -> AttendanceRecord {
        let now = Utc::now();
        let inserted = AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id: record.employee_id,
            date: record.date,
            check_in: record.check_in,
            check_out: None,
            status: record.status,
            work_hours: 0.0,
            break_hours: 0.0,
            extra_hours: 0.0,
            created_at: now,
            updated_at: now,
        };
        self.attendance.push(inserted.clone());
        inserted
    }
}

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_employee(&self, employee: Employee) {
        self.state.lock().await.employees.push(employee);
    }

    /// Makes every later payslip insert for `employee_id` fail.
    pub async fn fail_payslip_insert_for(&self, employee_id: Uuid) {
        self.state.lock().await.failing_payslips.insert(employee_id);
    }

    /// Lets `competitor` win the next attendance insert for its
    /// (employee, date): the row appears just before that insert runs, as if a
    /// concurrent session had committed it, and the insert reports a conflict.
    pub async fn race_attendance_insert(&self, competitor: NewAttendanceRecord) {
        self.state
            .lock()
            .await
            .racing_attendance
            .insert((competitor.employee_id, competitor.date), competitor);
    }

    /// Committed state as seen by a new session.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

pub struct MemorySession {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl Database for MemoryDatabase {
    type Session = MemorySession;

    async fn begin(&self) -> StoreResult<MemorySession> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemorySession { guard, working })
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn commit(self) -> StoreResult<()> {
        let MemorySession { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        Ok(())
    }
}

fn missing(what: &str) -> AppError {
    AppError::NotFound(format!("{} not found", what))
}

#[async_trait]
impl EmployeeDirectory for MemorySession {
    async fn find_employee(&mut self, employee_id: Uuid) -> StoreResult<Option<Employee>> {
        Ok(self.working.employee(employee_id).cloned())
    }

    async fn list_company_employees(&mut self, company_id: Uuid) -> StoreResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = self
            .working
            .employees
            .iter()
            .filter(|e| e.belongs_to(company_id))
            .cloned()
            .collect();
        employees.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(employees)
    }

    async fn list_company_ids(&mut self) -> StoreResult<Vec<Uuid>> {
        let mut ids: Vec<Uuid> = self.working.employees.iter().map(|e| e.company_id).collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl AttendanceStore for MemorySession {
    async fn find_attendance(
        &mut self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self
            .working
            .attendance
            .iter()
            .find(|a| a.employee_id == employee_id && a.date == date)
            .cloned())
    }

    async fn insert_attendance(
        &mut self,
        record: NewAttendanceRecord,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let exists = self
            .working
            .attendance
            .iter()
            .any(|a| a.employee_id == record.employee_id && a.date == record.date);
        if exists {
            return Ok(None);
        }

        let key = (record.employee_id, record.date);
        if let Some(competitor) = self.working.racing_attendance.remove(&key) {
            self.working.push_attendance(competitor);
            return Ok(None);
        }

        Ok(Some(self.working.push_attendance(record)))
    }

    async fn update_attendance(
        &mut self,
        id: Uuid,
        patch: AttendancePatch,
    ) -> StoreResult<AttendanceRecord> {
        let record = self
            .working
            .attendance
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| missing("Attendance record"))?;
        patch.apply(record);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn list_attendance(
        &mut self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .working
            .attendance
            .iter()
            .filter(|a| a.employee_id == employee_id && from <= a.date && a.date <= to)
            .cloned()
            .collect();
        records.sort_by_key(|a| a.date);
        Ok(records)
    }

    async fn count_attendance_by_status(
        &mut self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<AttendanceCounts> {
        let mut counts = AttendanceCounts::default();
        self.working
            .attendance
            .iter()
            .filter(|a| a.employee_id == employee_id && from <= a.date && a.date <= to)
            .for_each(|a| counts.tally(a.status));
        Ok(counts)
    }

    async fn list_attendance_on(
        &mut self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let state = &self.working;
        Ok(state
            .attendance
            .iter()
            .filter(|a| a.date == date && state.in_company(a.employee_id, company_id))
            .cloned()
            .collect())
    }

    async fn find_unaccounted_employees(
        &mut self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Uuid>> {
        let state = &self.working;
        let mut ids: Vec<Uuid> = state
            .employees
            .iter()
            .filter(|e| e.belongs_to(company_id))
            .filter(|e| {
                !state
                    .attendance
                    .iter()
                    .any(|a| a.employee_id == e.id && a.date == date)
            })
            .filter(|e| {
                !state.leave_requests.iter().any(|r| {
                    r.employee_id == e.id
                        && r.status == LeaveRequestStatus::Approved
                        && r.covers(date)
                })
            })
            .map(|e| e.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl LeaveStore for MemorySession {
    async fn list_leave_types(&mut self) -> StoreResult<Vec<LeaveType>> {
        let mut types = self.working.leave_types.clone();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn find_leave_type(&mut self, id: Uuid) -> StoreResult<Option<LeaveType>> {
        Ok(self.working.leave_types.iter().find(|t| t.id == id).cloned())
    }

    async fn insert_leave_type(&mut self, input: LeaveTypeInput) -> StoreResult<LeaveType> {
        let name = input.name.trim().to_string();
        if self.working.leave_types.iter().any(|t| t.name == name) {
            return Err(AppError::Conflict("Resource already exists".to_string()));
        }
        let leave_type = LeaveType {
            id: Uuid::new_v4(),
            name,
            is_paid: input.is_paid,
        };
        self.working.leave_types.push(leave_type.clone());
        Ok(leave_type)
    }

    async fn insert_leave_allocation(
        &mut self,
        allocation: NewLeaveAllocation,
    ) -> StoreResult<LeaveAllocation> {
        let input = allocation.input;
        let inserted = LeaveAllocation {
            id: Uuid::new_v4(),
            employee_id: input.employee_id,
            leave_type_id: input.leave_type_id,
            allocated_days: input.allocated_days,
            used_days: 0.0,
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            notes: input.notes,
            created_by: allocation.created_by,
            created_at: Utc::now(),
        };
        self.working.leave_allocations.push(inserted.clone());
        Ok(inserted)
    }

    async fn list_leave_allocations(
        &mut self,
        company_id: Uuid,
        employee_id: Option<Uuid>,
    ) -> StoreResult<Vec<LeaveAllocation>> {
        let state = &self.working;
        Ok(state
            .leave_allocations
            .iter()
            .filter(|a| state.in_company(a.employee_id, company_id))
            .filter(|a| employee_id.is_none_or(|id| a.employee_id == id))
            .cloned()
            .collect())
    }

    async fn first_leave_allocation(
        &mut self,
        employee_id: Uuid,
        leave_type_id: Uuid,
    ) -> StoreResult<Option<LeaveAllocation>> {
        Ok(self
            .working
            .leave_allocations
            .iter()
            .filter(|a| a.employee_id == employee_id && a.leave_type_id == leave_type_id)
            .min_by_key(|a| a.created_at)
            .cloned())
    }

    async fn add_used_days(
        &mut self,
        allocation_id: Uuid,
        days: f64,
    ) -> StoreResult<LeaveAllocation> {
        let allocation = self
            .working
            .leave_allocations
            .iter_mut()
            .find(|a| a.id == allocation_id)
            .ok_or_else(|| missing("Leave allocation"))?;
        allocation.used_days += days;
        Ok(allocation.clone())
    }

    async fn insert_leave_request(
        &mut self,
        request: NewLeaveRequest,
    ) -> StoreResult<LeaveRequest> {
        let now = Utc::now();
        let inserted = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: request.employee_id,
            leave_type_id: request.leave_type_id,
            start_date: request.start_date,
            end_date: request.end_date,
            notes: request.notes,
            status: LeaveRequestStatus::Pending,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        };
        self.working.leave_requests.push(inserted.clone());
        Ok(inserted)
    }

    async fn find_leave_request(&mut self, id: Uuid) -> StoreResult<Option<LeaveRequest>> {
        Ok(self.working.leave_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_leave_requests(
        &mut self,
        company_id: Uuid,
        filter: LeaveRequestFilter,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let state = &self.working;
        let mut requests: Vec<LeaveRequest> = state
            .leave_requests
            .iter()
            .filter(|r| state.in_company(r.employee_id, company_id))
            .filter(|r| filter.employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| filter.status.is_none_or(|status| r.status == status))
            .cloned()
            .collect();
        requests.sort_by(|a, b| {
            (b.start_date, b.created_at).cmp(&(a.start_date, a.created_at))
        });
        Ok(requests)
    }

    async fn set_leave_request_status(
        &mut self,
        id: Uuid,
        status: LeaveRequestStatus,
        reviewed_by: Uuid,
    ) -> StoreResult<LeaveRequest> {
        let request = self
            .working
            .leave_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| missing("Leave request"))?;
        request.status = status;
        request.reviewed_by = Some(reviewed_by);
        request.updated_at = Utc::now();
        Ok(request.clone())
    }
}

#[async_trait]
impl SalaryStore for MemorySession {
    async fn find_salary_structure(
        &mut self,
        employee_id: Uuid,
    ) -> StoreResult<Option<SalaryStructure>> {
        Ok(self
            .working
            .salary_structures
            .iter()
            .find(|s| s.employee_id == employee_id)
            .cloned())
    }

    async fn upsert_salary_structure(
        &mut self,
        upsert: SalaryStructureUpsert,
    ) -> StoreResult<SalaryStructure> {
        let now = Utc::now();
        let existing = self
            .working
            .salary_structures
            .iter_mut()
            .find(|s| s.employee_id == upsert.employee_id);

        let structure = match existing {
            Some(structure) => {
                structure.monthly_wage = upsert.monthly_wage;
                structure.working_days_per_week = upsert.working_days_per_week;
                structure.break_hours = upsert.break_hours;
                structure.pf_employee_rate = upsert.pf_employee_rate;
                structure.pf_employer_rate = upsert.pf_employer_rate;
                structure.professional_tax_override = upsert.professional_tax_override;
                structure.updated_at = now;
                structure.clone()
            }
            None => {
                let structure = SalaryStructure {
                    id: Uuid::new_v4(),
                    employee_id: upsert.employee_id,
                    monthly_wage: upsert.monthly_wage,
                    working_days_per_week: upsert.working_days_per_week,
                    break_hours: upsert.break_hours,
                    pf_employee_rate: upsert.pf_employee_rate,
                    pf_employer_rate: upsert.pf_employer_rate,
                    professional_tax_override: upsert.professional_tax_override,
                    created_at: now,
                    updated_at: now,
                };
                self.working.salary_structures.push(structure.clone());
                structure
            }
        };
        Ok(structure)
    }

    async fn list_salary_structures(
        &mut self,
        company_id: Uuid,
    ) -> StoreResult<Vec<SalaryStructure>> {
        let state = &self.working;
        let mut structures: Vec<(&Employee, SalaryStructure)> = state
            .salary_structures
            .iter()
            .filter_map(|s| {
                state
                    .employee(s.employee_id)
                    .filter(|e| e.belongs_to(company_id))
                    .map(|e| (e, s.clone()))
            })
            .collect();
        structures.sort_by(|(a, _), (b, _)| {
            (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
        });
        Ok(structures.into_iter().map(|(_, s)| s).collect())
    }

    async fn list_salary_components(
        &mut self,
        employee_id: Uuid,
    ) -> StoreResult<Vec<SalaryComponent>> {
        Ok(self
            .working
            .salary_components
            .iter()
            .filter(|c| c.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn find_salary_component(
        &mut self,
        employee_id: Uuid,
        component_id: Uuid,
    ) -> StoreResult<Option<SalaryComponent>> {
        Ok(self
            .working
            .salary_components
            .iter()
            .find(|c| c.id == component_id && c.employee_id == employee_id)
            .cloned())
    }

    async fn insert_salary_component(
        &mut self,
        component: NewSalaryComponent,
    ) -> StoreResult<SalaryComponent> {
        let inserted = SalaryComponent {
            id: Uuid::new_v4(),
            employee_id: component.employee_id,
            name: component.name,
            computation_type: component.computation_type,
            value: component.value,
            amount: component.amount,
            is_deduction: component.is_deduction,
            created_at: Utc::now(),
        };
        self.working.salary_components.push(inserted.clone());
        Ok(inserted)
    }

    async fn update_salary_component(
        &mut self,
        component_id: Uuid,
        patch: SalaryComponentPatch,
        amount: BigDecimal,
    ) -> StoreResult<SalaryComponent> {
        let component = self
            .working
            .salary_components
            .iter_mut()
            .find(|c| c.id == component_id)
            .ok_or_else(|| missing("Salary component"))?;
        patch.apply(component);
        component.amount = amount;
        Ok(component.clone())
    }

    async fn delete_salary_component(
        &mut self,
        employee_id: Uuid,
        component_id: Uuid,
    ) -> StoreResult<bool> {
        let before = self.working.salary_components.len();
        self.working
            .salary_components
            .retain(|c| !(c.id == component_id && c.employee_id == employee_id));
        Ok(self.working.salary_components.len() < before)
    }
}

#[async_trait]
impl PayrunStore for MemorySession {
    async fn find_payrun_for_period(
        &mut self,
        company_id: Uuid,
        period_month: i32,
        period_year: i32,
    ) -> StoreResult<Option<Payrun>> {
        Ok(self
            .working
            .payruns
            .iter()
            .find(|p| {
                p.company_id == company_id
                    && p.period_month == period_month
                    && p.period_year == period_year
            })
            .cloned())
    }

    async fn insert_payrun(&mut self, payrun: NewPayrun) -> StoreResult<Payrun> {
        if self
            .find_payrun_for_period(payrun.company_id, payrun.period_month, payrun.period_year)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Resource already exists".to_string()));
        }

        let now = Utc::now();
        let inserted = Payrun {
            id: Uuid::new_v4(),
            company_id: payrun.company_id,
            period_month: payrun.period_month,
            period_year: payrun.period_year,
            employee_count: 0,
            total_employer_cost: BigDecimal::from(0),
            status: PayrunStatus::Completed,
            created_by: payrun.created_by,
            created_at: now,
            updated_at: now,
        };
        self.working.payruns.push(inserted.clone());
        Ok(inserted)
    }

    async fn find_payrun(&mut self, id: Uuid) -> StoreResult<Option<Payrun>> {
        Ok(self.working.payruns.iter().find(|p| p.id == id).cloned())
    }

    async fn list_payruns(&mut self, company_id: Uuid) -> StoreResult<Vec<Payrun>> {
        let mut payruns: Vec<Payrun> = self
            .working
            .payruns
            .iter()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect();
        payruns.sort_by(|a, b| {
            (b.period_year, b.period_month).cmp(&(a.period_year, a.period_month))
        });
        Ok(payruns)
    }

    async fn page_payruns(
        &mut self,
        company_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Page<Payrun>> {
        let payruns = self.list_payruns(company_id).await?;
        Ok(Page::slice(payruns, page))
    }

    async fn update_payrun_totals(
        &mut self,
        id: Uuid,
        employee_count: i32,
        total_employer_cost: BigDecimal,
    ) -> StoreResult<Payrun> {
        let payrun = self
            .working
            .payruns
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| missing("Payrun"))?;
        payrun.employee_count = employee_count;
        payrun.total_employer_cost = total_employer_cost;
        payrun.updated_at = Utc::now();
        Ok(payrun.clone())
    }

    async fn set_payrun_status(&mut self, id: Uuid, status: PayrunStatus) -> StoreResult<Payrun> {
        let payrun = self
            .working
            .payruns
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| missing("Payrun"))?;
        payrun.status = status;
        payrun.updated_at = Utc::now();
        Ok(payrun.clone())
    }

    async fn insert_payslip(&mut self, payslip: NewPayslip) -> StoreResult<Payslip> {
        if self.working.failing_payslips.contains(&payslip.employee_id) {
            return Err(AppError::DatabaseError(sqlx::Error::Protocol(format!(
                "payslip insert rejected for employee {}",
                payslip.employee_id
            ))));
        }
        let duplicate = self
            .working
            .payslips
            .iter()
            .any(|p| p.payrun_id == payslip.payrun_id && p.employee_id == payslip.employee_id);
        if duplicate {
            return Err(AppError::Conflict("Resource already exists".to_string()));
        }

        let now = Utc::now();
        let figures = payslip.figures;
        let inserted = Payslip {
            id: Uuid::new_v4(),
            payrun_id: payslip.payrun_id,
            employee_id: payslip.employee_id,
            payable_days: figures.payable_days,
            total_worked_days: figures.total_worked_days,
            total_leaves: figures.total_leaves,
            basic_wage: figures.basic_wage,
            gross_wage: figures.gross_wage,
            net_wage: figures.net_wage,
            employer_cost: figures.employer_cost,
            status: PayslipStatus::Generated,
            created_at: now,
            updated_at: now,
        };
        self.working.payslips.push(inserted.clone());
        Ok(inserted)
    }

    async fn find_payslip(&mut self, id: Uuid) -> StoreResult<Option<Payslip>> {
        Ok(self.working.payslips.iter().find(|p| p.id == id).cloned())
    }

    async fn list_payslips_for_payrun(&mut self, payrun_id: Uuid) -> StoreResult<Vec<Payslip>> {
        Ok(self
            .working
            .payslips
            .iter()
            .filter(|p| p.payrun_id == payrun_id)
            .cloned()
            .collect())
    }

    async fn page_payslips_for_payrun(
        &mut self,
        payrun_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Page<Payslip>> {
        let payslips = self.list_payslips_for_payrun(payrun_id).await?;
        Ok(Page::slice(payslips, page))
    }

    async fn page_payslips_for_employee(
        &mut self,
        employee_id: Uuid,
        company_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Page<Payslip>> {
        let state = &self.working;
        let mut payslips: Vec<Payslip> = state
            .payslips
            .iter()
            .filter(|p| p.employee_id == employee_id)
            .filter(|p| {
                state
                    .payruns
                    .iter()
                    .any(|run| run.id == p.payrun_id && run.company_id == company_id)
            })
            .cloned()
            .collect();
        payslips.sort_by_key(|p| std::cmp::Reverse(state.payrun_period(p.payrun_id)));
        Ok(Page::slice(payslips, page))
    }

    async fn overwrite_payslip(
        &mut self,
        id: Uuid,
        figures: PayslipFigures,
    ) -> StoreResult<Payslip> {
        let payslip = self
            .working
            .payslips
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| missing("Payslip"))?;
        figures.apply(payslip);
        payslip.status = PayslipStatus::Generated;
        payslip.updated_at = Utc::now();
        Ok(payslip.clone())
    }

    async fn set_payslip_status(
        &mut self,
        id: Uuid,
        status: PayslipStatus,
    ) -> StoreResult<Payslip> {
        let payslip = self
            .working
            .payslips
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| missing("Payslip"))?;
        payslip.status = status;
        payslip.updated_at = Utc::now();
        Ok(payslip.clone())
    }

    async fn replace_payslip_components(
        &mut self,
        payslip_id: Uuid,
        lines: &[PayLine],
    ) -> StoreResult<Vec<PayslipComponent>> {
        self.working
            .payslip_components
            .retain(|c| c.payslip_id != payslip_id);

        let components: Vec<PayslipComponent> = lines
            .iter()
            .map(|line| PayslipComponent {
                id: Uuid::new_v4(),
                payslip_id,
                component_name: line.name.clone(),
                amount: line.amount.clone(),
                is_deduction: line.is_deduction,
            })
            .collect();
        self.working
            .payslip_components
            .extend(components.iter().cloned());
        Ok(components)
    }

    async fn list_payslip_components(
        &mut self,
        payslip_id: Uuid,
    ) -> StoreResult<Vec<PayslipComponent>> {
        Ok(self
            .working
            .payslip_components
            .iter()
            .filter(|c| c.payslip_id == payslip_id)
            .cloned()
            .collect())
    }
}
