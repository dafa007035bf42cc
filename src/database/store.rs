//! Data-access seams used by the payroll services.
//!
//! Every operation runs against a [`Session`]: one open transaction obtained
//! from a [`Database`]. Services are generic over these traits so the
//! Postgres store and the in-memory store are interchangeable.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::models::{
    AttendanceCounts, AttendancePatch, AttendanceRecord, Employee,
    LeaveAllocation, LeaveRequest, LeaveRequestFilter, LeaveRequestStatus, LeaveType,
    LeaveTypeInput, NewAttendanceRecord, NewLeaveAllocation, NewLeaveRequest, NewPayrun,
    NewPayslip, NewSalaryComponent, Page, PageRequest, PayLine, Payrun, PayrunStatus, Payslip, PayslipComponent,
    PayslipFigures, PayslipStatus, SalaryComponent, SalaryComponentPatch, SalaryStructure,
    SalaryStructureUpsert,
};
use crate::error::AppError;

pub type StoreResult<T> = Result<T, AppError>;

/// Employee identity and company scoping, owned by an external directory.
#[async_trait]
pub trait EmployeeDirectory {
    async fn find_employee(&mut self, employee_id: Uuid) -> StoreResult<Option<Employee>>;

    async fn list_company_employees(&mut self, company_id: Uuid) -> StoreResult<Vec<Employee>>;

    async fn list_company_ids(&mut self) -> StoreResult<Vec<Uuid>>;
}

#[async_trait]
pub trait AttendanceStore {
    /// Locks the row for the rest of the session where the store supports it.
    async fn find_attendance(
        &mut self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Returns `None` when a row for (employee_id, date) already exists.
    async fn insert_attendance(
        &mut self,
        record: NewAttendanceRecord,
    ) -> StoreResult<Option<AttendanceRecord>>;

    async fn update_attendance(
        &mut self,
        id: Uuid,
        patch: AttendancePatch,
    ) -> StoreResult<AttendanceRecord>;

    async fn list_attendance(
        &mut self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>>;

    async fn count_attendance_by_status(
        &mut self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<AttendanceCounts>;

    async fn list_attendance_on(
        &mut self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>>;

    /// Employees of the company with neither an attendance row nor an
    /// approved leave covering `date`.
    async fn find_unaccounted_employees(
        &mut self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Uuid>>;
}

#[async_trait]
pub trait LeaveStore {
    async fn list_leave_types(&mut self) -> StoreResult<Vec<LeaveType>>;

    async fn find_leave_type(&mut self, id: Uuid) -> StoreResult<Option<LeaveType>>;

    async fn insert_leave_type(&mut self, input: LeaveTypeInput) -> StoreResult<LeaveType>;

    async fn insert_leave_allocation(
        &mut self,
        allocation: NewLeaveAllocation,
    ) -> StoreResult<LeaveAllocation>;

    async fn list_leave_allocations(
        &mut self,
        company_id: Uuid,
        employee_id: Option<Uuid>,
    ) -> StoreResult<Vec<LeaveAllocation>>;

    /// Oldest allocation for (employee, leave type), if any.
    async fn first_leave_allocation(
        &mut self,
        employee_id: Uuid,
        leave_type_id: Uuid,
    ) -> StoreResult<Option<LeaveAllocation>>;

    async fn add_used_days(&mut self, allocation_id: Uuid, days: f64)
    -> StoreResult<LeaveAllocation>;

    async fn insert_leave_request(&mut self, request: NewLeaveRequest) -> StoreResult<LeaveRequest>;

    /// Locks the row for the rest of the session where the store supports it.
    async fn find_leave_request(&mut self, id: Uuid) -> StoreResult<Option<LeaveRequest>>;

    async fn list_leave_requests(
        &mut self,
        company_id: Uuid,
        filter: LeaveRequestFilter,
    ) -> StoreResult<Vec<LeaveRequest>>;

    async fn set_leave_request_status(
        &mut self,
        id: Uuid,
        status: LeaveRequestStatus,
        reviewed_by: Uuid,
    ) -> StoreResult<LeaveRequest>;
}

#[async_trait]
pub trait SalaryStore {
    async fn find_salary_structure(
        &mut self,
        employee_id: Uuid,
    ) -> StoreResult<Option<SalaryStructure>>;

    /// One row per employee; a second upsert replaces every mutable field.
    async fn upsert_salary_structure(
        &mut self,
        upsert: SalaryStructureUpsert,
    ) -> StoreResult<SalaryStructure>;

    async fn list_salary_structures(&mut self, company_id: Uuid)
    -> StoreResult<Vec<SalaryStructure>>;

    async fn list_salary_components(
        &mut self,
        employee_id: Uuid,
    ) -> StoreResult<Vec<SalaryComponent>>;

    async fn find_salary_component(
        &mut self,
        employee_id: Uuid,
        component_id: Uuid,
    ) -> StoreResult<Option<SalaryComponent>>;

    async fn insert_salary_component(
        &mut self,
        component: NewSalaryComponent,
    ) -> StoreResult<SalaryComponent>;

    async fn update_salary_component(
        &mut self,
        component_id: Uuid,
        patch: SalaryComponentPatch,
        amount: BigDecimal,
    ) -> StoreResult<SalaryComponent>;

    async fn delete_salary_component(
        &mut self,
        employee_id: Uuid,
        component_id: Uuid,
    ) -> StoreResult<bool>;
}

#[async_trait]
pub trait PayrunStore {
    async fn find_payrun_for_period(
        &mut self,
        company_id: Uuid,
        period_month: i32,
        period_year: i32,
    ) -> StoreResult<Option<Payrun>>;

    /// Fails with `Conflict` when the period already has a payrun.
    async fn insert_payrun(&mut self, payrun: NewPayrun) -> StoreResult<Payrun>;

    async fn find_payrun(&mut self, id: Uuid) -> StoreResult<Option<Payrun>>;

    async fn list_payruns(&mut self, company_id: Uuid) -> StoreResult<Vec<Payrun>>;

    async fn page_payruns(
        &mut self,
        company_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Page<Payrun>>;

    async fn update_payrun_totals(
        &mut self,
        id: Uuid,
        employee_count: i32,
        total_employer_cost: BigDecimal,
    ) -> StoreResult<Payrun>;

    async fn set_payrun_status(&mut self, id: Uuid, status: PayrunStatus) -> StoreResult<Payrun>;

    async fn insert_payslip(&mut self, payslip: NewPayslip) -> StoreResult<Payslip>;

    async fn find_payslip(&mut self, id: Uuid) -> StoreResult<Option<Payslip>>;

    async fn list_payslips_for_payrun(&mut self, payrun_id: Uuid) -> StoreResult<Vec<Payslip>>;

    async fn page_payslips_for_payrun(
        &mut self,
        payrun_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Page<Payslip>>;

    /// Payslips of `employee_id` from payruns of `company_id`, newest period first.
    async fn page_payslips_for_employee(
        &mut self,
        employee_id: Uuid,
        company_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Page<Payslip>>;

    /// Overwrites figures and resets the status to `generated`.
    async fn overwrite_payslip(&mut self, id: Uuid, figures: PayslipFigures)
    -> StoreResult<Payslip>;

    async fn set_payslip_status(&mut self, id: Uuid, status: PayslipStatus)
    -> StoreResult<Payslip>;

    /// Deletes every component row of the payslip and inserts `lines`.
    async fn replace_payslip_components(
        &mut self,
        payslip_id: Uuid,
        lines: &[PayLine],
    ) -> StoreResult<Vec<PayslipComponent>>;

    async fn list_payslip_components(
        &mut self,
        payslip_id: Uuid,
    ) -> StoreResult<Vec<PayslipComponent>>;
}

/// One open unit of work.
#[async_trait]
pub trait Session:
    EmployeeDirectory + AttendanceStore + LeaveStore + SalaryStore + PayrunStore + Send
{
    async fn commit(self) -> StoreResult<()>;

    async fn rollback(self) -> StoreResult<()>;
}

#[async_trait]
pub trait Database: Clone + Send + Sync + 'static {
    type Session: Session;

    async fn begin(&self) -> StoreResult<Self::Session>;
}
