#![allow(dead_code)]

use actix_web::{body::MessageBody, dev::ServiceResponse, test};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use fake::{
    Fake,
    faker::name::en::{FirstName, LastName},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use payroll::config::Config;
use payroll::database::models::{
    AttendanceStatus, Employee, LeaveAllocation, LeaveAllocationInput, LeaveType, LeaveTypeInput,
    NewAttendanceRecord, NewLeaveAllocation, SalaryStructure, SalaryStructureInput,
    SalaryStructureUpsert,
};
use payroll::database::{AttendanceStore, LeaveStore, MemoryDatabase, SalaryStore, transaction};
use payroll::handlers::shared::ApiResponse;
use payroll::services::{Claims, Role};

/// Builds the full API over the context's in-memory store.
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($ctx.db.clone()))
                .app_data(actix_web::web::Data::new($ctx.config.clone()))
                .wrap(payroll::middleware::RequestId)
                .configure(payroll::routes::configure::<payroll::MemoryDatabase>),
        )
        .await
    };
}

pub struct TestContext {
    pub db: MemoryDatabase,
    pub config: Config,
    pub company_id: Uuid,
}

impl TestContext {
    pub fn new() -> Self {
        setup_test_env();
        TestContext {
            db: MemoryDatabase::new(),
            config: Config::test_config(),
            company_id: Uuid::new_v4(),
        }
    }

    pub async fn add_employee(&self) -> Employee {
        self.add_employee_in(self.company_id).await
    }

    pub async fn add_employee_in(&self, company_id: Uuid) -> Employee {
        let employee = Employee {
            id: Uuid::new_v4(),
            company_id,
            user_id: Some(Uuid::new_v4()),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
        };
        self.db.add_employee(employee.clone()).await;
        employee
    }

    pub fn token(&self, role: Role, employee_id: Option<Uuid>) -> String {
        self.token_in(self.company_id, role, employee_id)
    }

    pub fn token_in(&self, company_id: Uuid, role: Role, employee_id: Option<Uuid>) -> String {
        let claims = Claims {
            sub: Uuid::new_v4(),
            company_id,
            employee_id,
            role,
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .expect("Failed to encode test token")
    }

    pub async fn set_structure(
        &self,
        employee_id: Uuid,
        monthly_wage: &str,
        working_days_per_week: i32,
    ) -> SalaryStructure {
        let input = SalaryStructureInput {
            monthly_wage: monthly_wage.parse::<BigDecimal>().expect("wage"),
            working_days_per_week: Some(working_days_per_week),
            break_hours: None,
            pf_employee_rate: None,
            pf_employer_rate: None,
            professional_tax_override: None,
        };
        self.upsert_structure(employee_id, input).await
    }

    pub async fn upsert_structure(
        &self,
        employee_id: Uuid,
        input: SalaryStructureInput,
    ) -> SalaryStructure {
        transaction::run(&self.db, move |session| {
            Box::pin(async move {
                session
                    .upsert_salary_structure(SalaryStructureUpsert::new(employee_id, input))
                    .await
            })
        })
        .await
        .expect("Failed to upsert salary structure")
    }

    pub async fn leave_type(&self, name: &str) -> LeaveType {
        let input = LeaveTypeInput {
            name: name.to_string(),
            is_paid: true,
        };
        transaction::run(&self.db, move |session| {
            Box::pin(async move { session.insert_leave_type(input).await })
        })
        .await
        .expect("Failed to create leave type")
    }

    pub async fn allocate(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        allocated_days: f64,
    ) -> LeaveAllocation {
        let allocation = NewLeaveAllocation {
            input: LeaveAllocationInput {
                employee_id,
                leave_type_id,
                allocated_days,
                valid_from: None,
                valid_to: None,
                notes: None,
            },
            created_by: None,
        };
        transaction::run(&self.db, move |session| {
            Box::pin(async move { session.insert_leave_allocation(allocation).await })
        })
        .await
        .expect("Failed to allocate leave")
    }

    /// Stores one attendance row per date with the given status.
    pub async fn record_days(&self, employee_id: Uuid, dates: Vec<NaiveDate>, status: AttendanceStatus) {
        transaction::run(&self.db, move |session| {
            Box::pin(async move {
                for date in dates {
                    session
                        .insert_attendance(NewAttendanceRecord::synthetic(employee_id, date, status))
                        .await?;
                }
                Ok(())
            })
        })
        .await
        .expect("Failed to record attendance");
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid test date")
}

/// The first `count` weekdays of a month, in order.
pub fn weekdays(year: i32, month: u32, count: usize) -> Vec<NaiveDate> {
    use chrono::{Datelike, Weekday};

    NaiveDate::from_ymd_opt(year, month, 1)
        .expect("Invalid month")
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(count)
        .collect()
}

pub async fn assert_success_response<T, B>(resp: ServiceResponse<B>) -> T
where
    T: DeserializeOwned,
    B: MessageBody,
{
    let body = test::read_body(resp).await;
    let response: ApiResponse<T> =
        serde_json::from_slice(&body).expect("Failed to parse JSON response");

    assert!(
        response.success,
        "Expected successful response but got error: {:?}",
        response.message
    );
    response.data.expect("Expected data in successful response")
}

pub async fn assert_error_code<B: MessageBody>(resp: ServiceResponse<B>, expected: &str) {
    let body = test::read_body(resp).await;
    let response: ApiResponse<serde_json::Value> =
        serde_json::from_slice(&body).expect("Failed to parse JSON response");

    assert!(!response.success, "Expected an error response");
    assert_eq!(response.code.as_deref(), Some(expected));
}

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}
