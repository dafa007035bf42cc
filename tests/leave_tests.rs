use actix_web::{http::StatusCode, test};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use payroll::database::models::{
    AttendanceStatus, LeaveAllocation, LeaveApproval, LeaveRequest, LeaveRequestStatus, LeaveType,
    NewAttendanceRecord,
};
use payroll::database::transaction;
use payroll::services::{Role, attendance};

#[macro_use]
mod common;

use common::{TestContext, assert_error_code, assert_success_response, bearer, date};

#[actix_web::test]
async fn test_create_leave_type_requires_admin_or_hr() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let employee_token = ctx.token(Role::Employee, Some(employee.id));
    let hr_token = ctx.token(Role::Hr, None);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/types")
        .insert_header(bearer(&employee_token))
        .set_json(json!({ "name": "Annual", "is_paid": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/types")
        .insert_header(bearer(&hr_token))
        .set_json(json!({ "name": "Annual", "is_paid": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let leave_type: LeaveType = assert_success_response(resp).await;
    assert_eq!(leave_type.name, "Annual");

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/types")
        .insert_header(bearer(&hr_token))
        .set_json(json!({ "name": "Annual", "is_paid": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/v1/leave/types")
        .insert_header(bearer(&employee_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let types: Vec<LeaveType> = assert_success_response(resp).await;
    assert_eq!(types.len(), 1);
}

#[actix_web::test]
async fn test_allocation_is_visible_to_the_employee() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;
    let hr_token = ctx.token(Role::Hr, None);
    let employee_token = ctx.token(Role::Employee, Some(employee.id));
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/allocations")
        .insert_header(bearer(&hr_token))
        .set_json(json!({
            "employee_id": employee.id,
            "leave_type_id": leave_type.id,
            "allocated_days": 12.0,
            "valid_from": "2025-01-01",
            "valid_to": "2025-12-31"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/v1/leave/allocations/me")
        .insert_header(bearer(&employee_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let allocations: Vec<LeaveAllocation> = assert_success_response(resp).await;
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].allocated_days, 12.0);
    assert_eq!(allocations[0].remaining_days(), 12.0);
}

#[actix_web::test]
async fn test_allocation_rejects_negative_days() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;
    let hr_token = ctx.token(Role::Hr, None);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/allocations")
        .insert_header(bearer(&hr_token))
        .set_json(json!({
            "employee_id": employee.id,
            "leave_type_id": leave_type.id,
            "allocated_days": -1.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error_code(resp, "validation").await;
}

#[actix_web::test]
async fn test_approving_a_week_of_leave_writes_attendance_and_charges_allocation() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;
    let allocation = ctx.allocate(employee.id, leave_type.id, 10.0).await;
    let employee_token = ctx.token(Role::Employee, Some(employee.id));
    let hr_token = ctx.token(Role::Hr, None);
    let app = test_app!(ctx);

    // Mon 2025-09-08 .. Fri 2025-09-12
    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&employee_token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "2025-09-08",
            "end_date": "2025-09-12",
            "notes": "Holiday"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let request: LeaveRequest = assert_success_response(resp).await;
    assert_eq!(request.status, LeaveRequestStatus::Pending);
    assert_eq!(request.employee_id, employee.id);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/leave/requests/{}/approve", request.id))
        .insert_header(bearer(&hr_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let approval: LeaveApproval = assert_success_response(resp).await;

    assert_eq!(approval.request.status, LeaveRequestStatus::Approved);
    assert!(approval.request.reviewed_by.is_some());
    assert_eq!(approval.days_charged, 5);
    assert_eq!(approval.attendance_days_written, 5);
    let charged = approval.allocation.expect("allocation charged");
    assert_eq!(charged.id, allocation.id);
    assert_eq!(charged.used_days, 5.0);

    let state = ctx.db.snapshot().await;
    let leave_days: Vec<_> = state
        .attendance
        .iter()
        .filter(|r| r.employee_id == employee.id && r.status == AttendanceStatus::Leave)
        .collect();
    assert_eq!(leave_days.len(), 5);
    assert!(leave_days.iter().all(|r| r.work_hours == 0.0 && r.check_in.is_none()));
}

#[actix_web::test]
async fn test_approval_without_allocation_still_succeeds() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Unpaid").await;
    let employee_token = ctx.token(Role::Employee, Some(employee.id));
    let payroll_token = ctx.token(Role::Payroll, None);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&employee_token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "2025-09-13",
            "end_date": "2025-09-14"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let request: LeaveRequest = assert_success_response(resp).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/leave/requests/{}/approve", request.id))
        .insert_header(bearer(&payroll_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let approval: LeaveApproval = assert_success_response(resp).await;

    assert!(approval.allocation.is_none());
    // Weekend days are written too
    assert_eq!(approval.attendance_days_written, 2);
}

#[actix_web::test]
async fn test_clock_in_wins_over_retroactive_leave() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;
    let employee_id = employee.id;

    // Tue checked in, Wed already marked absent, Mon untouched
    let checked_in_day = date("2025-09-09");
    let check_in_at = Utc.with_ymd_and_hms(2025, 9, 9, 9, 0, 0).unwrap();
    transaction::run(&ctx.db, move |session| {
        Box::pin(async move {
            attendance::check_in(session, employee_id, checked_in_day, check_in_at).await
        })
    })
    .await
    .unwrap();
    ctx.record_days(employee.id, vec![date("2025-09-10")], AttendanceStatus::Absent)
        .await;

    let employee_token = ctx.token(Role::Employee, Some(employee.id));
    let hr_token = ctx.token(Role::Admin, None);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&employee_token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "2025-09-08",
            "end_date": "2025-09-10"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let request: LeaveRequest = assert_success_response(resp).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/leave/requests/{}/approve", request.id))
        .insert_header(bearer(&hr_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let approval: LeaveApproval = assert_success_response(resp).await;
    assert_eq!(approval.attendance_days_written, 2);

    let state = ctx.db.snapshot().await;
    let status_on = |day: &str| {
        state
            .attendance
            .iter()
            .find(|r| r.date == date(day))
            .map(|r| (r.status, r.check_in))
            .expect("attendance row")
    };
    assert_eq!(status_on("2025-09-08"), (AttendanceStatus::Leave, None));
    assert_eq!(
        status_on("2025-09-09"),
        (AttendanceStatus::Present, Some(check_in_at))
    );
    assert_eq!(status_on("2025-09-10"), (AttendanceStatus::Leave, None));
}

#[actix_web::test]
async fn test_approval_rereads_rows_created_by_a_concurrent_writer() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;

    // Both rows land between the approval's lookup and its insert
    let check_in_at = Utc.with_ymd_and_hms(2025, 9, 10, 9, 0, 0).unwrap();
    ctx.db
        .race_attendance_insert(NewAttendanceRecord::synthetic(
            employee.id,
            date("2025-09-09"),
            AttendanceStatus::Absent,
        ))
        .await;
    ctx.db
        .race_attendance_insert(NewAttendanceRecord::present(
            employee.id,
            date("2025-09-10"),
            check_in_at,
        ))
        .await;

    let employee_token = ctx.token(Role::Employee, Some(employee.id));
    let hr_token = ctx.token(Role::Hr, None);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&employee_token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "2025-09-08",
            "end_date": "2025-09-10"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let request: LeaveRequest = assert_success_response(resp).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/leave/requests/{}/approve", request.id))
        .insert_header(bearer(&hr_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let approval: LeaveApproval = assert_success_response(resp).await;
    assert_eq!(approval.attendance_days_written, 2);

    let state = ctx.db.snapshot().await;
    assert_eq!(state.attendance.len(), 3);
    let status_on = |day: &str| {
        state
            .attendance
            .iter()
            .find(|r| r.date == date(day))
            .map(|r| (r.status, r.check_in))
            .expect("attendance row")
    };
    assert_eq!(status_on("2025-09-08"), (AttendanceStatus::Leave, None));
    assert_eq!(status_on("2025-09-09"), (AttendanceStatus::Leave, None));
    assert_eq!(
        status_on("2025-09-10"),
        (AttendanceStatus::Present, Some(check_in_at))
    );
}

#[actix_web::test]
async fn test_processed_request_cannot_be_reviewed_again() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;
    let employee_token = ctx.token(Role::Employee, Some(employee.id));
    let hr_token = ctx.token(Role::Hr, None);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&employee_token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "2025-09-15",
            "end_date": "2025-09-15"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let request: LeaveRequest = assert_success_response(resp).await;

    let approve_uri = format!("/api/v1/leave/requests/{}/approve", request.id);
    let reject_uri = format!("/api/v1/leave/requests/{}/reject", request.id);

    let req = test::TestRequest::patch()
        .uri(&approve_uri)
        .insert_header(bearer(&hr_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    for uri in [&approve_uri, &reject_uri] {
        let req = test::TestRequest::patch()
            .uri(uri)
            .insert_header(bearer(&hr_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_error_code(resp, "conflict").await;
    }
}

#[actix_web::test]
async fn test_rejection_leaves_attendance_and_balance_alone() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;
    ctx.allocate(employee.id, leave_type.id, 5.0).await;
    let employee_token = ctx.token(Role::Employee, Some(employee.id));
    let hr_token = ctx.token(Role::Hr, None);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&employee_token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "2025-09-15",
            "end_date": "2025-09-16"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let request: LeaveRequest = assert_success_response(resp).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/leave/requests/{}/reject", request.id))
        .insert_header(bearer(&hr_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let rejected: LeaveRequest = assert_success_response(resp).await;
    assert_eq!(rejected.status, LeaveRequestStatus::Rejected);

    let state = ctx.db.snapshot().await;
    assert!(state.attendance.is_empty());
    assert_eq!(state.leave_allocations[0].used_days, 0.0);
}

#[actix_web::test]
async fn test_request_validation() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;
    let token = ctx.token(Role::Employee, Some(employee.id));
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "2025-09-16",
            "end_date": "2025-09-15"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&token))
        .set_json(json!({
            "leave_type_id": Uuid::new_v4(),
            "start_date": "2025-09-15",
            "end_date": "2025-09-15"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "0001-01-01",
            "end_date": "9999-12-31"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_error_code(resp, "validation").await;

    // A full year is still accepted
    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "2025-01-01",
            "end_date": "2025-12-31"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(ctx.db.snapshot().await.leave_requests.len(), 1);
}

#[actix_web::test]
async fn test_employee_cannot_file_for_a_colleague() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let colleague = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;
    let token = ctx.token(Role::Employee, Some(employee.id));
    let hr_token = ctx.token(Role::Hr, None);
    let app = test_app!(ctx);

    let body = json!({
        "employee_id": colleague.id,
        "leave_type_id": leave_type.id,
        "start_date": "2025-09-15",
        "end_date": "2025-09-15"
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&token))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&hr_token))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let request: LeaveRequest = assert_success_response(resp).await;
    assert_eq!(request.employee_id, colleague.id);
}

#[actix_web::test]
async fn test_employees_list_only_their_own_requests() {
    let ctx = TestContext::new();
    let employee = ctx.add_employee().await;
    let colleague = ctx.add_employee().await;
    let leave_type = ctx.leave_type("Annual").await;
    let token = ctx.token(Role::Employee, Some(employee.id));
    let colleague_token = ctx.token(Role::Employee, Some(colleague.id));
    let hr_token = ctx.token(Role::Hr, None);
    let app = test_app!(ctx);

    for token in [&token, &colleague_token] {
        let req = test::TestRequest::post()
            .uri("/api/v1/leave/requests")
            .insert_header(bearer(token))
            .set_json(json!({
                "leave_type_id": leave_type.id,
                "start_date": "2025-09-15",
                "end_date": "2025-09-15"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // The employee_id filter is ignored for employees
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/leave/requests?employee_id={}", colleague.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let own: Vec<LeaveRequest> = assert_success_response(resp).await;
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].employee_id, employee.id);

    let req = test::TestRequest::get()
        .uri("/api/v1/leave/requests?status=pending")
        .insert_header(bearer(&hr_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let all: Vec<LeaveRequest> = assert_success_response(resp).await;
    assert_eq!(all.len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/v1/leave/requests?status=approved")
        .insert_header(bearer(&hr_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let approved: Vec<LeaveRequest> = assert_success_response(resp).await;
    assert!(approved.is_empty());
}

#[actix_web::test]
async fn test_cannot_review_another_companys_request() {
    let ctx = TestContext::new();
    let outsider = ctx.add_employee_in(Uuid::new_v4()).await;
    let leave_type = ctx.leave_type("Annual").await;
    let outsider_token = ctx.token_in(outsider.company_id, Role::Employee, Some(outsider.id));
    let hr_token = ctx.token(Role::Hr, None);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .insert_header(bearer(&outsider_token))
        .set_json(json!({
            "leave_type_id": leave_type.id,
            "start_date": "2025-09-15",
            "end_date": "2025-09-15"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let request: LeaveRequest = assert_success_response(resp).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/leave/requests/{}/approve", request.id))
        .insert_header(bearer(&hr_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let state = ctx.db.snapshot().await;
    assert_eq!(state.leave_requests[0].status, LeaveRequestStatus::Pending);
}
