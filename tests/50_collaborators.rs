mod common;

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::json;

use payroll_portal::resources::leave::LeaveApplication;
use payroll_portal::resources::{employees, leave, payroll, reports, users};
use payroll_portal::{ClientError, Role};

#[tokio::test]
async fn user_admin_calls() -> Result<()> {
    let backend = common::MockBackend::spawn().await?;
    backend.on("GET", "/users", 200, json!([{ "id": 7, "role": "EMPLOYEE", "enabled": true }]));
    backend.on("PATCH", "/users/7/status", 200, json!({ "id": 7, "enabled": false }));
    backend.on("POST", "/users", 201, json!({ "id": 8, "username": "carol" }));
    let (portal, _store) = backend.portal_with(&common::admin_session("t9", 1, "root")).await?;
    let transport = portal.transport();

    let listed = users::list(transport, Some(&Role::Employee), Some(true)).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(
        backend.requests_to("GET", "/users")[0].query.as_deref(),
        Some("role=EMPLOYEE&enabled=true")
    );

    let updated = users::set_enabled(transport, 7, false).await?;
    assert_eq!(updated["enabled"], false);
    assert_eq!(
        backend.requests_to("PATCH", "/users/7/status")[0].body,
        json!({ "enabled": false })
    );

    let created = users::create(transport, json!({ "username": "carol", "role": "EMPLOYEE" })).await?;
    assert_eq!(created["id"], 8);
    Ok(())
}

#[tokio::test]
async fn employee_update_and_delete() -> Result<()> {
    let backend = common::MockBackend::spawn().await?;
    backend.on("PUT", "/employees/3", 200, json!({ "id": 3, "department": "Ops" }));
    backend.on("DELETE", "/employees/3", 204, serde_json::Value::Null);
    let (portal, _store) = backend.portal_with(&common::admin_session("t9", 1, "root")).await?;
    let transport = portal.transport();

    let updated = employees::update(transport, 3, json!({ "department": "Ops" })).await?;
    assert_eq!(updated["department"], "Ops");
    employees::delete(transport, 3).await?;

    assert_eq!(backend.request_lines(), vec!["PUT /employees/3", "DELETE /employees/3"]);
    Ok(())
}

#[tokio::test]
async fn leave_application_goes_out_as_query() -> Result<()> {
    let backend = common::MockBackend::spawn().await?;
    backend.on("POST", "/leave", 201, json!({ "id": 8, "status": "PENDING" }));
    let (portal, _store) = backend
        .portal_with(&common::employee_session("t1", 7, "alice"))
        .await?;
    let application = LeaveApplication::new(
        NaiveDate::from_ymd_opt(2024, 7, 1).expect("valid date"),
        NaiveDate::from_ymd_opt(2024, 7, 2).expect("valid date"),
    );

    let created = leave::apply(portal.transport(), &application).await?;

    assert_eq!(created["status"], "PENDING");
    let sent = &backend.requests_to("POST", "/leave")[0];
    assert_eq!(
        sent.query.as_deref(),
        Some("startDate=2024-07-01&endDate=2024-07-02&type=PAID")
    );
    assert!(sent.body.is_null());
    Ok(())
}

#[tokio::test]
async fn bad_periods_never_reach_the_server() -> Result<()> {
    let backend = common::MockBackend::spawn().await?;
    let (portal, _store) = backend.portal_with(&common::admin_session("t9", 1, "root")).await?;
    let transport = portal.transport();

    let err = reports::payroll_summary(transport, 2024, 13).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput { .. }), "got {err:?}");
    let err = payroll::create_run(transport, 1999, 1).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput { .. }), "got {err:?}");

    assert!(backend.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn reports_send_the_period() -> Result<()> {
    let backend = common::MockBackend::spawn().await?;
    backend.on(
        "GET",
        "/reports/department-cost",
        200,
        json!([{ "department": "R&D", "totalNet": 1000.0 }]),
    );
    let (portal, _store) = backend.portal_with(&common::admin_session("t9", 1, "root")).await?;

    let rows = reports::department_cost(portal.transport(), 2024, 5).await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(
        backend.requests_to("GET", "/reports/department-cost")[0].query.as_deref(),
        Some("year=2024&month=5")
    );
    Ok(())
}
