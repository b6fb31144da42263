mod common;

use anyhow::Result;
use serde_json::json;

use payroll_portal::resources::employees::NewEmployee;
use payroll_portal::ClientError;

fn new_employee() -> NewEmployee {
    NewEmployee {
        user_id: 12,
        first_name: "Bob".into(),
        last_name: "Builder".into(),
        designation: "Engineer".into(),
        department: "R&D".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn nested_shape_is_tried_first() -> Result<()> {
    let backend = common::MockBackend::spawn().await?;
    backend.on("POST", "/employees", 201, json!({ "id": 40 }));
    let (mut portal, _store) = backend.portal_with(&common::admin_session("t9", 1, "root")).await?;

    let created = portal
        .create_with_fallback_shape(&new_employee().to_linked_create()?)
        .await?;

    assert_eq!(created["id"], 40);
    let sent = backend.requests_to("POST", "/employees");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body["user"], json!({ "id": 12 }));
    assert!(sent[0].body.get("userId").is_none());
    Ok(())
}

#[tokio::test]
async fn validation_rejection_retries_flat_once() -> Result<()> {
    let backend = common::MockBackend::spawn().await?;
    backend.on("POST", "/employees", 422, json!({ "message": "user must not be null" }));
    backend.on("POST", "/employees", 201, json!({ "id": 41 }));
    let (mut portal, _store) = backend.portal_with(&common::admin_session("t9", 1, "root")).await?;

    let created = portal
        .create_with_fallback_shape(&new_employee().to_linked_create()?)
        .await?;

    assert_eq!(created["id"], 41);
    let sent = backend.requests_to("POST", "/employees");
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].body["userId"], 12);
    assert!(sent[1].body.get("user").is_none());
    assert_eq!(sent[1].body["firstName"], sent[0].body["firstName"]);
    Ok(())
}

#[tokio::test]
async fn flat_failure_is_surfaced_without_another_retry() -> Result<()> {
    let backend = common::MockBackend::spawn().await?;
    backend.on("POST", "/employees", 400, json!({ "message": "bad shape" }));
    backend.on("POST", "/employees", 422, json!({ "message": "userId does not exist" }));
    let (mut portal, _store) = backend.portal_with(&common::admin_session("t9", 1, "root")).await?;

    let err = portal
        .create_with_fallback_shape(&new_employee().to_linked_create()?)
        .await
        .unwrap_err();

    match err {
        ClientError::ValidationRejected { status, message, .. } => {
            assert_eq!(status, 422);
            assert_eq!(message, "userId does not exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(backend.requests_to("POST", "/employees").len(), 2);
    Ok(())
}

#[tokio::test]
async fn other_failures_do_not_retry() -> Result<()> {
    let backend = common::MockBackend::spawn().await?;
    backend.on("POST", "/employees", 409, json!({ "message": "already exists" }));
    let (mut portal, _store) = backend.portal_with(&common::admin_session("t9", 1, "root")).await?;

    let err = portal
        .create_with_fallback_shape(&new_employee().to_linked_create()?)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(backend.requests_to("POST", "/employees").len(), 1);
    Ok(())
}
