mod common;

use backoffice_api::{
    dto::orders::CreateOrderRequest,
    dto::returns::{CreateReturnRequest, UpdateReturnStatusRequest},
    entity::products::Entity as Products,
    error::AppError,
    models::ReturnStatus,
    services::{order_service, return_service},
};
use sea_orm::EntityTrait;
use uuid::Uuid;

async fn stock_of(state: &backoffice_api::state::AppState, product_id: Uuid) -> anyhow::Result<i32> {
    Ok(Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .unwrap()
        .stock_quantity)
}

// Integration flow: returns validate against the referenced order, keep an
// append-only history, and credit stock back exactly once.
#[tokio::test]
async fn return_workflow_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::test_database_url() else {
        eprintln!(
            "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
        );
        return Ok(());
    };

    let state = common::setup_state(&database_url).await?;
    let store_id = common::seed_store(&state).await?;
    let product_id = common::seed_product(&state, store_id, 50, 5, 0).await?;
    let ctx = common::staff(store_id);

    let resp = order_service::create_order(
        &state,
        &ctx,
        CreateOrderRequest {
            customer: common::contact("Jane Doe", "jane@example.com", None, None),
            product_id,
            quantity: 1,
            shipping_address: None,
            notes: None,
        },
    )
    .await?;
    let order = resp.data.unwrap();

    assert_eq!(stock_of(&state, product_id).await?, 4);

    // over-returning is rejected
    let err = return_service::create_return(
        &state,
        &ctx,
        CreateReturnRequest {
            order_id: order.id,
            reason: "Damaged".into(),
            returned_quantity: 2,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let resp = return_service::create_return(
        &state,
        &ctx,
        CreateReturnRequest {
            order_id: order.id,
            reason: "Damaged".into(),
            returned_quantity: 1,
        },
    )
    .await?;
    let ret = resp.data.unwrap();
    assert_eq!(ret.status, ReturnStatus::Submitted);
    assert_eq!(ret.refund_amount, 50);
    assert_eq!(ret.history.0.len(), 1);
    assert_eq!(ret.history.0[0].actor, "Customer");
    assert_eq!(
        ret.history.0[0].note.as_deref(),
        Some("Return request submitted")
    );

    // refund is not reachable while still submitted
    let err = return_service::update_return_status(
        &state,
        &ctx,
        ret.id,
        UpdateReturnStatusRequest {
            status: ReturnStatus::Refunded,
            note: None,
            actor: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
    assert_eq!(stock_of(&state, product_id).await?, 4);

    // approval credits the stock back
    let resp = return_service::update_return_status(
        &state,
        &ctx,
        ret.id,
        UpdateReturnStatusRequest {
            status: ReturnStatus::Approved,
            note: Some("Inspection passed".into()),
            actor: Some("Staff".into()),
        },
    )
    .await?;
    let ret = resp.data.unwrap();
    assert_eq!(ret.status, ReturnStatus::Approved);
    assert_eq!(ret.history.0.len(), 2);
    assert_eq!(stock_of(&state, product_id).await?, 5);

    // approving an already-approved return fails and must not credit again
    let err = return_service::update_return_status(
        &state,
        &ctx,
        ret.id,
        UpdateReturnStatusRequest {
            status: ReturnStatus::Approved,
            note: None,
            actor: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
    assert_eq!(stock_of(&state, product_id).await?, 5);

    // the refund transition records history but does not credit a second time
    let resp = return_service::update_return_status(
        &state,
        &ctx,
        ret.id,
        UpdateReturnStatusRequest {
            status: ReturnStatus::Refunded,
            note: None,
            actor: Some("Staff".into()),
        },
    )
    .await?;
    let ret = resp.data.unwrap();
    assert_eq!(ret.status, ReturnStatus::Refunded);
    assert_eq!(stock_of(&state, product_id).await?, 5);
    assert_eq!(ret.history.0.len(), 3);
    let statuses: Vec<ReturnStatus> = ret.history.0.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            ReturnStatus::Submitted,
            ReturnStatus::Approved,
            ReturnStatus::Refunded
        ]
    );

    // refunded is terminal
    let err = return_service::update_return_status(
        &state,
        &ctx,
        ret.id,
        UpdateReturnStatusRequest {
            status: ReturnStatus::Rejected,
            note: None,
            actor: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    // the rejection branch never touches stock
    let resp = return_service::create_return(
        &state,
        &ctx,
        CreateReturnRequest {
            order_id: order.id,
            reason: "Changed my mind".into(),
            returned_quantity: 1,
        },
    )
    .await?;
    let rejected = resp.data.unwrap();
    let resp = return_service::update_return_status(
        &state,
        &ctx,
        rejected.id,
        UpdateReturnStatusRequest {
            status: ReturnStatus::Rejected,
            note: Some("Outside the return window".into()),
            actor: Some("Staff".into()),
        },
    )
    .await?;
    let rejected = resp.data.unwrap();
    assert_eq!(rejected.status, ReturnStatus::Rejected);
    assert_eq!(stock_of(&state, product_id).await?, 5);

    // a return cannot reference an order from another store
    let other_store = common::seed_store(&state).await?;
    let other_ctx = common::staff(other_store);
    let err = return_service::create_return(
        &state,
        &other_ctx,
        CreateReturnRequest {
            order_id: order.id,
            reason: "Wrong store".into(),
            returned_quantity: 1,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}
