mod common;

use backoffice_api::{
    dto::orders::{CreateOrderRequest, UpdateOrderQuantityRequest, UpdateOrderStatusRequest},
    entity::products::Entity as Products,
    error::AppError,
    models::OrderStatus,
    services::order_service,
};
use sea_orm::EntityTrait;

// Integration flow: order creation resolves the customer, snapshots contact
// data, decrements stock, and the status graph gates every transition.
#[tokio::test]
async fn order_lifecycle_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::test_database_url() else {
        eprintln!(
            "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
        );
        return Ok(());
    };

    let state = common::setup_state(&database_url).await?;
    let store_id = common::seed_store(&state).await?;
    let product_id = common::seed_product(&state, store_id, 50, 10, 10).await?;
    let ctx = common::staff(store_id);

    // quantity below 1 is rejected before anything is written
    let err = order_service::create_order(
        &state,
        &ctx,
        CreateOrderRequest {
            customer: common::contact("Jane Doe", "jane@example.com", None, None),
            product_id,
            quantity: 0,
            shipping_address: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let resp = order_service::create_order(
        &state,
        &ctx,
        CreateOrderRequest {
            customer: common::contact(
                "Jane Doe",
                "jane@example.com",
                Some("555-1111"),
                Some("12 Main St"),
            ),
            product_id,
            quantity: 2,
            shipping_address: None,
            notes: Some("Gift wrap".into()),
        },
    )
    .await?;
    let order = resp.data.unwrap();
    assert_eq!(order.total, 100);
    assert_eq!(order.unit_price, 50);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(!order.is_paid);
    assert_eq!(order.payment_status, "unpaid");
    assert_eq!(order.customer_name, "Jane Doe");
    assert_eq!(order.product_name, "Test Widget");
    assert_eq!(order.timeline.0.len(), 1);
    assert_eq!(order.timeline.0[0].description, "Order created");
    assert_eq!(order.timeline.0[0].actor, "Jane Doe");

    // stock decremented at creation; 8 <= 10 keeps the low-stock flag on
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(product.stock_quantity, 8);
    assert!(product.low_stock);

    // quantity edits recompute the total from the stored unit price and
    // leave inventory alone
    let resp = order_service::update_order_quantity(
        &state,
        &ctx,
        order.id,
        UpdateOrderQuantityRequest { quantity: 3 },
    )
    .await?;
    let order = resp.data.unwrap();
    assert_eq!(order.total, 150);
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(product.stock_quantity, 8);

    // skipping a state is rejected
    let err = order_service::update_order_status(
        &state,
        &ctx,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Paid,
            actor: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    // walk the happy path, payment state following the status
    let steps = [
        (OrderStatus::Accepted, false, "unpaid"),
        (OrderStatus::Paid, true, "paid"),
        (OrderStatus::Shipped, true, "paid"),
        (OrderStatus::Completed, true, "paid"),
    ];
    for (next, is_paid, payment_status) in steps {
        let resp = order_service::update_order_status(
            &state,
            &ctx,
            order.id,
            UpdateOrderStatusRequest {
                status: next,
                actor: Some("Staff".into()),
            },
        )
        .await?;
        let updated = resp.data.unwrap();
        assert_eq!(updated.status, next);
        assert_eq!(updated.is_paid, is_paid);
        assert_eq!(updated.payment_status, payment_status);
    }

    // refund is still reachable from completed and flips payment state back
    let resp = order_service::update_order_status(
        &state,
        &ctx,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Refunded,
            actor: Some("Staff".into()),
        },
    )
    .await?;
    let order = resp.data.unwrap();
    assert_eq!(order.status, OrderStatus::Refunded);
    assert!(!order.is_paid);
    assert_eq!(order.payment_status, "refunded");

    // one creation entry, one quantity entry, five transitions
    assert_eq!(order.timeline.0.len(), 7);

    // refunded is terminal
    let err = order_service::update_order_status(
        &state,
        &ctx,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Pending,
            actor: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    // another store can neither see the order nor order this product
    let other_store = common::seed_store(&state).await?;
    let other_ctx = common::staff(other_store);
    let err = order_service::get_order(&state, &other_ctx, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = order_service::create_order(
        &state,
        &other_ctx,
        CreateOrderRequest {
            customer: common::contact("Eve", "eve@example.com", None, None),
            product_id,
            quantity: 1,
            shipping_address: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}
