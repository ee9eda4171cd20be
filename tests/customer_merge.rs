mod common;

use backoffice_api::{
    dto::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    dto::orders::CreateOrderRequest,
    entity::customers::{Column as CustomerCol, Entity as Customers},
    error::AppError,
    services::{customer_service, order_service},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

// Integration flow: repeated orders from the same email resolve to one
// customer per store and merge differing contact details into alternates.
#[tokio::test]
async fn customer_identity_resolution_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::test_database_url() else {
        eprintln!(
            "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
        );
        return Ok(());
    };

    let state = common::setup_state(&database_url).await?;
    let store_id = common::seed_store(&state).await?;
    let product_id = common::seed_product(&state, store_id, 50, 100, 5).await?;
    let ctx = common::staff(store_id);

    let resp = order_service::create_order(
        &state,
        &ctx,
        CreateOrderRequest {
            customer: common::contact(
                "Jane Doe",
                "a@x.com",
                Some("555-1111"),
                Some("12 Main St"),
            ),
            product_id,
            quantity: 1,
            shipping_address: None,
            notes: None,
        },
    )
    .await?;
    let first_order = resp.data.unwrap();
    let customer_id = first_order.customer_id.unwrap();

    // same email in a different case, new name spelling, phone and address
    let resp = order_service::create_order(
        &state,
        &ctx,
        CreateOrderRequest {
            customer: common::contact(
                "J. Doe",
                "A@X.com ",
                Some("555-2222"),
                Some("99 Oak Ave"),
            ),
            product_id,
            quantity: 2,
            shipping_address: None,
            notes: None,
        },
    )
    .await?;
    let second_order = resp.data.unwrap();
    assert_eq!(second_order.customer_id, Some(customer_id));

    // still a single customer in the store
    let count = Customers::find()
        .filter(CustomerCol::StoreId.eq(store_id))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 1);

    // merge appended to alternates without touching the primaries
    let resp = customer_service::get_customer(&state, &ctx, customer_id).await?;
    let customer = resp.data.unwrap();
    assert_eq!(customer.name, "Jane Doe");
    assert_eq!(customer.email, "a@x.com");
    assert_eq!(customer.phone.as_deref(), Some("555-1111"));
    assert_eq!(customer.address.as_deref(), Some("12 Main St"));
    assert_eq!(customer.alternative_names.0, vec!["J. Doe"]);
    assert_eq!(customer.alternative_phones.0, vec!["555-2222"]);
    assert_eq!(customer.alternative_addresses.0, vec!["99 Oak Ave"]);

    // order snapshots keep the contact as it was at creation
    assert_eq!(first_order.customer_name, "Jane Doe");
    assert_eq!(second_order.customer_name, "Jane Doe");

    // a repeat of already-known values changes nothing
    let resp = order_service::create_order(
        &state,
        &ctx,
        CreateOrderRequest {
            customer: common::contact(
                "jane doe",
                "A@x.com",
                Some("(555) 2222"),
                Some("99 OAK AVE"),
            ),
            product_id,
            quantity: 1,
            shipping_address: None,
            notes: None,
        },
    )
    .await?;
    assert_eq!(resp.data.unwrap().customer_id, Some(customer_id));
    let resp = customer_service::get_customer(&state, &ctx, customer_id).await?;
    let customer = resp.data.unwrap();
    assert_eq!(customer.alternative_names.0, vec!["J. Doe"]);
    assert_eq!(customer.alternative_phones.0, vec!["555-2222"]);
    assert_eq!(customer.alternative_addresses.0, vec!["99 Oak Ave"]);

    // explicit creation with a known email is rejected
    let err = customer_service::create_customer(
        &state,
        &ctx,
        CreateCustomerRequest {
            name: "Jane Doe".into(),
            email: "A@X.COM".into(),
            phone: None,
            address: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // deletion is blocked while orders reference the customer
    let err = customer_service::delete_customer(&state, &ctx, customer_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // replacing a primary phone keeps the old one as an alternate
    let resp = customer_service::create_customer(
        &state,
        &ctx,
        CreateCustomerRequest {
            name: "Bob".into(),
            email: "bob@x.com".into(),
            phone: Some("555-7777".into()),
            address: None,
        },
    )
    .await?;
    let bob = resp.data.unwrap();
    let resp = customer_service::update_customer(
        &state,
        &ctx,
        bob.id,
        UpdateCustomerRequest {
            phone: Some("555-8888".into()),
            address: None,
        },
    )
    .await?;
    let bob = resp.data.unwrap();
    assert_eq!(bob.phone.as_deref(), Some("555-8888"));
    assert_eq!(bob.alternative_phones.0, vec!["555-7777"]);

    // a customer without orders can be deleted
    customer_service::delete_customer(&state, &ctx, bob.id).await?;
    let err = customer_service::get_customer(&state, &ctx, bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // the same email in another store is a different customer
    let other_store = common::seed_store(&state).await?;
    let other_ctx = common::staff(other_store);
    let other_product = common::seed_product(&state, other_store, 10, 10, 0).await?;
    let resp = order_service::create_order(
        &state,
        &other_ctx,
        CreateOrderRequest {
            customer: common::contact("Jane Doe", "a@x.com", None, None),
            product_id: other_product,
            quantity: 1,
            shipping_address: None,
            notes: None,
        },
    )
    .await?;
    let foreign_order = resp.data.unwrap();
    assert_ne!(foreign_order.customer_id, Some(customer_id));

    // and it is invisible from the first store
    let err =
        customer_service::get_customer(&state, &ctx, foreign_order.customer_id.unwrap())
            .await
            .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}
