use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        customers::{CreateCustomerRequest, CustomerContact, CustomerList, UpdateCustomerRequest},
        orders::{
            CreateOrderRequest, OrderList, UpdateOrderQuantityRequest, UpdateOrderStatusRequest,
        },
        products::{
            CreateProductRequest, InventoryAdjustRequest, ProductList, UpdateProductRequest,
        },
        returns::{CreateReturnRequest, ReturnList, UpdateReturnStatusRequest},
        stores::{CreateStoreRequest, StoreList},
    },
    models::{
        Alternates, Customer, Order, OrderStatus, Product, Return, ReturnHistory,
        ReturnHistoryEntry, ReturnStatus, Store, Timeline, TimelineEntry,
    },
    response::{ApiResponse, Meta},
    routes::{customers, health, orders, params, products, returns, stores},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        stores::list_stores,
        stores::create_store,
        stores::get_store,
        customers::list_customers,
        customers::create_customer,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        products::list_products,
        products::list_low_stock,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::adjust_inventory,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order_status,
        orders::update_order_quantity,
        returns::list_returns,
        returns::create_return,
        returns::get_return,
        returns::update_return_status
    ),
    components(
        schemas(
            Store,
            Customer,
            Product,
            Order,
            Return,
            OrderStatus,
            ReturnStatus,
            Alternates,
            Timeline,
            TimelineEntry,
            ReturnHistory,
            ReturnHistoryEntry,
            CustomerContact,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            CustomerList,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            UpdateOrderQuantityRequest,
            OrderList,
            CreateProductRequest,
            UpdateProductRequest,
            InventoryAdjustRequest,
            ProductList,
            CreateReturnRequest,
            UpdateReturnStatusRequest,
            ReturnList,
            CreateStoreRequest,
            StoreList,
            params::Pagination,
            Meta,
            ApiResponse<Store>,
            ApiResponse<Customer>,
            ApiResponse<Product>,
            ApiResponse<Order>,
            ApiResponse<Return>,
            ApiResponse<CustomerList>,
            ApiResponse<ProductList>,
            ApiResponse<OrderList>,
            ApiResponse<ReturnList>,
            ApiResponse<StoreList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Stores", description = "Store (tenant) management"),
        (name = "Customers", description = "Customer identity endpoints"),
        (name = "Products", description = "Product and inventory endpoints"),
        (name = "Orders", description = "Order lifecycle endpoints"),
        (name = "Returns", description = "Return workflow endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
