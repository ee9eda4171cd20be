pub mod audit_logs;
pub mod customers;
pub mod orders;
pub mod products;
pub mod returns;
pub mod stores;

pub use audit_logs::Entity as AuditLogs;
pub use customers::Entity as Customers;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use returns::Entity as Returns;
pub use stores::Entity as Stores;
