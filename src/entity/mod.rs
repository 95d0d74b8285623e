pub mod audit_logs;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;
pub mod sea_orm_active_enums;
pub mod seller_profiles;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use products::Entity as Products;
pub use seller_profiles::Entity as SellerProfiles;
pub use users::Entity as Users;
