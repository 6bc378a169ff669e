pub mod db;
pub mod activitydb;
pub mod localstore;
pub mod maintenancedb;
pub mod paymentdb;
pub mod propertydb;
