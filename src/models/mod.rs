pub mod activitymodel;
pub mod maintenancemodel;
pub mod paymentmodel;
pub mod propertymodel;
