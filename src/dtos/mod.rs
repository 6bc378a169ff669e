pub mod maintenancedtos;
pub mod paymentdtos;
pub mod propertydtos;
pub mod reportdtos;
