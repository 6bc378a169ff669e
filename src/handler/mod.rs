pub mod activity;
pub mod maintenance;
pub mod payments;
pub mod properties;
pub mod reports;
pub mod sync;
