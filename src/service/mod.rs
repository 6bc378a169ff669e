pub mod activity_service;
pub mod aggregation;
pub mod error;
pub mod sync;
