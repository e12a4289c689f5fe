pub mod chaos;
pub mod metrics;
pub mod stubs;
