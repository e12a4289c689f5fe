pub mod health;
pub mod sagas;
pub mod stubs;
pub mod types;
