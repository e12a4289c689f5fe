pub mod chaos;
pub mod correlation;
pub mod logging;
