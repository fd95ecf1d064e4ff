pub mod calibration;
pub mod traits;
pub mod types;
