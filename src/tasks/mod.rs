pub mod take_delivery;
pub mod zip_line;
