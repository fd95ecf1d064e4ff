pub mod actuation;
pub mod control_law;
pub mod enigo_input;
pub mod input;
pub mod window;
