pub mod align;
pub mod loop_control;
pub mod session;
