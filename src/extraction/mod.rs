pub mod classify;
pub mod panel;
pub mod rows;
pub mod text;
