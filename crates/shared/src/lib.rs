pub mod calc;
pub mod color;
pub mod format;
pub mod models;
