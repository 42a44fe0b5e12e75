
pub mod error;
