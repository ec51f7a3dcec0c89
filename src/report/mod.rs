pub mod aggregate;
pub mod xlsx;
