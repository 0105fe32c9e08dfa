pub mod cors;
pub mod observability;
