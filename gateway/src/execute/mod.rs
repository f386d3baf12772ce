//! Execute handlers, grouped by concern.

pub mod admin;
pub mod deposit;
pub mod withdraw;
