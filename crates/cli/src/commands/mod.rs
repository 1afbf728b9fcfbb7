//! CLI command implementations.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod slug;
