//! Anime Tribes storefront library.
//!
//! The shopper-facing core: the persisted cart, the multi-step checkout
//! flow and the order gateway it finalizes against.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
