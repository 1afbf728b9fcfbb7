//! Anime Tribes Core - Shared types library.
//!
//! This crate provides the pieces shared by every Anime Tribes component:
//! - `storefront` - Cart store and checkout state machine
//! - `admin` - Admin session store and the slug-check service
//! - `cli` - Command-line driver for the stores
//!
//! # Architecture
//!
//! The core crate contains types, the permission catalog and the client
//! storage abstraction - no HTTP clients and no async runtime. Durable
//! storage backends other than [`MemoryStorage`] live with their binaries.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, email addresses and money formatting
//! - [`permission`] - Permission catalog, roles and default permission sets
//! - [`storage`] - Key/value client storage with JSON helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod permission;
pub mod storage;
pub mod types;

pub use permission::{Permission, PermissionSet, Role, RoleKind};
pub use storage::{MemoryStorage, PersistError, Storage, StorageError};
pub use types::*;
