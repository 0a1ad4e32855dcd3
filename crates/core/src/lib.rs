//! Face Calendar Core - Shared types library.
//!
//! This crate provides common types used across all Face Calendar components:
//! - `storefront` - Public-facing storefront and checkout service
//! - `integration-tests` - Workspace-level checkout flow tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, KRW amounts, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
