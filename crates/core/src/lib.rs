//! Wayside Core - Shared types library.
//!
//! This crate provides common types used across all Wayside components:
//! - `admin` - Staff dashboard backend and privileged API host
//! - `mobile` - Companion-app backend (sign-in, check-in, giving, groups)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, statuses, and
//!   verification codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
