//! Core types for Wayside.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod status;
pub mod verification;

pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
pub use verification::{CodeError, VerificationCode, verification_expiry};
