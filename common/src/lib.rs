//! Architecture glue shared by the driver crates.
//!
//! - [`arch`]: CPU-level interrupt masking for the build target
//! - [`sync`]: locks that are safe to share with interrupt handlers

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod sync;
