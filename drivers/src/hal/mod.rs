//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! This module defines the traits the console is written against. They are
//! implemented by the serial family drivers in [`crate::peripheral`], by the
//! SoC drivers in [`crate::platform`], and by the mocks used in tests.
//!
//! # Available Interfaces
//!
//! - [`serial`]: Console backend capability set and peripheral identities
//! - [`interrupt`]: Interrupt controller management
//! - [`clock`]: Peripheral clock gating

pub mod clock;
pub mod interrupt;
pub mod serial;
