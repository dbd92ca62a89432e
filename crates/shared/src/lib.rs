//! Shared utilities and common types for the VLAN portal.
//!
//! This crate provides functionality used across all other crates:
//! - MAC address normalization and display formatting
//! - Common validation logic

pub mod mac;
pub mod validation;
