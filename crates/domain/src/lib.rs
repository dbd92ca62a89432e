//! Domain layer for the VLAN portal.
//!
//! This crate contains:
//! - Device records and the presentation view (identity, group membership, credential)
//! - Form validation for device registration and edits
//! - The device storage abstraction and an in-memory implementation

pub mod models;
pub mod services;
