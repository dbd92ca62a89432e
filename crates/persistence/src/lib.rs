//! Persistence layer for the VLAN portal.
//!
//! This crate contains:
//! - Database connection management and schema migrations
//! - Entity definitions (database row mappings)
//! - The transactional device repository

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
