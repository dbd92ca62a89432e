//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod device;

pub use device::{DeviceRowEntity, RadCheckEntity, RadUserGroupEntity, UserEntity};
